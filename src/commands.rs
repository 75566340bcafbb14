use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::catalog::{self, Store};
use crate::config::Config;
use crate::events::{ImageBlob, Message};
use crate::scheduler::ReplyScheduler;
use crate::session::ChatSession;

pub fn list_stores(query: Option<&str>) -> Result<()> {
    let stores = catalog::filter_catalog(query.unwrap_or_default());

    if stores.is_empty() {
        println!("No stores match '{}'.", query.unwrap_or_default());
        return Ok(());
    }

    println!("⚓ VoyageMart stores:");
    println!("{}", "=".repeat(50));

    for store in stores {
        print!("{}", format_store(store));
        println!();
    }

    Ok(())
}

pub fn show_profile() -> Result<()> {
    let user = catalog::user_profile();
    println!("👤 {}", user.name);
    println!("   ✉️  {}", user.email);
    println!("   🗓  Member since {}", user.member_since);
    Ok(())
}

/// Run one scripted turn against a store and print the thread
pub async fn send_message(
    config: &Config,
    store: Option<&str>,
    images: Vec<PathBuf>,
    text: &str,
    json: bool,
) -> Result<()> {
    // The assistant conversation keeps the composer disabled.
    let Some(query) = store else {
        bail!("Choose a merchant first: pass --store");
    };
    let Some(store) = catalog::resolve_store(query) else {
        bail!("Store '{}' not found. Run 'voyagemart stores' to see available stores.", query);
    };

    let messages = run_turn(config, store, images, text).await?;

    if json {
        let out = serde_json::to_string_pretty(&messages)
            .context("Failed to serialize conversation")?;
        println!("{out}");
    } else {
        for message in &messages {
            println!("{}", format_message(message));
        }
    }

    Ok(())
}

async fn run_turn(
    config: &Config,
    store: &Store,
    images: Vec<PathBuf>,
    text: &str,
) -> Result<Vec<Message>> {
    let mut session = ChatSession::new(config.stale_replies);
    session.select_store(store.id);
    session.attach_images(images.iter().map(ImageBlob::from_path).collect());

    let Some(reply) = session.submit(text) else {
        bail!("Nothing to send: provide message text or at least one --image");
    };

    let (mut scheduler, mut replies) = ReplyScheduler::new(config.reply_delay());
    let generation = scheduler.schedule(reply).generation();
    info!(
        store = store.name,
        generation,
        delay_ms = scheduler.delay().as_millis() as u64,
        "waiting for scripted reply"
    );

    let reply = replies
        .recv()
        .await
        .context("Reply channel closed before the reply arrived")?;
    session.deliver_reply(reply);

    Ok(session.messages().to_vec())
}

fn format_store(store: &Store) -> String {
    let unread = if store.unread > 0 {
        format!(" ({} unread)", store.unread)
    } else {
        String::new()
    };
    format!(
        "🏪 [{}] {}{}\n   💬 {}\n   📦 {}\n",
        store.id,
        store.name,
        unread,
        store.last_message,
        store.products.join(", ")
    )
}

fn format_message(message: &Message) -> String {
    let author = message.author;

    let mut body = message.text.clone().unwrap_or_default();
    if let Some(image) = &message.image {
        if !body.is_empty() {
            body.push(' ');
        }
        body.push_str(&format!("[image: {}]", image.file_name));
    }

    format!("{author}: {body}")
}

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::session::PendingReply;

/// Internal application events for coordinating between components
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input
    Tui(TuiEvent),

    /// A scheduled canned reply is due
    ReplyDue(PendingReply),

    /// Splash screen timer elapsed
    SplashElapsed,
}

/// TUI-specific events (keyboard, paste, resize)
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    /// The shopper
    User,
    /// The selected merchant's customer service
    Store,
    /// The marketplace assistant, when no merchant is selected
    Assistant,
}

/// A local image picked by the user
#[derive(Debug, PartialEq, Eq)]
pub struct ImageBlob {
    pub id: Uuid,
    pub file_name: String,
    pub path: PathBuf,
}

/// Shared handle to an image; pending attachments and sent messages hold clones
pub type ImageAttachment = Arc<ImageBlob>;

impl ImageBlob {
    pub fn from_path(path: impl AsRef<Path>) -> ImageAttachment {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Arc::new(ImageBlob {
            id: Uuid::new_v4(),
            file_name,
            path,
        })
    }
}

fn serialize_image<S: Serializer>(
    image: &Option<ImageAttachment>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match image {
        Some(blob) => serializer.serialize_some(&blob.path),
        None => serializer.serialize_none(),
    }
}

/// One entry of the conversation thread
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        serialize_with = "serialize_image",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<ImageAttachment>,
    pub sender: Sender,
    /// Display name of the author when the message was written
    pub author: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn text(sender: Sender, author: &'static str, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: Some(text.into()),
            image: None,
            sender,
            author,
            timestamp: Utc::now(),
        }
    }

    pub fn image(sender: Sender, author: &'static str, image: ImageAttachment) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: None,
            image: Some(image),
            sender,
            author,
            timestamp: Utc::now(),
        }
    }
}

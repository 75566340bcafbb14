//! Conversation session: the state behind the chat panel.
//!
//! Every user action maps to one synchronous transition on [`ChatSession`].
//! The only deferred work is the canned reply, which `submit` hands back as a
//! [`PendingReply`] for the owner to deliver later.

#[cfg(test)]
mod proptests;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{self, Store};
use crate::events::{ImageAttachment, Message, Sender};
use crate::replies::{self, ASSISTANT_GREETING};

/// What to do with a reply whose conversation has since been replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleReplyPolicy {
    /// Discard it
    #[default]
    Drop,
    /// Append it to whatever conversation is current
    Keep,
}

/// A reply computed at submit time, waiting to be appended
#[derive(Debug, Clone)]
pub struct PendingReply {
    /// Conversation the reply was produced for
    pub generation: u64,
    pub message: Message,
}

/// The single mutable aggregate of one chat interaction
#[derive(Debug, Clone)]
pub struct ChatSession {
    active_store: Option<&'static Store>,
    messages: Vec<Message>,
    pending_attachments: Vec<ImageAttachment>,
    composer_enabled: bool,
    generation: u64,
    stale_replies: StaleReplyPolicy,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(StaleReplyPolicy::default())
    }
}

impl ChatSession {
    /// Start a session talking to the assistant
    pub fn new(stale_replies: StaleReplyPolicy) -> Self {
        Self {
            active_store: None,
            messages: vec![Message::text(
                Sender::Assistant,
                catalog::assistant().name,
                ASSISTANT_GREETING,
            )],
            pending_attachments: Vec::new(),
            composer_enabled: false,
            generation: 0,
            stale_replies,
        }
    }

    /// Switch to the store with `store_id`. Unknown ids leave the session untouched.
    pub fn select_store(&mut self, store_id: &str) -> bool {
        let Some(store) = catalog::find_store(store_id) else {
            debug!(store_id, "ignoring selection of unknown store");
            return false;
        };

        self.start_conversation(Some(store), replies::store_greeting(store));
        self.composer_enabled = true;
        debug!(store = store.name, generation = self.generation, "store selected");
        true
    }

    /// Go back to the assistant with a fresh greeting
    pub fn reset_conversation(&mut self) {
        self.start_conversation(None, ASSISTANT_GREETING.to_string());
        self.composer_enabled = false;
        debug!(generation = self.generation, "conversation reset");
    }

    /// Queue images for the next send. Returns how many were queued.
    pub fn attach_images(&mut self, files: Vec<ImageAttachment>) -> usize {
        if !self.composer_enabled {
            debug!(count = files.len(), "composer disabled, attachments ignored");
            return 0;
        }

        let added = files.len();
        self.pending_attachments.extend(files);
        added
    }

    /// Drop one pending attachment; out-of-range indices are ignored
    pub fn remove_attachment(&mut self, index: usize) -> Option<ImageAttachment> {
        if index >= self.pending_attachments.len() {
            debug!(index, "no pending attachment at index");
            return None;
        }
        Some(self.pending_attachments.remove(index))
    }

    /// Send the composed text plus pending attachments.
    ///
    /// Returns the reply the owner should deliver after the pacing delay, or
    /// `None` when there was nothing to send.
    pub fn submit(&mut self, text: &str) -> Option<PendingReply> {
        if !self.composer_enabled {
            debug!("composer disabled, submit ignored");
            return None;
        }

        let has_text = !text.trim().is_empty();
        if !has_text && self.pending_attachments.is_empty() {
            return None;
        }

        let user = catalog::user_profile().name;
        if has_text {
            self.messages.push(Message::text(Sender::User, user, text));
        }

        let images = std::mem::take(&mut self.pending_attachments);
        let image_count = images.len();
        self.messages.extend(
            images
                .into_iter()
                .map(|image| Message::image(Sender::User, user, image)),
        );

        let reply_text = replies::canned_reply(text, image_count, self.active_store);
        debug!(
            has_text,
            image_count,
            generation = self.generation,
            "message submitted"
        );

        Some(PendingReply {
            generation: self.generation,
            message: Message::text(self.reply_sender(), self.active_party_name(), reply_text),
        })
    }

    /// Append a previously scheduled reply. Returns whether it was appended.
    pub fn deliver_reply(&mut self, reply: PendingReply) -> bool {
        if reply.generation != self.generation && self.stale_replies == StaleReplyPolicy::Drop {
            debug!(
                reply_generation = reply.generation,
                generation = self.generation,
                "dropping reply for replaced conversation"
            );
            return false;
        }

        self.messages.push(reply.message);
        true
    }

    pub fn active_store(&self) -> Option<&'static Store> {
        self.active_store
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn pending_attachments(&self) -> &[ImageAttachment] {
        &self.pending_attachments
    }

    pub fn composer_enabled(&self) -> bool {
        self.composer_enabled
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stale_replies(&self) -> StaleReplyPolicy {
        self.stale_replies
    }

    /// Display name of whoever answers: the store or the assistant
    pub fn active_party_name(&self) -> &'static str {
        self.active_store
            .map_or(catalog::assistant().name, |store| store.name)
    }

    fn reply_sender(&self) -> Sender {
        if self.active_store.is_some() {
            Sender::Store
        } else {
            Sender::Assistant
        }
    }

    fn start_conversation(&mut self, store: Option<&'static Store>, greeting: String) {
        self.active_store = store;
        let sender = self.reply_sender();
        self.messages = vec![Message::text(sender, self.active_party_name(), greeting)];
        self.pending_attachments.clear();
        self.generation += 1;
    }
}

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::session::PendingReply;

/// Handle to one reply waiting on its timer
#[derive(Debug)]
pub struct ScheduledReply {
    generation: u64,
    handle: JoinHandle<()>,
}

impl ScheduledReply {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stop the timer; the reply is never sent
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Delivers canned replies after a fixed pacing delay
pub struct ReplyScheduler {
    delay: Duration,
    tx: mpsc::UnboundedSender<PendingReply>,
    outstanding: Vec<ScheduledReply>,
}

impl ReplyScheduler {
    /// Create a scheduler and the receiver replies arrive on
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<PendingReply>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            delay,
            tx,
            outstanding: Vec::new(),
        };
        (scheduler, rx)
    }

    /// Send `reply` once the delay elapses. Must be called inside a tokio runtime.
    pub fn schedule(&mut self, reply: PendingReply) -> &ScheduledReply {
        self.outstanding.retain(|scheduled| !scheduled.is_finished());

        let generation = reply.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(generation, "reply timer fired");
            // Receiver gone means the owner shut down.
            let _ = tx.send(reply);
        });

        debug!(generation, delay_ms = delay.as_millis() as u64, "reply scheduled");
        self.outstanding.push(ScheduledReply { generation, handle });
        &self.outstanding[self.outstanding.len() - 1]
    }

    /// Abort every reply still waiting on its timer
    pub fn cancel_all(&mut self) {
        let pending = self
            .outstanding
            .iter()
            .filter(|scheduled| !scheduled.is_finished())
            .count();
        for scheduled in self.outstanding.drain(..) {
            scheduled.cancel();
        }
        if pending > 0 {
            debug!(pending, "cancelled scheduled replies");
        }
    }

    /// Number of replies whose timers have not fired yet
    pub fn pending(&self) -> usize {
        self.outstanding
            .iter()
            .filter(|scheduled| !scheduled.is_finished())
            .count()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

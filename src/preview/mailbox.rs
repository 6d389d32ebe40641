//! Single-slot handoff from the stdin listener thread to the preview loop.
//!
//! Only the most recent unread line is kept: a line posted before the previous one was taken
//! replaces it. Live control only cares about the latest command, so intermediate lines are
//! dropped on purpose.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Last-value cell with a ready flag.
#[derive(Debug, Default)]
pub struct Mailbox {
    slot: Mutex<Option<String>>,
    ready: AtomicBool,
}

impl Mailbox {
    /// Empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `line`, replacing any unread one.
    pub fn post(&self, line: impl Into<String>) {
        let line = line.into();
        match self.slot.lock() {
            Ok(mut slot) => *slot = Some(line),
            Err(poisoned) => *poisoned.into_inner() = Some(line),
        }
        self.ready.store(true, Ordering::Release);
    }

    /// Whether a line is waiting.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Take the waiting line, if any, and clear the flag.
    pub fn take(&self) -> Option<String> {
        if !self.ready.swap(false, Ordering::AcqRel) {
            return None;
        }
        match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

/// Background reader feeding a [`Mailbox`].
#[derive(Debug)]
pub struct StdinMailbox {
    mailbox: Arc<Mailbox>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl StdinMailbox {
    /// Listen on the process's stdin.
    pub fn spawn() -> Self {
        Self::spawn_reader(std::io::BufReader::new(std::io::stdin()))
    }

    /// Listen on any line reader; the thread ends at EOF or on a read error.
    pub fn spawn_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        let mailbox = Arc::new(Mailbox::new());
        let sink = Arc::clone(&mailbox);
        let handle = std::thread::Builder::new()
            .name("runon-stdin".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    match line {
                        Ok(line) => sink.post(line),
                        Err(e) => {
                            tracing::debug!(error = %e, "stdin listener stopped");
                            break;
                        }
                    }
                }
            });
        let handle = handle
            .inspect_err(|e| tracing::warn!(error = %e, "could not start stdin listener"))
            .ok();
        Self { mailbox, handle }
    }

    /// Shared mailbox the listener writes into.
    pub fn mailbox(&self) -> Arc<Mailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Whether the listener thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/mailbox.rs"]
mod tests;

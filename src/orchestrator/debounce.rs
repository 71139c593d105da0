//! Quiet-period debouncing of free-text input.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Coalesces rapid edits into one notification after `delay` of quiet.
///
/// Every call to [`Debouncer::schedule`] aborts the previous timer and bumps a
/// generation counter; a fire carries its generation so one that raced past the
/// abort can still be recognised as stale.
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<u64>,
    rx: mpsc::UnboundedReceiver<u64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Debouncer {
            delay,
            generation: 0,
            timer: None,
            tx,
            rx,
        }
    }

    /// Restart the quiet period. Must be called within a tokio runtime.
    pub fn schedule(&mut self) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(generation);
        }));
        generation
    }

    /// Abort the timer and retire its generation, so a fire already queued
    /// in the channel is dropped as stale.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().map_or(false, |t| !t.is_finished())
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Wait for the next fire of the current generation; stale fires are dropped.
    pub async fn fired(&mut self) -> u64 {
        loop {
            match self.rx.recv().await {
                Some(generation) if generation == self.generation => {
                    self.timer = None;
                    return generation;
                }
                Some(stale) => log::debug!("[Debounce] Dropping stale fire {}", stale),
                // The sender half lives in `self`, so the channel never closes.
                None => std::future::pending::<()>().await,
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

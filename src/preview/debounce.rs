use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A restartable one-shot timer.
///
/// Each [`schedule`](Self::schedule) cancels the pending timer and starts a
/// new generation. A timer that fires after being superseded is recognised
/// by its stale generation.
#[derive(Debug, Default)]
pub struct Debouncer {
    generation: u64,
    token: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a timer that calls `on_fire` with its generation after `delay`,
    /// cancelling any pending one. Returns the new generation.
    pub fn schedule<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => on_fire(generation),
            }
        });
        self.token = Some(token);
        generation
    }

    /// Cancels the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        self.token.is_some()
    }

    /// Accepts a fired generation. Returns `false` for a superseded or
    /// cancelled timer.
    pub fn settle(&mut self, generation: u64) -> bool {
        if self.token.is_some() && generation == self.generation {
            self.token = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

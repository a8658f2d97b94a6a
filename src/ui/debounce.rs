use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Delay applied to filter keystrokes before the table is redrawn.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(150);

/// Trailing-edge debouncer: every trigger restarts the wait, and only the
/// most recent trigger fires once the delay elapses without another one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Wait out the delay. Returns `true` if this trigger is still the latest
    /// and should fire, `false` if a newer one superseded it.
    pub async fn settle(&self) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.generation.load(Ordering::SeqCst) == ticket
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(FILTER_DEBOUNCE)
    }
}

use crate::data_sync::PausePredicate;
use crate::utils::constants::TYPING_QUIET_WINDOW;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const NEVER: u64 = 0;

/// Tracks whether the user is still typing into an input.
///
/// Activity lasts for `window` after the last [`touch`](Self::touch). The state
/// is a pure predicate, so it can gate synchronizer ticks without its own timer.
#[derive(Debug)]
pub struct TypingDebounce {
    window: Duration,
    origin: Instant,
    // Milliseconds since `origin` of the last keystroke, plus one. Zero means never.
    last_input: AtomicU64,
}

impl TypingDebounce {
    pub fn new(window: Duration) -> Self {
        Self { window, origin: Instant::now(), last_input: AtomicU64::new(NEVER) }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a keystroke.
    pub fn touch(&self) {
        let elapsed = self.origin.elapsed().as_millis() as u64;
        self.last_input.store(elapsed + 1, Ordering::Relaxed);
    }

    /// Forget pending input, e.g. when the input is cleared or submitted.
    pub fn settle(&self) {
        self.last_input.store(NEVER, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        match self.last_input.load(Ordering::Relaxed) {
            NEVER => false,
            stamp => {
                let since_input = (self.origin.elapsed().as_millis() as u64).saturating_sub(stamp - 1);
                since_input < self.window.as_millis() as u64
            }
        }
    }

    pub fn pause_predicate(self: &Arc<Self>) -> PausePredicate {
        let debounce = Arc::clone(self);
        Arc::new(move || debounce.is_active())
    }
}

impl Default for TypingDebounce {
    fn default() -> Self {
        Self::new(TYPING_QUIET_WINDOW)
    }
}

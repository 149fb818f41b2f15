use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString, VariantNames};

/// Shared refresh cadences for on-chain reads.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, VariantNames, EnumIter, Default)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Polling {
    Fast,
    #[default]
    Normal,
    Slow,
}

impl Polling {
    pub const fn interval_ms(self) -> u64 {
        match self {
            Polling::Fast => 10_000,
            Polling::Normal => 20_000,
            Polling::Slow => 200_000,
        }
    }

    pub const fn interval(self) -> Duration {
        Duration::from_millis(self.interval_ms())
    }
}

/// Refresh cadence of the epoch timeline.
pub const EPOCH_TIMELINE_INTERVAL: Duration = Duration::from_millis(5_000);

/// Quiet period after the last keystroke before a search input counts as settled.
pub const TYPING_QUIET_WINDOW: Duration = Duration::from_millis(1_000);

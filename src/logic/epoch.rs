use crate::data_sync::{Fetcher, FetchKey, LiveSynchronizer, Snapshot, SubscribeOptions, SubscriptionHandle};
use crate::sync_error::SyncError;
use crate::utils::clock::Clock;
use crate::utils::constants::EPOCH_TIMELINE_INTERVAL;
use crate::utils::duration::humanize_duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Shown when no epoch has been read yet.
pub const NO_EPOCH_DURATION_LABEL: &str = "0d";

pub fn epoch_key() -> FetchKey {
    FetchKey::new().with("epoch")
}

/// Current epoch as reported by the chain. Times are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochInfo {
    pub current: u64,
    pub start_time: u64,
    pub end_time: u64,
}

impl EpochInfo {
    pub fn total_duration(&self) -> Duration {
        Duration::from_secs(self.end_time.saturating_sub(self.start_time))
    }

    /// Elapsed share of the epoch at `now`, clamped to `0..=100`.
    pub fn progress_percent(&self, now: u64) -> f64 {
        let total = self.end_time.saturating_sub(self.start_time);
        if total == 0 {
            return if now >= self.end_time { 100.0 } else { 0.0 };
        }
        let elapsed = now.saturating_sub(self.start_time);
        (elapsed as f64 / total as f64 * 100.0).min(100.0)
    }

    pub fn remaining(&self, now: u64) -> Duration {
        Duration::from_secs(self.end_time.saturating_sub(now))
    }

    pub fn is_over(&self, now: u64) -> bool {
        now >= self.end_time
    }
}

/// What the epoch progress bar renders.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineView {
    pub is_loading: bool,
    pub current: u64,
    /// Zero while the current epoch is unknown.
    pub next: u64,
    pub percent: f64,
    pub duration_label: String,
}

impl TimelineView {
    pub fn from_snapshot(snapshot: &Snapshot<EpochInfo>, now: u64) -> Self {
        match &snapshot.value {
            Some(epoch) => Self {
                is_loading: snapshot.is_loading,
                current: epoch.current,
                next: if epoch.current > 0 { epoch.current + 1 } else { 0 },
                percent: epoch.progress_percent(now),
                duration_label: humanize_duration(epoch.remaining(now)),
            },
            None => Self {
                is_loading: snapshot.is_loading,
                current: 0,
                next: 0,
                percent: 0.0,
                duration_label: NO_EPOCH_DURATION_LABEL.to_string(),
            },
        }
    }

    pub fn percent_label(&self) -> String {
        format!("{:.0}%", self.percent)
    }
}

/// Live epoch progress: a subscription on the epoch key plus the clock to measure it against.
pub struct EpochTimeline {
    handle: SubscriptionHandle<EpochInfo>,
    clock: Arc<dyn Clock>,
}

impl EpochTimeline {
    pub fn subscribe(
        sync: &LiveSynchronizer<EpochInfo>,
        fetcher: Arc<dyn Fetcher<EpochInfo>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SyncError> {
        let handle = sync.subscribe(epoch_key(), fetcher, SubscribeOptions::every(EPOCH_TIMELINE_INTERVAL))?;
        Ok(Self { handle, clock })
    }

    pub fn view(&self) -> TimelineView {
        TimelineView::from_snapshot(&self.handle.snapshot(), self.clock.now_unix_secs())
    }

    pub fn handle(&self) -> &SubscriptionHandle<EpochInfo> {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut SubscriptionHandle<EpochInfo> {
        &mut self.handle
    }
}

use crate::data_sync::key::FetchKey;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Receiver of the ticks produced by an entry driver.
pub trait TickTarget: Send + Sync + 'static {
    fn on_tick(this: &Arc<Self>, key: &FetchKey);
}

/// Spawn the repeating timer of one entry.
///
/// The driver ticks at whatever cadence is currently published on `cadence`,
/// restarting its timer when the cadence changes and idling while it is `None`.
/// It exits when the cadence sender or the target is dropped.
pub fn spawn_driver<T: TickTarget>(target: Weak<T>, key: FetchKey, cadence: watch::Receiver<Option<Duration>>) -> JoinHandle<()> {
    tokio::spawn(drive(target, key, cadence))
}

async fn drive<T: TickTarget>(target: Weak<T>, key: FetchKey, mut cadence: watch::Receiver<Option<Duration>>) {
    loop {
        let period = *cadence.borrow_and_update();
        // A period too large to schedule never fires, same as no cadence
        let schedule = period.and_then(|period| Instant::now().checked_add(period).map(|start| (start, period)));
        let Some((start, period)) = schedule else {
            trace!("Driver for {} idle", key);
            if cadence.changed().await.is_err() {
                return;
            }
            continue;
        };

        trace!("Driver for {} ticking every {:?}", key, period);
        let mut ticker = time::interval_at(start, period);
        // Missed ticks are not replayed in a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        return;
                    };
                    T::on_tick(&target, &key);
                }
                changed = cadence.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}

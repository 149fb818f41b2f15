/// Data Synchronization Layer
///
/// Keeps remote (on-chain) values fresh for any number of consumers:
///
/// - Structural fetch keys identifying one logical data source
/// - One cache entry per key, refreshed by a per-key driver at the fastest subscribed cadence
/// - Coalesced fetches with last-issued-wins result ordering
/// - Stale-while-revalidate snapshots fanned out to subscription handles
/// - Grace-period eviction once the last subscriber leaves

pub mod config;
pub mod fetcher;
pub mod key;
pub mod scheduler;
pub mod service;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::SyncConfig;
pub use fetcher::{fetch_fn, Fetcher, FetcherWrapper};
pub use key::{FetchKey, KeyPart};
pub use service::{LiveSynchronizer, LiveSynchronizerBuilder, SubscribeOptions, SubscriptionHandle};
pub use snapshot::Snapshot;
pub use store::{PausePredicate, SyncStats};

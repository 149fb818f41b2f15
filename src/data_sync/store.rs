use crate::data_sync::fetcher::FetcherWrapper;
use crate::data_sync::key::FetchKey;
use crate::data_sync::snapshot::Snapshot;
use crate::sync_error::FetchError;
use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Returns true while a subscriber wants its ticks skipped.
pub type PausePredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// One consumer's registration on an entry.
#[derive(Clone)]
pub struct SubscriberSpec {
    /// Zero means manual refresh only.
    pub interval: Duration,
    pub paused: Option<PausePredicate>,
}

impl SubscriberSpec {
    pub fn is_automatic(&self) -> bool {
        !self.interval.is_zero()
    }
}

/// Permission to run one fetch, handed out by [`CacheEntry::begin_fetch`].
pub struct FetchTicket<V> {
    pub instance: u64,
    pub seq: u64,
    pub fetcher: FetcherWrapper<V>,
}

/// Cached state for one key plus its scheduling bookkeeping.
pub struct CacheEntry<V> {
    pub key: FetchKey,
    pub value: Option<V>,
    pub last_fetched_at: Option<SystemTime>,
    pub error: Option<FetchError>,

    /// Distinguishes entries re-created for the same key after eviction.
    pub instance: u64,
    /// Sequence number of the most recently issued fetch.
    pub issued_seq: u64,
    /// Sequence number of the most recently applied result.
    pub applied_seq: u64,
    pub in_flight: bool,

    pub fetcher: FetcherWrapper<V>,
    pub subscribers: HashMap<u64, SubscriberSpec>,
    pub updates: watch::Sender<Snapshot<V>>,
    pub cadence: watch::Sender<Option<Duration>>,
    pub driver: Option<JoinHandle<()>>,
    pub eviction: Option<JoinHandle<()>>,
}

impl<V: Clone> CacheEntry<V> {
    pub fn new(key: FetchKey, instance: u64, fetcher: FetcherWrapper<V>) -> Self {
        let (updates, _) = watch::channel(Snapshot::empty());
        let (cadence, _) = watch::channel(None);
        Self {
            key,
            value: None,
            last_fetched_at: None,
            error: None,
            instance,
            issued_seq: 0,
            applied_seq: 0,
            in_flight: false,
            fetcher,
            subscribers: HashMap::new(),
            updates,
            cadence,
            driver: None,
            eviction: None,
        }
    }

    pub fn snapshot(&self) -> Snapshot<V> {
        Snapshot {
            value: self.value.clone(),
            is_loading: self.in_flight && self.value.is_none(),
            is_validating: self.in_flight,
            error: self.error.clone(),
            last_fetched_at: self.last_fetched_at,
        }
    }

    /// Push the current state to every handle.
    pub fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    /// Mark a fetch as in flight. Callers must check `in_flight` first to coalesce.
    pub fn begin_fetch(&mut self) -> FetchTicket<V> {
        self.in_flight = true;
        self.issued_seq += 1;
        self.publish();
        FetchTicket { instance: self.instance, seq: self.issued_seq, fetcher: Arc::clone(&self.fetcher) }
    }

    /// Fastest automatic interval among subscribers, `None` when all are manual.
    pub fn effective_interval(&self) -> Option<Duration> {
        self.subscribers.values().filter(|spec| spec.is_automatic()).map(|spec| spec.interval).min()
    }

    /// Recompute the shared cadence and wake the driver if it changed.
    pub fn refresh_cadence(&self) {
        let interval = self.effective_interval();
        self.cadence.send_if_modified(|current| {
            if *current == interval {
                false
            } else {
                *current = interval;
                true
            }
        });
    }

    /// Pause predicates of the automatic subscribers, or `None` if any of them can never pause.
    pub fn pause_predicates(&self) -> Option<Vec<PausePredicate>> {
        self.subscribers.values().filter(|spec| spec.is_automatic()).map(|spec| spec.paused.clone()).collect()
    }
}

impl<V> Drop for CacheEntry<V> {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub fetches: AtomicU64,
    pub failures: AtomicU64,
    pub discarded: AtomicU64,
    pub skipped_ticks: AtomicU64,
    pub evictions: AtomicU64,
    pub misuses: AtomicU64,
}

impl CacheStats {
    pub fn record(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Point-in-time copy of the synchronizer counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    pub entries: usize,
    pub subscriptions: usize,
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub failures: u64,
    pub discarded: u64,
    pub skipped_ticks: u64,
    pub evictions: u64,
    /// Calls on keys without an entry or without subscribers.
    pub misuses: u64,
    pub hit_rate: f64,
}

/// Keyed entry storage. The only shared mutable state of the synchronizer.
pub struct EntryStore<V> {
    pub entries: DashMap<FetchKey, CacheEntry<V>, RandomState>,
    pub stats: CacheStats,
    next_instance: AtomicU64,
}

impl<V: Clone> EntryStore<V> {
    pub fn new() -> Self {
        Self { entries: DashMap::with_hasher(RandomState::new()), stats: CacheStats::default(), next_instance: AtomicU64::new(1) }
    }

    pub fn next_instance(&self) -> u64 {
        self.next_instance.fetch_add(1, Ordering::Relaxed)
    }

    pub fn snapshot(&self, key: &FetchKey) -> Option<Snapshot<V>> {
        self.entries.get(key).map(|entry| entry.snapshot())
    }

    pub fn value(&self, key: &FetchKey) -> Option<V> {
        self.entries.get(key).and_then(|entry| entry.value.clone())
    }

    pub fn stats(&self) -> SyncStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        SyncStats {
            entries: self.entries.len(),
            subscriptions: self.entries.iter().map(|entry| entry.subscribers.len()).sum(),
            hits: load(&self.stats.hits),
            misses: load(&self.stats.misses),
            fetches: load(&self.stats.fetches),
            failures: load(&self.stats.failures),
            discarded: load(&self.stats.discarded),
            skipped_ticks: load(&self.stats.skipped_ticks),
            evictions: load(&self.stats.evictions),
            misuses: load(&self.stats.misuses),
            hit_rate: self.stats.hit_rate(),
        }
    }
}

impl<V: Clone> Default for EntryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

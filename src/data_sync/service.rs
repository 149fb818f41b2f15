use crate::data_sync::{
    config::SyncConfig,
    fetcher::FetcherWrapper,
    key::FetchKey,
    scheduler::{spawn_driver, TickTarget},
    snapshot::Snapshot,
    store::{CacheEntry, CacheStats, EntryStore, FetchTicket, PausePredicate, SubscriberSpec, SyncStats},
};
use crate::sync_error::{ErrorKind, FetchError, SyncError};
use crate::utils::network::NetworkConfig;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// Per-subscription refresh policy.
#[derive(Clone)]
pub struct SubscribeOptions {
    /// Zero disables automatic refresh.
    pub interval: Duration,
    pub paused: Option<PausePredicate>,
}

impl SubscribeOptions {
    pub fn every(interval: Duration) -> Self {
        Self { interval, paused: None }
    }

    pub fn interval_ms(interval_ms: u64) -> Self {
        Self::every(Duration::from_millis(interval_ms))
    }

    /// Fetch once on first subscription, then only on `trigger`.
    pub fn manual() -> Self {
        Self::every(Duration::ZERO)
    }

    /// Skip ticks while `paused` returns true. Evaluated before every tick, so it must be cheap.
    pub fn paused_when(mut self, paused: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.paused = Some(Arc::new(paused));
        self
    }

    pub fn with_pause(mut self, paused: PausePredicate) -> Self {
        self.paused = Some(paused);
        self
    }
}

struct SyncInner<V> {
    config: SyncConfig,
    network: Arc<NetworkConfig>,
    store: EntryStore<V>,
    next_subscription: AtomicU64,
}

/// Keeps remote values fresh for any number of subscribers.
///
/// Each distinct [`FetchKey`] owns one cache entry and one driver task ticking at the
/// fastest interval among its subscribers. Fetches for a key never overlap, results
/// apply in issue order, and fetch failures are recorded on the entry instead of being
/// returned to callers. Entries without subscribers are evicted after the grace period.
///
/// `subscribe`, `trigger` and dropping a handle spawn tasks and must run inside a tokio runtime.
pub struct LiveSynchronizer<V> {
    inner: Arc<SyncInner<V>>,
}

impl<V> Clone for LiveSynchronizer<V> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<V: Clone + Send + Sync + 'static> LiveSynchronizer<V> {
    pub fn new(config: SyncConfig, network: Arc<NetworkConfig>) -> Self {
        debug!("Creating LiveSynchronizer for chain {} (grace period {:?})", network.chain.id, config.grace_period());
        Self {
            inner: Arc::new(SyncInner {
                config,
                network,
                store: EntryStore::new(),
                next_subscription: AtomicU64::new(1),
            }),
        }
    }

    /// Register interest in `key`. The first subscriber creates the entry and fetches immediately.
    ///
    /// Later subscribers share the existing entry and its fetcher; their own `fetcher` is ignored.
    pub fn subscribe(&self, key: FetchKey, fetcher: FetcherWrapper<V>, options: SubscribeOptions) -> Result<SubscriptionHandle<V>, SyncError> {
        if let Err(e) = key.validate() {
            warn!("Rejecting subscription: {}", e);
            return Err(e);
        }

        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        let spec = SubscriberSpec { interval: options.interval, paused: options.paused };

        let (receiver, ticket) = match self.inner.store.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                CacheStats::record(&self.inner.store.stats.hits);
                let entry = occupied.get_mut();
                if let Some(eviction) = entry.eviction.take() {
                    eviction.abort();
                    debug!("Entry {} revived within grace period", key);
                }
                entry.subscribers.insert(id, spec);
                entry.refresh_cadence();

                // Revalidate only when there is nothing to show and nothing on the way
                let ticket = if entry.value.is_none() && !entry.in_flight { Some(entry.begin_fetch()) } else { None };
                (entry.updates.subscribe(), ticket)
            }
            Entry::Vacant(vacant) => {
                CacheStats::record(&self.inner.store.stats.misses);
                let mut entry = CacheEntry::new(key.clone(), self.inner.store.next_instance(), fetcher);
                entry.subscribers.insert(id, spec);
                entry.refresh_cadence();
                entry.driver = Some(spawn_driver(Arc::downgrade(&self.inner), key.clone(), entry.cadence.subscribe()));

                let ticket = entry.begin_fetch();
                let receiver = entry.updates.subscribe();
                vacant.insert(entry);
                (receiver, Some(ticket))
            }
        };

        debug!("Subscription {} registered on {} (interval {:?})", id, key, options.interval);

        if let Some(ticket) = ticket {
            SyncInner::spawn_fetch(&self.inner, key.clone(), ticket);
        }

        Ok(SubscriptionHandle {
            id,
            key,
            receiver,
            inner: Arc::downgrade(&self.inner),
            active: AtomicBool::new(true),
        })
    }

    /// Release a subscription. Calling it again, or dropping the handle afterwards, is a no-op.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle<V>) {
        handle.unsubscribe();
    }

    /// Refresh `key` now. Returns false when a fetch is already in flight or the key has no subscribers.
    pub fn trigger(&self, key: &FetchKey) -> bool {
        SyncInner::trigger(&self.inner, key)
    }

    /// Current state of `key` without fetching. Unknown keys read as the empty snapshot.
    pub fn read(&self, key: &FetchKey) -> Snapshot<V> {
        match self.inner.store.snapshot(key) {
            Some(snapshot) => snapshot,
            None => {
                self.inner.misuse("read", key);
                Snapshot::empty()
            }
        }
    }

    /// Last value some other subscriber fetched for `key`, if any. Never fetches.
    pub fn cached(&self, key: &FetchKey) -> Option<V> {
        self.inner.store.value(key)
    }

    pub fn contains(&self, key: &FetchKey) -> bool {
        self.inner.store.entries.contains_key(key)
    }

    pub fn subscriber_count(&self, key: &FetchKey) -> usize {
        self.inner.store.entries.get(key).map_or(0, |entry| entry.subscribers.len())
    }

    pub fn len(&self) -> usize {
        self.inner.store.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.entries.is_empty()
    }

    /// Automatic refresh at the configured default interval.
    pub fn default_options(&self) -> SubscribeOptions {
        SubscribeOptions::every(self.inner.config.default_interval())
    }

    pub fn stats(&self) -> SyncStats {
        self.inner.store.stats()
    }

    pub fn network(&self) -> &Arc<NetworkConfig> {
        &self.inner.network
    }

    pub fn get_config(&self) -> &SyncConfig {
        &self.inner.config
    }
}

impl<V: Clone + Send + Sync + 'static> SyncInner<V> {
    fn misuse(&self, operation: &str, key: &FetchKey) {
        debug!("{} on {} ignored: no subscribers ({})", operation, key, ErrorKind::ConsumerMisuse);
        CacheStats::record(&self.store.stats.misuses);
    }

    fn spawn_fetch(this: &Arc<Self>, key: FetchKey, ticket: FetchTicket<V>) {
        let inner = Arc::clone(this);
        tokio::spawn(async move {
            let timeout = inner.config.fetch_timeout();
            let result = match tokio::time::timeout(timeout, ticket.fetcher.fetch(&inner.network)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(timeout.as_millis() as u64)),
            };
            inner.complete_fetch(&key, ticket.instance, ticket.seq, result);
        });
    }

    fn complete_fetch(&self, key: &FetchKey, instance: u64, seq: u64, result: Result<V, FetchError>) {
        let stats = &self.store.stats;
        CacheStats::record(&stats.fetches);

        let Some(mut entry) = self.store.entries.get_mut(key) else {
            debug!("Discarding fetch #{} for evicted entry {}", seq, key);
            CacheStats::record(&stats.discarded);
            return;
        };

        if entry.instance != instance {
            debug!("Discarding fetch #{} for replaced entry {}", seq, key);
            CacheStats::record(&stats.discarded);
            return;
        }

        if seq == entry.issued_seq {
            entry.in_flight = false;
        }

        if seq <= entry.applied_seq {
            debug!("Discarding out-of-order fetch #{} for {} (applied #{})", seq, key, entry.applied_seq);
            CacheStats::record(&stats.discarded);
            entry.publish();
            return;
        }

        if entry.subscribers.is_empty() {
            debug!("Discarding fetch #{} for {}: no subscribers left", seq, key);
            CacheStats::record(&stats.discarded);
            entry.publish();
            return;
        }

        entry.applied_seq = seq;
        match result {
            Ok(value) => {
                trace!("Fetch #{} for {} succeeded", seq, key);
                entry.value = Some(value);
                entry.last_fetched_at = Some(SystemTime::now());
                entry.error = None;
            }
            Err(e) => {
                warn!("Fetch #{} for {} failed ({}): {}", seq, key, e.kind(), e);
                CacheStats::record(&stats.failures);
                entry.error = Some(e);
            }
        }
        entry.publish();
    }

    fn trigger(this: &Arc<Self>, key: &FetchKey) -> bool {
        let ticket = {
            let Some(mut entry) = this.store.entries.get_mut(key) else {
                this.misuse("trigger", key);
                return false;
            };
            if entry.subscribers.is_empty() {
                drop(entry);
                this.misuse("trigger", key);
                return false;
            }
            if entry.in_flight {
                trace!("Trigger on {} coalesced with in-flight fetch", key);
                return false;
            }
            entry.begin_fetch()
        };
        Self::spawn_fetch(this, key.clone(), ticket);
        true
    }

    fn release(this: &Arc<Self>, id: u64, key: &FetchKey) {
        let Some(mut entry) = this.store.entries.get_mut(key) else {
            this.misuse("unsubscribe", key);
            return;
        };
        if entry.subscribers.remove(&id).is_none() {
            return;
        }
        entry.refresh_cadence();
        debug!("Subscription {} released from {} ({} left)", id, key, entry.subscribers.len());

        if !entry.subscribers.is_empty() {
            return;
        }

        let grace = this.config.grace_period();
        let runtime = tokio::runtime::Handle::try_current();
        match runtime {
            Ok(runtime) if !grace.is_zero() => {
                let instance = entry.instance;
                entry.eviction = Some(runtime.spawn(Self::evict_after(Arc::downgrade(this), key.clone(), instance, grace)));
            }
            _ => {
                let instance = entry.instance;
                drop(entry);
                this.evict(key, instance);
            }
        }
    }

    async fn evict_after(inner: Weak<Self>, key: FetchKey, instance: u64, grace: Duration) {
        tokio::time::sleep(grace).await;
        if let Some(inner) = inner.upgrade() {
            inner.evict(&key, instance);
        }
    }

    fn evict(&self, key: &FetchKey, instance: u64) {
        let removed = self.store.entries.remove_if(key, |_, entry| entry.instance == instance && entry.subscribers.is_empty());
        if removed.is_some() {
            CacheStats::record(&self.store.stats.evictions);
            debug!("Evicted entry {}", key);
        }
    }
}

impl<V: Clone + Send + Sync + 'static> TickTarget for SyncInner<V> {
    fn on_tick(this: &Arc<Self>, key: &FetchKey) {
        let predicates = {
            let Some(entry) = this.store.entries.get(key) else {
                return;
            };
            if entry.in_flight {
                trace!("Tick on {} coalesced with in-flight fetch", key);
                return;
            }
            entry.pause_predicates()
        };

        // Skip only when every automatic subscriber asks for it
        if let Some(predicates) = predicates {
            if !predicates.is_empty() && predicates.iter().all(|paused| paused()) {
                trace!("Tick on {} skipped: paused", key);
                CacheStats::record(&this.store.stats.skipped_ticks);
                return;
            }
        }

        let ticket = {
            let Some(mut entry) = this.store.entries.get_mut(key) else {
                return;
            };
            if entry.in_flight || entry.subscribers.is_empty() {
                return;
            }
            entry.begin_fetch()
        };
        Self::spawn_fetch(this, key.clone(), ticket);
    }
}

/// A consumer's live view of one key.
///
/// Dropping the handle unsubscribes it.
pub struct SubscriptionHandle<V: Clone + Send + Sync + 'static> {
    id: u64,
    key: FetchKey,
    receiver: watch::Receiver<Snapshot<V>>,
    inner: Weak<SyncInner<V>>,
    active: AtomicBool,
}

impl<V: Clone + Send + Sync + 'static> SubscriptionHandle<V> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Snapshot<V> {
        self.receiver.borrow().clone()
    }

    pub fn value(&self) -> Option<V> {
        self.receiver.borrow().value.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.receiver.borrow().is_loading
    }

    pub fn error(&self) -> Option<FetchError> {
        self.receiver.borrow().error.clone()
    }

    /// Wait for the next published snapshot. Returns `None` once the entry is gone.
    pub async fn changed(&mut self) -> Option<Snapshot<V>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the snapshot satisfies `condition`, checking the current one first.
    pub async fn wait_for(&mut self, condition: impl FnMut(&Snapshot<V>) -> bool) -> Option<Snapshot<V>> {
        self.receiver.wait_for(condition).await.ok().map(|snapshot| snapshot.clone())
    }

    /// Same as `LiveSynchronizer::trigger` on this handle's key.
    pub fn refetch(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) if self.is_active() => SyncInner::trigger(&inner, &self.key),
            _ => false,
        }
    }

    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.inner.upgrade() {
            SyncInner::release(&inner, self.id, &self.key);
        }
    }
}

impl<V: Clone + Send + Sync + 'static> Drop for SubscriptionHandle<V> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Builder for LiveSynchronizer to make creation more ergonomic
pub struct LiveSynchronizerBuilder {
    config: Option<SyncConfig>,
    network: Option<Arc<NetworkConfig>>,
}

impl LiveSynchronizerBuilder {
    pub fn new() -> Self {
        Self { config: None, network: None }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(Arc::new(network));
        self
    }

    pub fn with_shared_network(mut self, network: Arc<NetworkConfig>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn build<V: Clone + Send + Sync + 'static>(self) -> LiveSynchronizer<V> {
        let config = self.config.unwrap_or_else(|| SyncConfig::from_env().unwrap_or_default());
        let network = self.network.unwrap_or_else(|| Arc::new(NetworkConfig::from_env().unwrap_or_default()));
        info!("Building LiveSynchronizer for {} ({})", network.chain.name, network.chain.id);
        LiveSynchronizer::new(config, network)
    }
}

impl Default for LiveSynchronizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

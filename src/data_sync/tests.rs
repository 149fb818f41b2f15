/// Integration tests for the data synchronization layer
///
/// These drive the synchronizer end to end on a paused tokio clock: subscription
/// lifecycle, shared cadences, coalescing, stale-while-revalidate and eviction.

#[cfg(test)]
mod integration_tests {
    use super::super::*;
    use crate::logic::epoch::{epoch_key, EpochInfo, EpochTimeline};
    use crate::sync_error::{ErrorKind, FetchError, SyncError};
    use crate::utils::clock::FixedClock;
    use crate::utils::network::NetworkConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::time::{sleep, Duration};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("live_sync=debug").try_init();
    }

    /// Counts calls and serves a settable value, optionally slowly or failing.
    struct ScriptedFetcher {
        calls: AtomicU64,
        value: AtomicU64,
        fail: AtomicBool,
        delay: Duration,
    }

    impl ScriptedFetcher {
        fn new(value: u64) -> Arc<Self> {
            Self::slow(value, Duration::ZERO)
        }

        fn slow(value: u64, delay: Duration) -> Arc<Self> {
            Arc::new(Self { calls: AtomicU64::new(0), value: AtomicU64::new(value), fail: AtomicBool::new(false), delay })
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher<u64> for ScriptedFetcher {
        async fn fetch(&self, _network: &NetworkConfig) -> Result<u64, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(FetchError::Rpc("header not found".to_string()));
            }
            Ok(self.value.load(Ordering::SeqCst))
        }
    }

    fn synchronizer<V: Clone + Send + Sync + 'static>(config: SyncConfig) -> LiveSynchronizer<V> {
        init_tracing();
        LiveSynchronizer::new(config, Arc::new(NetworkConfig::default()))
    }

    fn key(name: &str) -> FetchKey {
        FetchKey::new().with(name)
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_then_read() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(7);

        let mut handle = sync.subscribe(key("balance"), fetcher.clone(), SubscribeOptions::interval_ms(5_000)).unwrap();

        let before = sync.read(&key("balance"));
        assert!(before.is_loading);
        assert_eq!(before.value, None);
        assert!(handle.is_loading());

        let after = handle.wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();
        assert!(!after.is_loading);
        assert_eq!(after.value, Some(7));
        assert!(after.last_fetched_at.is_some());

        let read = sync.read(&key("balance"));
        assert!(!read.is_loading);
        assert_eq!(read.value, Some(7));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_key_uses_fastest_cadence() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(1);

        let _slow = sync.subscribe(key("epoch"), fetcher.clone(), SubscribeOptions::interval_ms(1_000)).unwrap();
        let fast = sync.subscribe(key("epoch"), fetcher.clone(), SubscribeOptions::interval_ms(250)).unwrap();
        assert_eq!(sync.len(), 1);
        assert_eq!(sync.subscriber_count(&key("epoch")), 2);

        // one immediate fetch plus ticks at 250, 500, 750 and 1000
        sleep(Duration::from_millis(1_100)).await;
        assert_eq!(fetcher.calls(), 5);

        // dropping the fast subscriber falls back to the slow cadence
        drop(fast);
        sleep(Duration::from_millis(2_050)).await;
        assert_eq!(fetcher.calls(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubscribe_within_grace_is_cache_hit() {
        let sync = synchronizer::<u64>(SyncConfig { grace_period_ms: 2_000, ..SyncConfig::default() });
        let fetcher = ScriptedFetcher::new(3);

        let mut handle = sync.subscribe(key("validators"), fetcher.clone(), SubscribeOptions::manual()).unwrap();
        handle.wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();
        sync.unsubscribe(&handle);
        drop(handle);
        assert_eq!(sync.subscriber_count(&key("validators")), 0);
        assert!(sync.contains(&key("validators")));

        sleep(Duration::from_millis(500)).await;
        let revived = sync.subscribe(key("validators"), fetcher.clone(), SubscribeOptions::manual()).unwrap();
        assert_eq!(revived.value(), Some(3));
        assert!(!revived.is_loading());
        sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.calls(), 1);

        // the cancelled eviction must not fire later
        sleep(Duration::from_millis(3_000)).await;
        assert!(sync.contains(&key("validators")));

        drop(revived);
        sleep(Duration::from_millis(2_100)).await;
        assert!(!sync.contains(&key("validators")));
        assert_eq!(sync.stats().evictions, 1);

        let fresh = sync.subscribe(key("validators"), fetcher.clone(), SubscribeOptions::manual()).unwrap();
        assert!(fresh.is_loading());
        sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_value_until_next_success() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(10);

        let mut handle = sync.subscribe(key("rewards"), fetcher.clone(), SubscribeOptions::interval_ms(1_000)).unwrap();
        handle.wait_for(|snapshot| snapshot.value == Some(10)).await.unwrap();

        fetcher.fail.store(true, Ordering::SeqCst);
        assert!(sync.trigger(&key("rewards")));
        let failed = handle.wait_for(|snapshot| snapshot.error.is_some()).await.unwrap();
        assert_eq!(failed.value, Some(10));
        assert_eq!(failed.error_kind(), Some(ErrorKind::TransientFetch));
        assert_eq!(sync.stats().failures, 1);

        fetcher.fail.store(false, Ordering::SeqCst);
        fetcher.value.store(11, Ordering::SeqCst);
        let recovered = handle.wait_for(|snapshot| snapshot.error.is_none()).await.unwrap();
        assert_eq!(recovered.value, Some(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_coalesces_with_in_flight_fetch() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::slow(5, Duration::from_millis(500));

        let mut handle = sync.subscribe(key("quote"), fetcher.clone(), SubscribeOptions::manual()).unwrap();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls(), 1);

        assert!(!sync.trigger(&key("quote")));
        assert!(!handle.refetch());
        assert_eq!(fetcher.calls(), 1);

        handle.wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();
        assert!(sync.trigger(&key("quote")));
        assert!(sync.read(&key("quote")).is_validating);
        sleep(Duration::from_millis(600)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_ticks_are_skipped_without_drift() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(1);
        let typing = Arc::new(AtomicBool::new(false));

        let flag = typing.clone();
        let options = SubscribeOptions::interval_ms(100).paused_when(move || flag.load(Ordering::SeqCst));
        let _handle = sync.subscribe(key("swap"), fetcher.clone(), options).unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.calls(), 1);

        typing.store(true, Ordering::SeqCst);
        sleep(Duration::from_millis(340)).await;
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(sync.stats().skipped_ticks, 3);

        typing.store(false, Ordering::SeqCst);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unpaused_subscriber_keeps_shared_entry_fresh() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(1);

        let _typing = sync.subscribe(key("list"), fetcher.clone(), SubscribeOptions::interval_ms(100).paused_when(|| true)).unwrap();
        let _idle = sync.subscribe(key("list"), fetcher.clone(), SubscribeOptions::interval_ms(100)).unwrap();

        sleep(Duration::from_millis(250)).await;
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_last_unsubscribe_is_discarded() {
        let sync = synchronizer::<u64>(SyncConfig { grace_period_ms: 5_000, ..SyncConfig::default() });
        let fetcher = ScriptedFetcher::slow(9, Duration::from_millis(1_000));

        let handle = sync.subscribe(key("epoch"), fetcher.clone(), SubscribeOptions::interval_ms(5_000)).unwrap();
        sleep(Duration::from_millis(100)).await;
        drop(handle);

        sleep(Duration::from_millis(1_500)).await;
        let snapshot = sync.read(&key("epoch"));
        assert_eq!(snapshot.value, None);
        assert!(!snapshot.is_loading);
        assert_eq!(sync.stats().discarded, 1);

        // empty entry revalidates immediately on resubscribe
        let mut revived = sync.subscribe(key("epoch"), fetcher.clone(), SubscribeOptions::interval_ms(5_000)).unwrap();
        let snapshot = revived.wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();
        assert_eq!(snapshot.value, Some(9));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_from_replaced_entry_is_discarded() {
        let sync = synchronizer::<u64>(SyncConfig { grace_period_ms: 0, ..SyncConfig::default() });
        let slow = ScriptedFetcher::slow(1, Duration::from_millis(1_000));
        let fast = ScriptedFetcher::new(2);

        let first = sync.subscribe(key("price"), slow.clone(), SubscribeOptions::manual()).unwrap();
        sleep(Duration::from_millis(10)).await;
        drop(first);
        assert!(!sync.contains(&key("price")));

        let mut second = sync.subscribe(key("price"), fast.clone(), SubscribeOptions::manual()).unwrap();
        second.wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(sync.read(&key("price")).value, Some(2));
        assert_eq!(sync.stats().discarded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout_is_transient() {
        let sync = synchronizer::<u64>(SyncConfig { fetch_timeout_secs: 1, ..SyncConfig::default() });
        let fetcher = ScriptedFetcher::slow(1, Duration::from_secs(30));

        let mut handle = sync.subscribe(key("slow"), fetcher, SubscribeOptions::manual()).unwrap();
        let snapshot = handle.wait_for(|snapshot| snapshot.error.is_some()).await.unwrap();
        assert_eq!(snapshot.error, Some(FetchError::Timeout(1_000)));
        assert_eq!(snapshot.error_kind(), Some(ErrorKind::TransientFetch));
        assert!(!snapshot.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_key_creates_no_entry() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(1);

        let result = sync.subscribe(FetchKey::new(), fetcher.clone(), SubscribeOptions::manual());
        assert!(matches!(result, Err(SyncError::InvalidKey { .. })));

        let no_account: Option<alloy_primitives::Address> = None;
        let result = sync.subscribe(FetchKey::new().with(no_account).with("pendingBGT"), fetcher.clone(), SubscribeOptions::manual());
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::InvalidKey));

        assert!(sync.is_empty());
        sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_keys_are_noops() {
        let sync = synchronizer::<u64>(SyncConfig::default());

        assert_eq!(sync.read(&key("missing")), Snapshot::empty());
        assert!(!sync.trigger(&key("missing")));
        assert_eq!(sync.cached(&key("missing")), None);

        let handle = sync.subscribe(key("known"), ScriptedFetcher::new(1), SubscribeOptions::manual()).unwrap();
        sync.unsubscribe(&handle);
        sync.unsubscribe(&handle);
        handle.unsubscribe();
        assert!(!handle.is_active());
        assert!(!handle.refetch());
        assert_eq!(sync.subscriber_count(&key("known")), 0);
        assert_eq!(sync.stats().misuses, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_during_grace_period_does_not_fetch() {
        let sync = synchronizer::<u64>(SyncConfig { grace_period_ms: 2_000, ..SyncConfig::default() });
        let fetcher = ScriptedFetcher::new(4);

        let mut handle = sync.subscribe(key("epoch"), fetcher.clone(), SubscribeOptions::manual()).unwrap();
        handle.wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();
        drop(handle);
        assert!(sync.contains(&key("epoch")));

        assert!(!sync.trigger(&key("epoch")));
        sleep(Duration::from_millis(100)).await;
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(sync.stats().discarded, 0);
        assert_eq!(sync.stats().misuses, 1);
        assert_eq!(sync.read(&key("epoch")).value, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unschedulable_interval_does_not_stall_key() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(1);

        let _forever = sync.subscribe(key("epoch"), fetcher.clone(), SubscribeOptions::every(Duration::MAX)).unwrap();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.calls(), 1);

        // ticks at 110, 210 and 310
        let _fast = sync.subscribe(key("epoch"), fetcher.clone(), SubscribeOptions::interval_ms(100)).unwrap();
        sleep(Duration::from_millis(350)).await;
        assert_eq!(fetcher.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_read_waits_for_another_subscriber() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        assert_eq!(sync.cached(&key("pending")), None);

        let mut poller = sync.subscribe(key("pending"), ScriptedFetcher::new(42), SubscribeOptions::interval_ms(10_000)).unwrap();
        assert_eq!(sync.cached(&key("pending")), None);

        poller.wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();
        assert_eq!(sync.cached(&key("pending")), Some(42));
        assert_eq!(sync.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handles_observe_every_refresh() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(1);

        let mut handle = sync.subscribe(key("counter"), fetcher.clone(), SubscribeOptions::manual()).unwrap();
        handle.wait_for(|snapshot| snapshot.value == Some(1)).await.unwrap();

        fetcher.value.store(2, Ordering::SeqCst);
        assert!(handle.refetch());
        let mut seen = Vec::new();
        while let Some(snapshot) = handle.changed().await {
            if !snapshot.is_validating {
                seen.push(snapshot.value);
                break;
            }
        }
        assert_eq!(seen, vec![Some(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_epoch_timeline_scenario() {
        let sync = synchronizer::<EpochInfo>(SyncConfig::default());
        let clock = Arc::new(FixedClock::new(1_500));
        let fetcher = fetch_fn(|_network| async { Ok(EpochInfo { current: 10, start_time: 1_000, end_time: 2_000 }) });

        let mut timeline = EpochTimeline::subscribe(&sync, fetcher, clock.clone()).unwrap();
        assert!(timeline.view().is_loading);

        timeline.handle_mut().wait_for(|snapshot| snapshot.value.is_some()).await.unwrap();
        let view = timeline.view();
        assert!(!view.is_loading);
        assert_eq!(view.current, 10);
        assert_eq!(view.next, 11);
        assert_eq!(view.percent, 50.0);
        assert_eq!(view.duration_label, "8m 20s");
        assert_eq!(sync.read(&epoch_key()).value.map(|epoch| epoch.progress_percent(1_500)), Some(50.0));

        clock.set(2_500);
        assert_eq!(timeline.view().percent, 100.0);
        assert_eq!(timeline.view().duration_label, "<1 minute");
    }

    #[tokio::test(start_paused = true)]
    async fn test_builder_pattern() {
        let sync: LiveSynchronizer<u64> = LiveSynchronizerBuilder::new()
            .with_config(SyncConfig { grace_period_ms: 100, ..SyncConfig::default() })
            .with_network(NetworkConfig::default())
            .build();

        assert_eq!(sync.get_config().grace_period_ms, 100);
        assert_eq!(sync.network().chain.id, 2061);
        assert!(sync.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_keys_are_independent() {
        let sync = synchronizer::<u64>(SyncConfig::default());
        let fetcher = ScriptedFetcher::new(1);

        let handles: Vec<_> = (0..50u64)
            .map(|i| sync.subscribe(FetchKey::new().with("pool").with(i), fetcher.clone(), SubscribeOptions::manual()).unwrap())
            .collect();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(sync.len(), 50);
        assert_eq!(fetcher.calls(), 50);
        assert_eq!(sync.stats().subscriptions, 50);

        drop(handles);
        sleep(Duration::from_millis(2_100)).await;
        assert!(sync.is_empty());
    }
}

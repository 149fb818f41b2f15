use crate::data_sync::{FetchKey, FetcherWrapper, LiveSynchronizer, SubscribeOptions, SubscriptionHandle};
use crate::sync_error::SyncError;
use crate::utils::constants::Polling;
use alloy_primitives::utils::format_units;
use alloy_primitives::{Address, U256};

pub const PENDING_BGT_METHOD: &str = "pendingBGT";

/// Scale a raw token amount down by `decimals`. Unrepresentable amounts read as zero.
pub fn format_units_f64(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals).ok().and_then(|formatted| formatted.parse().ok()).unwrap_or(0.0)
}

/// Key of the pending reward balance of `account`. Invalid while no account is connected.
pub fn rewards_key(account: Option<Address>) -> FetchKey {
    FetchKey::new().with(account).with(PENDING_BGT_METHOD)
}

/// Polls the pending BGT rewards of one account.
pub struct RewardsPoller {
    sync: LiveSynchronizer<f64>,
    handle: SubscriptionHandle<f64>,
}

impl RewardsPoller {
    pub fn start(sync: &LiveSynchronizer<f64>, account: Option<Address>, fetcher: FetcherWrapper<f64>) -> Result<Self, SyncError> {
        let handle = sync.subscribe(rewards_key(account), fetcher, SubscribeOptions::every(Polling::Fast.interval()))?;
        Ok(Self { sync: sync.clone(), handle })
    }

    pub fn query_key(&self) -> &FetchKey {
        self.handle.key()
    }

    pub fn is_loading(&self) -> bool {
        self.handle.is_loading()
    }

    pub fn refetch(&self) -> bool {
        self.handle.refetch()
    }

    /// Read-only view for consumers that should not poll on their own.
    pub fn reader(&self) -> BgtRewards {
        BgtRewards { sync: self.sync.clone(), key: self.handle.key().clone() }
    }

    pub fn handle_mut(&mut self) -> &mut SubscriptionHandle<f64> {
        &mut self.handle
    }
}

/// Cached reward balance kept fresh by someone else's subscription.
#[derive(Clone)]
pub struct BgtRewards {
    sync: LiveSynchronizer<f64>,
    key: FetchKey,
}

impl BgtRewards {
    pub fn for_account(sync: &LiveSynchronizer<f64>, account: Address) -> Self {
        Self { sync: sync.clone(), key: rewards_key(Some(account)) }
    }

    /// `None` until a poller has populated the entry.
    pub fn get(&self) -> Option<f64> {
        self.sync.cached(&self.key)
    }
}

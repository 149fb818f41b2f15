// Three-Layer Architecture
pub mod data_sync;  // Sync Layer: keyed cache, refresh scheduling, subscriptions
pub mod logic;      // View Layer: epoch progress, rewards, validator search, swap quotes
pub mod sources;    // Source Layer: contract reads, validator list, quote routing

// Common utilities and types
pub mod constants;
pub mod sync_error;
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{
    fetch_fn, FetchKey, Fetcher, FetcherWrapper, KeyPart, LiveSynchronizer, LiveSynchronizerBuilder,
    PausePredicate, Snapshot, SubscribeOptions, SubscriptionHandle, SyncConfig, SyncStats,
};
pub use logic::{
    epoch_key, format_units_f64, rewards_key, BgtRewards, EpochInfo, EpochTimeline, RewardsPoller, SwapQuote,
    SwapRequest, SwapStep, TimelineView, TypingDebounce, ValidatorInfo, ValidatorList, ValidatorSearch,
};
pub use sources::{
    subscribe_quote, subscribe_validator_list, validator_list_key, ContractReader, EpochSource, JsonRpcReader, PendingRewardsSource, QuoteProvider,
    SwapQuoteSource, ValidatorListSource,
};
pub use sync_error::{ErrorKind, FetchError, SyncError};
pub use utils::{humanize_duration, Clock, FixedClock, NetworkConfig, Polling, SystemClock};

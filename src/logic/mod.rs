/// View Layer
///
/// Turns synchronized chain data into what the dashboards display:
/// - Epoch progress and time left until the next epoch
/// - Pending reward balances, polled or read from another poller's cache
/// - Validator lookup and keyword search gated on typing activity
/// - Swap quote requests, keys and placeholders

pub mod epoch;
pub mod rewards;
pub mod swap;
pub mod typing;
pub mod validators;

pub use epoch::{epoch_key, EpochInfo, EpochTimeline, TimelineView};
pub use rewards::{format_units_f64, rewards_key, BgtRewards, RewardsPoller};
pub use swap::{SwapQuote, SwapRequest, SwapStep};
pub use typing::TypingDebounce;
pub use validators::{ValidatorInfo, ValidatorList, ValidatorListFile, ValidatorSearch};

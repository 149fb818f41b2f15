/// Source Layer
///
/// Fetchers the synchronizer runs to read remote state:
/// - Contract reads through `eth_call` (epochs, pending rewards)
/// - The validator list document over HTTP
/// - Swap quotes from an external router

pub mod epochs;
pub mod rewards;
pub mod rpc;
pub mod swap;
pub mod validators;

pub use epochs::EpochSource;
pub use rewards::PendingRewardsSource;
pub use rpc::{read_contract, ContractReader, ContractReaderWrapper, JsonRpcReader};
pub use swap::{subscribe_quote, QuoteProvider, QuoteProviderWrapper, SwapQuoteSource};
pub use validators::{subscribe_validator_list, validator_list_key, ValidatorListSource};

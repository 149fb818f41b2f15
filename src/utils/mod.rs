pub mod clock;
pub mod config_loader;
pub mod constants;
pub mod duration;
pub mod network;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config_loader::*;
pub use constants::*;
pub use duration::humanize_duration;
pub use network::{ChainConfig, ContractAddresses, NativeCurrency, NetworkConfig};

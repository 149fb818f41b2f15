use alloy_primitives::Address;

pub const POLARIS_CHAIN_ID: u64 = 2061;

pub const POLARIS_RPC_URLS: [&str; 2] = ["http://devnet.beraswillmakeit.com:8545", "http://guarded.beraswillmakeit.com:8545"];

pub const POLARIS_EXPLORER_URL: &str = "k8s-guardedt-explorer-f0d73f8a8b-1f6003a02eec3390.elb.us-west-2.amazonaws.com";

/// BGT and HONEY both use 18 decimals.
pub const BGT_DECIMALS: u8 = 18;

/// Unconfigured contract address. Sources reading it report `Unavailable`.
pub const UNSET: Address = Address::ZERO;

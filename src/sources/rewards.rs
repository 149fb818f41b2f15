use crate::constants::BGT_DECIMALS;
use crate::data_sync::Fetcher;
use crate::logic::rewards::format_units_f64;
use crate::sources::rpc::{read_contract, ContractReaderWrapper};
use crate::sync_error::FetchError;
use crate::utils::network::NetworkConfig;
use alloy_primitives::Address;
use alloy_sol_types::sol;
use async_trait::async_trait;

sol! {
    interface IBHoneyVault {
        function pendingBGT(address account) external view returns (uint256);
    }
}

/// Pending BGT rewards of one account in the bHONEY vault, in whole tokens.
pub struct PendingRewardsSource {
    reader: ContractReaderWrapper,
    account: Address,
}

impl PendingRewardsSource {
    pub fn new(reader: ContractReaderWrapper, account: Address) -> Self {
        Self { reader, account }
    }
}

#[async_trait]
impl Fetcher<f64> for PendingRewardsSource {
    async fn fetch(&self, network: &NetworkConfig) -> Result<f64, FetchError> {
        let pending = read_contract(
            self.reader.as_ref(),
            network.contracts.bhoney_vault,
            IBHoneyVault::pendingBGTCall { account: self.account },
        )
        .await?;
        Ok(format_units_f64(pending, BGT_DECIMALS))
    }
}

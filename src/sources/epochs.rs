use crate::data_sync::Fetcher;
use crate::logic::epoch::EpochInfo;
use crate::sources::rpc::{read_contract, ContractReaderWrapper};
use crate::sync_error::FetchError;
use crate::utils::network::NetworkConfig;
use alloy_sol_types::sol;
use async_trait::async_trait;

sol! {
    interface IBeraEpochs {
        function getCurrentEpoch() external view returns (uint64 current, uint64 startTime, uint64 endTime);
    }
}

/// Reads the current epoch from the epochs contract.
pub struct EpochSource {
    reader: ContractReaderWrapper,
}

impl EpochSource {
    pub fn new(reader: ContractReaderWrapper) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl Fetcher<EpochInfo> for EpochSource {
    async fn fetch(&self, network: &NetworkConfig) -> Result<EpochInfo, FetchError> {
        let epoch = read_contract(self.reader.as_ref(), network.contracts.epochs, IBeraEpochs::getCurrentEpochCall {}).await?;
        if epoch.endTime < epoch.startTime {
            return Err(FetchError::Decode(format!("epoch {} ends before it starts", epoch.current)));
        }
        Ok(EpochInfo { current: epoch.current, start_time: epoch.startTime, end_time: epoch.endTime })
    }
}

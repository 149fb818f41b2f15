use crate::data_sync::{FetchKey, Fetcher, LiveSynchronizer, SubscribeOptions, SubscriptionHandle};
use crate::logic::validators::{ValidatorList, ValidatorListFile, VALIDATOR_LIST_METHOD};
use crate::sync_error::{FetchError, SyncError};
use crate::utils::network::NetworkConfig;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub fn validator_list_key() -> FetchKey {
    FetchKey::new().with(VALIDATOR_LIST_METHOD)
}

/// Downloads the validator list document named by the network configuration.
#[derive(Debug, Clone)]
pub struct ValidatorListSource {
    http_client: reqwest::Client,
}

impl ValidatorListSource {
    pub fn new(timeout: Duration) -> eyre::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| eyre::eyre!("Failed to create HTTP client: {}", e))?;
        Ok(Self { http_client })
    }

    pub fn parse(body: &str) -> Result<ValidatorList, FetchError> {
        let file: ValidatorListFile = serde_json::from_str(body)?;
        Ok(file.into())
    }
}

#[async_trait]
impl Fetcher<ValidatorList> for ValidatorListSource {
    async fn fetch(&self, network: &NetworkConfig) -> Result<ValidatorList, FetchError> {
        let url = network
            .validator_list_url
            .as_deref()
            .ok_or_else(|| FetchError::Unavailable(format!("no validator list for {}", network.chain.name)))?;

        let response = self.http_client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let list = Self::parse(&body)?;
        debug!("Loaded {} validators from {}", list.len(), url);
        Ok(list)
    }
}

/// The list changes rarely, so it is fetched once and refreshed only on demand.
pub fn subscribe_validator_list(
    sync: &LiveSynchronizer<ValidatorList>,
    source: Arc<ValidatorListSource>,
) -> Result<SubscriptionHandle<ValidatorList>, SyncError> {
    sync.subscribe(validator_list_key(), source, SubscribeOptions::manual())
}

use crate::constants::{POLARIS_CHAIN_ID, POLARIS_EXPLORER_URL, POLARIS_RPC_URLS, UNSET};
use crate::utils::config_loader::{load_from_file, load_from_file_sync, LoadConfigError, SyncConfigLoader, SyncConfigLoaderSync};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub explorer_url: Option<String>,
}

/// Contract addresses read by the data sources. `Address::ZERO` means not deployed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractAddresses {
    #[serde(default)]
    pub epochs: Address,
    #[serde(default)]
    pub bhoney_vault: Address,
}

/// Network configuration handed to every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain: ChainConfig,
    #[serde(default)]
    pub contracts: ContractAddresses,
    #[serde(default)]
    pub validator_list_url: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                id: POLARIS_CHAIN_ID,
                name: "Polaris".to_string(),
                native_currency: NativeCurrency { name: "Polaris".to_string(), symbol: "tbera".to_string(), decimals: 18 },
                rpc_urls: POLARIS_RPC_URLS.iter().map(|url| url.to_string()).collect(),
                explorer_url: Some(POLARIS_EXPLORER_URL.to_string()),
            },
            contracts: ContractAddresses { epochs: UNSET, bhoney_vault: UNSET },
            validator_list_url: None,
        }
    }
}

impl NetworkConfig {
    /// Default network with `RPC_HTTP_URL`, `EPOCHS_ADDRESS`, `BHONEY_VAULT_ADDRESS`
    /// and `VALIDATOR_LIST_URL` overrides.
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(rpc_http_url) = std::env::var("RPC_HTTP_URL") {
            let _url = Url::parse(&rpc_http_url).map_err(|e| eyre::eyre!("Invalid RPC_HTTP_URL: {}", e))?;
            config.chain.rpc_urls = vec![rpc_http_url];
        }

        if let Ok(epochs) = std::env::var("EPOCHS_ADDRESS") {
            config.contracts.epochs = epochs.parse().map_err(|e| eyre::eyre!("Invalid EPOCHS_ADDRESS: {}", e))?;
        }

        if let Ok(vault) = std::env::var("BHONEY_VAULT_ADDRESS") {
            config.contracts.bhoney_vault = vault.parse().map_err(|e| eyre::eyre!("Invalid BHONEY_VAULT_ADDRESS: {}", e))?;
        }

        if let Ok(list_url) = std::env::var("VALIDATOR_LIST_URL") {
            let _url = Url::parse(&list_url).map_err(|e| eyre::eyre!("Invalid VALIDATOR_LIST_URL: {}", e))?;
            config.validator_list_url = Some(list_url);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.chain.rpc_urls.is_empty() {
            return Err(eyre::eyre!("Network {} has no rpc urls", self.chain.name));
        }
        for rpc_url in &self.chain.rpc_urls {
            Url::parse(rpc_url).map_err(|e| eyre::eyre!("Invalid rpc url {}: {}", rpc_url, e))?;
        }
        Ok(())
    }

    /// First configured HTTP endpoint.
    pub fn primary_rpc_url(&self) -> Option<&str> {
        self.chain.rpc_urls.first().map(String::as_str)
    }
}

#[async_trait]
impl SyncConfigLoader for NetworkConfig {
    type SectionType = NetworkConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let config: NetworkConfig = load_from_file(file_name).await?;
        config.validate().map_err(|e| LoadConfigError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}

impl SyncConfigLoaderSync for NetworkConfig {
    type SectionType = NetworkConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let config: NetworkConfig = load_from_file_sync(file_name)?;
        config.validate().map_err(|e| LoadConfigError::ConfigError(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use std::path::PathBuf;

    fn write_config(name: &str, rpc_url: &str, epochs_var: &str) -> String {
        let path: PathBuf = std::env::temp_dir().join(format!("live-sync-{}-{}.toml", name, std::process::id()));
        let raw = format!(
            r#"
            [chain]
            id = 80085
            name = "Artio"
            rpc_urls = ["{rpc_url}"]

            [chain.native_currency]
            name = "Bera"
            symbol = "BERA"
            decimals = 18

            [contracts]
            epochs = "${{{epochs_var}}}"
            "#
        );
        std::fs::write(&path, raw).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_default_network() {
        let config = NetworkConfig::default();
        assert_eq!(config.chain.id, 2061);
        assert_eq!(config.chain.native_currency.symbol, "tbera");
        assert_eq!(config.primary_rpc_url(), Some("http://devnet.beraswillmakeit.com:8545"));
        assert_eq!(config.contracts.epochs, Address::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_rpc_url() {
        let mut config = NetworkConfig::default();
        config.chain.rpc_urls = vec!["not a url".to_string()];
        assert!(config.validate().is_err());

        config.chain.rpc_urls.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml_section() {
        let raw = r#"
            validator_list_url = "https://example.org/validators.json"

            [chain]
            id = 80085
            name = "Artio"
            rpc_urls = ["https://artio.rpc.berachain.com"]

            [chain.native_currency]
            name = "Bera"
            symbol = "BERA"
            decimals = 18

            [contracts]
            epochs = "0x1234567890123456789012345678901234567890"
        "#;
        let config: NetworkConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.chain.id, 80085);
        assert_eq!(config.contracts.epochs, address!("0x1234567890123456789012345678901234567890"));
        assert_eq!(config.contracts.bhoney_vault, Address::ZERO);
        assert!(config.chain.explorer_url.is_none());
    }

    #[tokio::test]
    async fn test_load_section_from_file() {
        // SAFETY: variable is private to this test
        unsafe { std::env::set_var("LIVE_SYNC_TEST_EPOCHS_VALID", "0x1234567890123456789012345678901234567890") };
        let file = write_config("valid", "https://artio.rpc.berachain.com", "LIVE_SYNC_TEST_EPOCHS_VALID");

        let config = NetworkConfig::load_section_from_file(file.clone()).await.unwrap();
        assert_eq!(config.chain.id, 80085);
        assert_eq!(config.contracts.epochs, address!("0x1234567890123456789012345678901234567890"));

        let config_sync = NetworkConfig::load_section_from_file_sync(file.clone()).unwrap();
        assert_eq!(config_sync, config);
        std::fs::remove_file(file).unwrap();
    }

    #[tokio::test]
    async fn test_load_section_rejects_bad_rpc_url() {
        // SAFETY: variable is private to this test
        unsafe { std::env::set_var("LIVE_SYNC_TEST_EPOCHS_INVALID", "0x1234567890123456789012345678901234567890") };
        let file = write_config("invalid", "not a url", "LIVE_SYNC_TEST_EPOCHS_INVALID");

        let result = NetworkConfig::load_section_from_file(file.clone()).await;
        assert!(matches!(result, Err(LoadConfigError::ConfigError(_))));

        let result = NetworkConfig::load_section_from_file_sync(file.clone());
        assert!(matches!(result, Err(LoadConfigError::ConfigError(_))));
        std::fs::remove_file(file).unwrap();
    }
}

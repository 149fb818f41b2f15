use crate::sync_error::FetchError;
use crate::utils::network::NetworkConfig;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Read-only contract access (`eth_call`).
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, FetchError>;
}

pub type ContractReaderWrapper = Arc<dyn ContractReader>;

/// Encode `call`, run it against `to` and decode the return data.
pub async fn read_contract<C: SolCall + Send>(reader: &dyn ContractReader, to: Address, call: C) -> Result<C::Return, FetchError> {
    if to == Address::ZERO {
        return Err(FetchError::Unavailable(format!("contract for {} is not configured", C::SIGNATURE)));
    }
    let response = reader.call(to, call.abi_encode().into()).await?;
    Ok(C::abi_decode_returns(&response)?)
}

/// `eth_call` over HTTP JSON-RPC
#[derive(Debug, Clone)]
pub struct JsonRpcReader {
    http_client: reqwest::Client,
    rpc_url: String,
}

impl JsonRpcReader {
    pub fn new(rpc_url: String, timeout: Duration) -> eyre::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| eyre::eyre!("Failed to create HTTP client: {}", e))?;

        Ok(Self { http_client, rpc_url })
    }

    /// Reader for the first RPC url of `network`.
    pub fn from_network(network: &NetworkConfig, timeout: Duration) -> eyre::Result<Self> {
        let rpc_url = network
            .primary_rpc_url()
            .ok_or_else(|| eyre::eyre!("Network {} has no rpc urls", network.chain.name))?;
        Self::new(rpc_url.to_string(), timeout)
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn eth_call_request(to: Address, data: &Bytes) -> Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_call",
            "params": [
                {
                    "to": format!("{:#x}", to),
                    "data": format!("{}", data)
                },
                "latest"
            ],
            "id": 1
        })
    }

    pub fn parse_eth_call_response(response_json: &Value) -> Result<Bytes, FetchError> {
        if let Some(error) = response_json.get("error") {
            return Err(FetchError::Rpc(error.to_string()));
        }

        let result = response_json
            .get("result")
            .and_then(|r| r.as_str())
            .ok_or_else(|| FetchError::Decode("missing result in RPC response".to_string()))?;

        let bytes = hex::decode(result.trim_start_matches("0x"))?;
        Ok(bytes.into())
    }
}

#[async_trait]
impl ContractReader for JsonRpcReader {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, FetchError> {
        let request_body = Self::eth_call_request(to, &data);

        let response = self.http_client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let response_json: Value = response.json().await?;
        Self::parse_eth_call_response(&response_json)
    }
}

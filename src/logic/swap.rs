use crate::data_sync::{FetchKey, KeyPart, Snapshot};
use crate::sync_error::FetchError;
use alloy_primitives::utils::parse_units;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub token_in_decimals: u8,
    pub token_out_decimals: u8,
    /// Amount of `token_in` as typed by the user, in whole units.
    pub amount: String,
}

impl SwapRequest {
    /// Quote key. The amount is a required part, so an empty input makes the key invalid.
    pub fn key(&self) -> FetchKey {
        let amount = self.amount.trim();
        let amount_part = if amount.is_empty() { KeyPart::Absent } else { KeyPart::Str(amount.to_string()) };
        FetchKey::new().with("swap").with(self.token_in).with(self.token_out).with(amount_part)
    }

    /// `amount` scaled to `token_in` base units.
    pub fn amount_in(&self) -> Result<U256, FetchError> {
        parse_units(self.amount.trim(), self.token_in_decimals)
            .map(|units| units.get_absolute())
            .map_err(|e| FetchError::Decode(format!("invalid swap amount {:?}: {}", self.amount, e)))
    }
}

/// One hop of a routed swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStep {
    pub pool_idx: U256,
    pub base: Address,
    pub quote: Address,
    pub is_buy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub batch_swap_steps: Vec<SwapStep>,
    pub formatted_swap_amount: String,
    pub formatted_amount_in: String,
    pub formatted_return_amount: String,
    pub amount_in: U256,
    pub return_amount: U256,
    pub token_in: Address,
    pub token_out: Address,
    /// Native value to attach when the input token is the gas token.
    pub value: Option<U256>,
    pub predicted_amount_out: U256,
    pub formatted_predicted_amount_out: String,
}

impl SwapQuote {
    /// Zeroed quote that only echoes the requested amount.
    pub fn placeholder(request: &SwapRequest) -> Self {
        let amount = request.amount.trim();
        Self {
            batch_swap_steps: Vec::new(),
            formatted_swap_amount: if amount.is_empty() { "0".to_string() } else { amount.to_string() },
            formatted_amount_in: "0".to_string(),
            formatted_return_amount: "0".to_string(),
            amount_in: U256::ZERO,
            return_amount: U256::ZERO,
            token_in: request.token_in,
            token_out: request.token_out,
            value: None,
            predicted_amount_out: U256::ZERO,
            formatted_predicted_amount_out: "0".to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.batch_swap_steps.is_empty() && self.return_amount.is_zero()
    }

    /// Latest real quote, or the placeholder while none has arrived.
    pub fn display(snapshot: &Snapshot<SwapQuote>, request: &SwapRequest) -> Self {
        snapshot.value.clone().unwrap_or_else(|| Self::placeholder(request))
    }
}

use crate::data_sync::{Fetcher, LiveSynchronizer, SubscribeOptions, SubscriptionHandle};
use crate::logic::swap::{SwapQuote, SwapRequest};
use crate::logic::typing::TypingDebounce;
use crate::sync_error::{FetchError, SyncError};
use crate::utils::constants::Polling;
use crate::utils::network::NetworkConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Route finder that prices a swap. Provided by the DEX integration.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(&self, request: &SwapRequest, network: &NetworkConfig) -> Result<SwapQuote, FetchError>;
}

pub type QuoteProviderWrapper = Arc<dyn QuoteProvider>;

/// Polls a quote for one swap request.
pub struct SwapQuoteSource {
    provider: QuoteProviderWrapper,
    request: SwapRequest,
}

impl SwapQuoteSource {
    pub fn new(provider: QuoteProviderWrapper, request: SwapRequest) -> Self {
        Self { provider, request }
    }

    pub fn request(&self) -> &SwapRequest {
        &self.request
    }
}

#[async_trait]
impl Fetcher<SwapQuote> for SwapQuoteSource {
    async fn fetch(&self, network: &NetworkConfig) -> Result<SwapQuote, FetchError> {
        // Reject malformed input before asking the router
        self.request.amount_in()?;
        self.provider.quote(&self.request, network).await
    }
}

/// Keep a quote for `request` fresh, holding refreshes while the amount is being typed.
///
/// An empty amount yields an invalid key; show [`SwapQuote::placeholder`] instead.
pub fn subscribe_quote(
    sync: &LiveSynchronizer<SwapQuote>,
    provider: QuoteProviderWrapper,
    request: SwapRequest,
    typing: &Arc<TypingDebounce>,
) -> Result<SubscriptionHandle<SwapQuote>, SyncError> {
    let key = request.key();
    let options = SubscribeOptions::every(Polling::Normal.interval()).with_pause(typing.pause_predicate());
    sync.subscribe(key, Arc::new(SwapQuoteSource::new(provider, request)), options)
}

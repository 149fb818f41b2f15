use crate::sync_error::FetchError;
use crate::utils::network::NetworkConfig;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// How to read one piece of remote state.
#[async_trait]
pub trait Fetcher<V>: Send + Sync {
    async fn fetch(&self, network: &NetworkConfig) -> Result<V, FetchError>;
}

pub type FetcherWrapper<V> = Arc<dyn Fetcher<V>>;

/// Adapts an async closure into a [`Fetcher`].
pub struct FnFetcher<F, V> {
    f: F,
    _value: PhantomData<fn() -> V>,
}

#[async_trait]
impl<F, Fut, V> Fetcher<V> for FnFetcher<F, V>
where
    F: Fn(NetworkConfig) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V, FetchError>> + Send,
    V: Send,
{
    async fn fetch(&self, network: &NetworkConfig) -> Result<V, FetchError> {
        (self.f)(network.clone()).await
    }
}

/// Wrap an async closure taking the network configuration.
pub fn fetch_fn<F, Fut, V>(f: F) -> FetcherWrapper<V>
where
    F: Fn(NetworkConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, FetchError>> + Send + 'static,
    V: Send + 'static,
{
    Arc::new(FnFetcher { f, _value: PhantomData })
}

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::FetchResult;
use crate::response::FetchResponse;

/// Retrieves remote documents.
///
/// Implementations return only successful responses; anything else is a
/// [`crate::FetchError::Status`].
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &Url) -> FetchResult<FetchResponse>;
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    async fn get(&self, url: &Url) -> FetchResult<FetchResponse> {
        (**self).get(url).await
    }
}

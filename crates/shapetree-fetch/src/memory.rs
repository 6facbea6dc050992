//! Fetcher over a preloaded table of documents.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::response::FetchResponse;
use crate::traits::Fetch;

/// Serves documents registered with [`MemoryFetcher::insert`]. Fragments are
/// ignored when looking up a URL. Every call is counted, hit or miss.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    documents: RwLock<HashMap<String, (String, Bytes)>>,
    calls: AtomicUsize,
}

fn key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &Url, media_type: &str, body: impl Into<Bytes>) -> FetchResult<()> {
        self.documents
            .write()
            .map_err(|e| FetchError::Poisoned(e.to_string()))?
            .insert(key(url), (media_type.to_string(), body.into()));
        Ok(())
    }

    /// Builder-style [`MemoryFetcher::insert`] for fixtures.
    pub fn with(self, url: &Url, media_type: &str, body: impl Into<Bytes>) -> FetchResult<Self> {
        self.insert(url, media_type, body)?;
        Ok(self)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for MemoryFetcher {
    async fn get(&self, url: &Url) -> FetchResult<FetchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let documents = self
            .documents
            .read()
            .map_err(|e| FetchError::Poisoned(e.to_string()))?;
        let (media_type, body) = documents.get(&key(url)).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })?;
        Ok(FetchResponse::new(
            url.clone(),
            200,
            vec![("content-type".to_string(), media_type.clone())],
            body.clone(),
        ))
    }
}

//! Write-once on-disk cache in front of a [`Fetch`].
//!
//! Each entry is one file named by [`cache_key`]: escaped `name: value`
//! header lines, a blank line, then the raw body. Entries are never
//! rewritten and never expire; [`CachingFetcher::clear`] is the only way to
//! drop them. Requests to the serving origin bypass the cache.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use url::{Origin, Url};

use crate::error::{FetchError, FetchResult};
use crate::response::FetchResponse;
use crate::traits::Fetch;

/// The file name an entry for `url` is stored under: the URL without its
/// fragment, keeping only ASCII letters, digits, `_` and `-`.
pub fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.as_str()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Headers whose values change on every fetch and are not worth replaying.
fn is_volatile(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("date") || name.contains("time")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Serialize the replayable part of a response.
pub fn encode_entry(headers: &[(String, String)], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 256);
    for (name, value) in headers.iter().filter(|(n, _)| !is_volatile(n)) {
        out.extend_from_slice(format!("{}: {}\n", escape(name), escape(value)).as_bytes());
    }
    out.push(b'\n');
    out.extend_from_slice(body);
    out
}

/// Split an entry into its headers and body.
pub fn decode_entry(key: &str, blob: &[u8]) -> FetchResult<(Vec<(String, String)>, Bytes)> {
    let corrupt = |reason: &str| FetchError::CorruptEntry {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    let (block, body) = if blob.first() == Some(&b'\n') {
        (&blob[..0], &blob[1..])
    } else {
        let split = blob
            .windows(2)
            .position(|w| w == b"\n\n")
            .ok_or_else(|| corrupt("no header terminator"))?;
        (&blob[..split], &blob[split + 2..])
    };
    let block = std::str::from_utf8(block).map_err(|_| corrupt("header block is not UTF-8"))?;
    let headers = block
        .lines()
        .map(|line| {
            line.split_once(": ")
                .map(|(n, v)| (unescape(n), unescape(v)))
                .ok_or_else(|| corrupt("header line without separator"))
        })
        .collect::<FetchResult<Vec<_>>>()?;
    Ok((headers, Bytes::copy_from_slice(body)))
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A [`Fetch`] that remembers every successful response on disk.
#[derive(Debug)]
pub struct CachingFetcher<F> {
    inner: F,
    dir: PathBuf,
    bypass: Option<Origin>,
}

impl<F: Fetch> CachingFetcher<F> {
    pub fn new(inner: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
            bypass: None,
        }
    }

    /// Never cache documents served from the same origin as `serving`.
    pub fn with_serving_origin(mut self, serving: &Url) -> Self {
        self.bypass = Some(serving.origin());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Path of the entry for `url`, whether or not it exists yet.
    pub fn entry_path(&self, url: &Url) -> PathBuf {
        self.dir.join(cache_key(url))
    }

    /// Drop every entry.
    pub async fn clear(&self) -> FetchResult<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        tracing::info!(dir = %self.dir.display(), "cleared fetch cache");
        Ok(())
    }

    /// Publish `blob` at `path` unless an entry is already there.
    async fn store(&self, path: &Path, blob: &[u8]) -> FetchResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let temp = self.dir.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let published = publish(&temp, path, blob).await;
        match tokio::fs::remove_file(&temp).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(temp = %temp.display(), error = %e, "could not remove cache temp file"),
        }
        published
    }
}

async fn publish(temp: &Path, path: &Path, blob: &[u8]) -> FetchResult<()> {
    tokio::fs::write(temp, blob).await?;
    // A hard link fails if the target exists, so a racing writer cannot be clobbered.
    match tokio::fs::hard_link(temp, path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn replay(url: &Url, key: &str, blob: &[u8]) -> FetchResult<FetchResponse> {
    let (headers, body) = decode_entry(key, blob)?;
    Ok(FetchResponse::new(url.clone(), 200, headers, body))
}

#[async_trait]
impl<F: Fetch> Fetch for CachingFetcher<F> {
    async fn get(&self, url: &Url) -> FetchResult<FetchResponse> {
        if self.bypass.as_ref() == Some(&url.origin()) {
            tracing::debug!(url = %url, "same origin, cache bypassed");
            return self.inner.get(url).await;
        }

        let key = cache_key(url);
        let path = self.dir.join(&key);
        match tokio::fs::read(&path).await {
            Ok(blob) => {
                tracing::debug!(url = %url, key = %key, "fetch cache hit");
                return replay(url, &key, &blob);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(url = %url, key = %key, error = %e, "could not read fetch cache entry"),
        }

        tracing::debug!(url = %url, key = %key, "fetch cache miss");
        let response = self.inner.get(url).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        let blob = encode_entry(&response.headers, &response.body);
        if let Err(e) = self.store(&path, &blob).await {
            tracing::warn!(url = %url, key = %key, error = %e, "could not store fetch cache entry");
        }
        replay(url, &key, &blob)
    }
}

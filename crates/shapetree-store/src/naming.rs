//! First-available-name search.
//!
//! Every caller that needs a fresh child name (both backends'
//! `invent_container`, the dispatcher's slug handling) goes through
//! [`first_available_name`], so identical inputs always yield identical names.

use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::traits::Storage;

/// Upper bound on candidates tried before giving up.
pub const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Check that `name` can be used as a single path segment.
pub fn validate_segment(name: &str) -> StoreResult<&str> {
    let trimmed = name.trim_end_matches('/');
    let reason = if trimmed.is_empty() {
        Some("empty")
    } else if trimmed == "." || trimmed == ".." {
        Some("dot segment")
    } else if trimmed.contains('/') {
        Some("contains a path separator")
    } else if trimmed.chars().any(|c| c.is_control() || c == '?' || c == '#') {
        Some("contains a reserved character")
    } else if trimmed.ends_with(crate::traits::METADATA_SUFFIX) {
        Some("reserved for metadata")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(StoreError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(trimmed),
    }
}

/// The `n`th candidate for `base`: `base`, `base-1`, `base-2`, ...
pub fn candidate_name(base: &str, n: usize, is_container: bool) -> String {
    let mut name = if n == 0 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    };
    if is_container {
        name.push('/');
    }
    name
}

/// Find the first unused child identifier of `parent` derived from `base`.
///
/// A candidate is taken if either its container form (`name/`) or its
/// resource form (`name`) exists, since both map to the same path segment.
pub async fn first_available_name<S: Storage + ?Sized>(
    storage: &S,
    parent: &Url,
    base: &str,
    is_container: bool,
) -> StoreResult<Url> {
    let base = validate_segment(base)?;
    for n in 0..MAX_NAME_ATTEMPTS {
        let as_resource = parent.join(&candidate_name(base, n, false))?;
        let as_container = parent.join(&candidate_name(base, n, true))?;
        if storage.exists(&as_resource).await? || storage.exists(&as_container).await? {
            continue;
        }
        if n > 0 {
            tracing::debug!(parent = %parent, base, tried = n + 1, "resolved name collision");
        }
        return Ok(if is_container { as_container } else { as_resource });
    }
    Err(StoreError::NameExhausted {
        parent: parent.to_string(),
        base: base.to_string(),
        tried: MAX_NAME_ATTEMPTS,
    })
}

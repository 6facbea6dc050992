//! Resource identifier rules.
//!
//! Identifiers are absolute URLs. Container identifiers end in exactly one
//! `/`; resource identifiers do not end in `/` at all.

use url::Url;

use crate::error::IdError;

/// Check that `id` is usable as a container identifier.
pub fn check_container_id(id: &Url) -> Result<(), IdError> {
    if id.cannot_be_a_base() {
        return Err(IdError::InvalidContainerId {
            id: id.to_string(),
            reason: "not a hierarchical URL",
        });
    }
    let path = id.path();
    if !path.ends_with('/') {
        return Err(IdError::InvalidContainerId {
            id: id.to_string(),
            reason: "missing trailing separator",
        });
    }
    if path.ends_with("//") {
        return Err(IdError::InvalidContainerId {
            id: id.to_string(),
            reason: "double trailing separator",
        });
    }
    if id.query().is_some() || id.fragment().is_some() {
        return Err(IdError::InvalidContainerId {
            id: id.to_string(),
            reason: "query or fragment present",
        });
    }
    Ok(())
}

/// Parse and check a container identifier in one step.
pub fn parse_container_id(text: &str) -> Result<Url, IdError> {
    let url = Url::parse(text).map_err(|e| IdError::InvalidId {
        id: text.to_string(),
        reason: e.to_string(),
    })?;
    check_container_id(&url)?;
    Ok(url)
}

/// Copy of `url` without its fragment.
pub fn strip_fragment(url: &Url) -> Url {
    let mut doc = url.clone();
    doc.set_fragment(None);
    doc
}

/// Append a `/` unless `name` already ends with one.
pub fn ensure_trailing_slash(name: &str) -> String {
    if name.ends_with('/') {
        name.to_string()
    } else {
        format!("{name}/")
    }
}

/// The container directly holding `id`, or `None` for an origin root.
pub fn parent_container(id: &Url) -> Option<Url> {
    let path = id.path().trim_end_matches('/');
    if path.is_empty() {
        return None;
    }
    let cut = path.rfind('/')?;
    let mut parent = id.clone();
    parent.set_fragment(None);
    parent.set_query(None);
    parent.set_path(&path[..=cut]);
    Some(parent)
}

/// The last path segment of `id`, without any trailing `/`.
pub fn last_segment(id: &Url) -> Option<&str> {
    let path = id.path().trim_end_matches('/');
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn accepts_single_trailing_separator() {
        assert!(check_container_id(&url("http://localhost/Apps/")).is_ok());
        assert!(check_container_id(&url("http://localhost/")).is_ok());
    }

    #[test]
    fn rejects_missing_separator() {
        let err = check_container_id(&url("http://localhost/Apps")).unwrap_err();
        assert!(matches!(err, IdError::InvalidContainerId { reason: "missing trailing separator", .. }));
    }

    #[test]
    fn rejects_double_separator() {
        let err = check_container_id(&url("http://localhost/Apps//")).unwrap_err();
        assert!(matches!(err, IdError::InvalidContainerId { reason: "double trailing separator", .. }));
    }

    #[test]
    fn rejects_fragment() {
        assert!(check_container_id(&url("http://localhost/Apps/#x")).is_err());
    }

    #[test]
    fn rejects_non_hierarchical() {
        assert!(check_container_id(&url("urn:x:y/")).is_err());
    }

    #[test]
    fn parse_rejects_relative() {
        assert!(matches!(parse_container_id("/Apps/"), Err(IdError::InvalidId { .. })));
    }

    #[test]
    fn fragment_stripping() {
        let s = strip_fragment(&url("http://ex.org/schemas/gh#root"));
        assert_eq!(s.as_str(), "http://ex.org/schemas/gh");
    }

    #[test]
    fn trailing_slash() {
        assert_eq!(ensure_trailing_slash("a"), "a/");
        assert_eq!(ensure_trailing_slash("a/"), "a/");
    }

    #[test]
    fn parents() {
        assert_eq!(parent_container(&url("http://h/a/b/")).unwrap().as_str(), "http://h/a/");
        assert_eq!(parent_container(&url("http://h/a/b")).unwrap().as_str(), "http://h/a/");
        assert_eq!(parent_container(&url("http://h/a")).unwrap().as_str(), "http://h/");
        assert!(parent_container(&url("http://h/")).is_none());
    }

    #[test]
    fn segments() {
        assert_eq!(last_segment(&url("http://h/a/b/")), Some("b"));
        assert_eq!(last_segment(&url("http://h/a/c.ttl")), Some("c.ttl"));
        assert_eq!(last_segment(&url("http://h/")), None);
    }

    proptest! {
        #[test]
        fn exactly_one_trailing_separator(segs in proptest::collection::vec("[a-z0-9]{1,8}", 0..4), extra in 0usize..3) {
            let mut text = String::from("http://localhost/");
            for s in &segs {
                text.push_str(s);
                text.push('/');
            }
            if segs.is_empty() && extra == 0 {
                prop_assert!(check_container_id(&url(&text)).is_ok());
            } else if !segs.is_empty() {
                if extra == 0 {
                    text.pop();
                } else {
                    for _ in 1..extra {
                        text.push('/');
                    }
                }
                let ok = check_container_id(&url(&text)).is_ok();
                prop_assert_eq!(ok, extra == 1);
            }
        }
    }
}

use std::collections::BTreeMap;

use shapetree_types::vocab::DEFAULT_PREFIXES;

/// Namespace prefix mapping used when reading and writing Turtle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prefixes {
    map: BTreeMap<String, String>,
}

impl Prefixes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conventional ShapeTree prefixes (`ldp:`, `tree:`, `rdf:` ...).
    pub fn with_defaults() -> Self {
        let mut prefixes = Self::new();
        for (name, ns) in DEFAULT_PREFIXES {
            prefixes.insert(*name, *ns);
        }
        prefixes
    }

    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.map.insert(prefix.into(), namespace.into());
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.map.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Add every mapping from `other`, keeping existing bindings on conflict.
    pub fn merge(&mut self, other: &Prefixes) {
        for (k, v) in other.iter() {
            self.map.entry(k.to_string()).or_insert_with(|| v.to_string());
        }
    }

    /// Expand `prefix:local`.
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.get(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// The longest namespace match for `iri`, as `(prefix, local)`.
    pub fn compact<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.map
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| (prefix.as_str(), &iri[ns.len()..]))
    }
}

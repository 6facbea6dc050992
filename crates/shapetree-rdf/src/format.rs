use std::fmt;

use url::Url;

use crate::error::RdfResult;
use crate::graph::Graph;
use crate::jsonld::parse_jsonld;
use crate::prefixes::Prefixes;
use crate::turtle::parse_turtle;

/// Concrete RDF syntaxes understood by [`parse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    Turtle,
    JsonLd,
}

impl RdfFormat {
    /// Map a `Content-Type` value (parameters allowed) to a format.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "text/turtle" | "application/x-turtle" | "application/n-triples" | "text/n3" => {
                Some(Self::Turtle)
            }
            "application/ld+json" | "application/json" => Some(Self::JsonLd),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Turtle => "text/turtle",
            Self::JsonLd => "application/ld+json",
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

/// Parse `text` in `format`, or sniff the syntax when `format` is `None`.
pub fn parse(text: &str, format: Option<RdfFormat>, base: Option<&Url>) -> RdfResult<(Graph, Prefixes)> {
    let format = format.unwrap_or_else(|| sniff(text));
    match format {
        RdfFormat::Turtle => parse_turtle(text, base),
        RdfFormat::JsonLd => parse_jsonld(text, base),
    }
}

fn sniff(text: &str) -> RdfFormat {
    let text = text.trim_start();
    if text.starts_with('{') {
        return RdfFormat::JsonLd;
    }
    if let Some(rest) = text.strip_prefix('[') {
        if matches!(rest.trim_start().chars().next(), Some('{') | Some(']')) {
            return RdfFormat::JsonLd;
        }
    }
    RdfFormat::Turtle
}

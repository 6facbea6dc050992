//! `Link` header parsing (RFC 8288), enough for `rel="type"` and `rel="shapeTree"`.

use shapetree_types::vocab::ldp;

use crate::error::{ProtocolError, ProtocolResult};
use crate::wire::rel;

/// One link-value: a target and its relation types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub target: String,
    pub rels: Vec<String>,
}

impl Link {
    pub fn has_rel(&self, name: &str) -> bool {
        self.rels.iter().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// What a request says it is creating, from `Link: <...>; rel="type"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionModel {
    Container,
    Resource,
    NonRdfSource,
}

impl InteractionModel {
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            ldp::CONTAINER | ldp::BASIC_CONTAINER => Some(Self::Container),
            ldp::RESOURCE | ldp::RDF_SOURCE => Some(Self::Resource),
            ldp::NON_RDF_SOURCE => Some(Self::NonRdfSource),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container)
    }

    /// The default slug when a client gives none: the type's local name.
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Resource => "Resource",
            Self::NonRdfSource => "NonRDFSource",
        }
    }
}

/// Parse one `Link` header value, which may hold several comma-separated links.
pub fn parse_link_header(value: &str) -> ProtocolResult<Vec<Link>> {
    let malformed = || ProtocolError::MalformedLink(value.to_string());
    let mut links = Vec::new();
    let mut rest = value.trim();
    while !rest.is_empty() {
        let open = rest.strip_prefix('<').ok_or_else(malformed)?;
        let close = open.find('>').ok_or_else(malformed)?;
        let target = open[..close].trim().to_string();
        rest = open[close + 1..].trim_start();

        let mut rels = Vec::new();
        while let Some(param) = rest.strip_prefix(';') {
            let (text, tail) = split_param(param.trim_start());
            rest = tail.trim_start();
            let (key, val) = text.split_once('=').ok_or_else(malformed)?;
            if key.trim().eq_ignore_ascii_case("rel") {
                let val = val.trim().trim_matches('"');
                rels.extend(val.split_whitespace().map(str::to_string));
            }
        }
        links.push(Link { target, rels });
        rest = match rest.strip_prefix(',') {
            Some(tail) => tail.trim_start(),
            None if rest.is_empty() => rest,
            None => return Err(malformed()),
        };
    }
    Ok(links)
}

/// Split off one `key=value` parameter, honoring quoted values.
fn split_param(text: &str) -> (&str, &str) {
    let mut quoted = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' | ',' if !quoted => return (text[..i].trim_end(), &text[i..]),
            _ => {}
        }
    }
    (text.trim_end(), "")
}

/// The interaction model named by any `rel="type"` link.
pub fn interaction_model(links: &[Link]) -> Option<InteractionModel> {
    links
        .iter()
        .filter(|l| l.has_rel(rel::TYPE))
        .find_map(|l| InteractionModel::from_iri(&l.target))
}

/// The schema named by a `rel="shapeTree"` link, marking a plant request.
pub fn shape_tree(links: &[Link]) -> Option<&str> {
    links
        .iter()
        .find(|l| l.has_rel(rel::SHAPE_TREE))
        .map(|l| l.target.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_several_links() {
        let links = parse_link_header(
            r#"<http://www.w3.org/ns/ldp#Container>; rel="type", <http://s.example/t.ttl#root>; rel="shapeTree""#,
        )
        .unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(interaction_model(&links), Some(InteractionModel::Container));
        assert_eq!(shape_tree(&links), Some("http://s.example/t.ttl#root"));
    }

    #[test]
    fn quoted_params_and_multiple_rels() {
        let links =
            parse_link_header(r#"<x>; title="a;b, c"; rel="type other""#).unwrap();
        assert_eq!(links[0].rels, vec!["type".to_string(), "other".to_string()]);
    }

    #[test]
    fn unquoted_rel() {
        let links = parse_link_header("<http://www.w3.org/ns/ldp#Resource>; rel=type").unwrap();
        assert_eq!(interaction_model(&links), Some(InteractionModel::Resource));
        assert_eq!(shape_tree(&links), None);
    }

    #[test]
    fn malformed_links() {
        for bad in ["x; rel=type", "<x", "<x>; rel", "<x> junk"] {
            assert!(parse_link_header(bad).is_err(), "{bad}");
        }
        assert!(parse_link_header("").unwrap().is_empty());
    }
}

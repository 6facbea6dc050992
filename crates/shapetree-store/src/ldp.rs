//! Container statements shared by every backend.

use shapetree_rdf::{Graph, Term};
use shapetree_types::vocab::{dcterms, ldp, rdf};
use url::Url;

/// The statements a freshly created container starts with.
pub fn new_container_graph(id: &Url, title: Option<&str>) -> Graph {
    let subject = Term::from(id);
    let mut graph = Graph::new();
    graph.add(subject.clone(), rdf::TYPE, Term::iri(ldp::BASIC_CONTAINER));
    graph.add(subject.clone(), rdf::TYPE, Term::iri(ldp::CONTAINER));
    if let Some(title) = title {
        graph.add(subject, dcterms::TITLE, Term::literal(title));
    }
    graph
}

/// Drop `ldp:contains` statements about `id`; containment is derived, never stored.
pub fn strip_containment(id: &Url, graph: &Graph) -> Graph {
    let mut graph = graph.clone();
    graph.remove_matching(Some(&Term::from(id)), Some(ldp::CONTAINS), None);
    graph
}

/// Add `ldp:contains` for each child.
pub fn add_containment<'a>(graph: &mut Graph, id: &Url, children: impl IntoIterator<Item = &'a Url>) {
    let subject = Term::from(id);
    for child in children {
        graph.add(subject.clone(), ldp::CONTAINS, Term::from(child));
    }
}

/// Whether `candidate` (an absolute identifier string) is a direct child of
/// the container `parent`, metadata excluded.
pub(crate) fn is_direct_child(parent: &str, candidate: &str) -> bool {
    let Some(rest) = candidate.strip_prefix(parent) else {
        return false;
    };
    let name = rest.strip_suffix('/').unwrap_or(rest);
    !name.is_empty() && !name.contains('/') && !name.ends_with(crate::traits::METADATA_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_children() {
        let p = "http://h/a/";
        assert!(is_direct_child(p, "http://h/a/b/"));
        assert!(is_direct_child(p, "http://h/a/b"));
        assert!(!is_direct_child(p, "http://h/a/"));
        assert!(!is_direct_child(p, "http://h/a/b/c"));
        assert!(!is_direct_child(p, "http://h/a/.meta"));
        assert!(!is_direct_child(p, "http://h/a/b.meta"));
        assert!(!is_direct_child(p, "http://h/ab"));
    }

    #[test]
    fn containment_is_stripped() {
        let id = Url::parse("http://h/a/").unwrap();
        let mut g = new_container_graph(&id, Some("A"));
        add_containment(&mut g, &id, [&Url::parse("http://h/a/b/").unwrap()]);
        assert_eq!(g.len(), 4);
        assert_eq!(strip_containment(&id, &g).len(), 3);
    }
}

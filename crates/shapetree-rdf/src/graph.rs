use std::collections::BTreeSet;

use shapetree_types::vocab::rdf;

use crate::error::{RdfError, RdfResult};
use crate::term::{Term, Triple};

/// An unordered, deduplicated set of triples.
///
/// Backed by a `BTreeSet` so iteration (and therefore serialization) is
/// deterministic and grouped by subject.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Insert a triple. Returns `true` if it was not already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Insert `subject predicate object`.
    pub fn add(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.insert(Triple::new(subject, Term::iri(predicate), object))
    }

    /// Remove a triple. Returns `true` if it was present.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Union `other` into this graph.
    pub fn extend(&mut self, other: Graph) {
        self.triples.extend(other.triples);
    }

    /// Remove every triple matching the pattern; returns how many went.
    pub fn remove_matching(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> usize {
        let doomed: Vec<Triple> = self
            .matching(subject, predicate, object)
            .cloned()
            .collect();
        for t in &doomed {
            self.triples.remove(t);
        }
        doomed.len()
    }

    /// Triples matching a pattern; `None` is a wildcard.
    pub fn matching<'a, 'p>(
        &'a self,
        subject: Option<&'p Term>,
        predicate: Option<&'p str>,
        object: Option<&'p Term>,
    ) -> impl Iterator<Item = &'a Triple> + 'p
    where
        'a: 'p,
    {
        self.triples.iter().filter(move |t| {
            subject.map_or(true, |s| &t.subject == s)
                && predicate.map_or(true, |p| t.predicate.is_iri(p))
                && object.map_or(true, |o| &t.object == o)
        })
    }

    pub fn objects<'a, 'p>(
        &'a self,
        subject: &'p Term,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a Term> + 'p
    where
        'a: 'p,
    {
        self.matching(Some(subject), Some(predicate), None)
            .map(|t| &t.object)
    }

    pub fn subjects<'a, 'p>(
        &'a self,
        predicate: &'p str,
        object: &'p Term,
    ) -> impl Iterator<Item = &'a Term> + 'p
    where
        'a: 'p,
    {
        self.matching(None, Some(predicate), Some(object))
            .map(|t| &t.subject)
    }

    /// The single object of `subject predicate`, if any.
    ///
    /// Fails with [`RdfError::Cardinality`] when more than one exists.
    pub fn zero_or_one(&self, subject: &Term, predicate: &str) -> RdfResult<Option<&Term>> {
        let mut objects = self.objects(subject, predicate);
        let first = objects.next();
        let rest = objects.count();
        if rest > 0 {
            return Err(RdfError::Cardinality {
                subject: subject.to_string(),
                predicate: predicate.to_string(),
                found: rest + 1,
            });
        }
        Ok(first)
    }

    /// Exactly one object of `subject predicate`.
    pub fn one(&self, subject: &Term, predicate: &str) -> RdfResult<&Term> {
        self.zero_or_one(subject, predicate)?
            .ok_or_else(|| RdfError::Cardinality {
                subject: subject.to_string(),
                predicate: predicate.to_string(),
                found: 0,
            })
    }

    /// Members of the RDF collection starting at `head`.
    pub fn list<'a>(&'a self, head: &'a Term) -> RdfResult<Vec<&'a Term>> {
        let mut items = Vec::new();
        let mut cursor = head;
        while !cursor.is_iri(rdf::NIL) {
            items.push(self.one(cursor, rdf::FIRST)?);
            cursor = self.one(cursor, rdf::REST)?;
            if items.len() > self.len() {
                return Err(RdfError::Syntax("cyclic rdf:rest chain".into()));
            }
        }
        Ok(items)
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Term {
        Term::iri("http://ex/s")
    }

    #[test]
    fn insert_is_idempotent() {
        let mut g = Graph::new();
        assert!(g.add(s(), "http://ex/p", Term::literal("o")));
        assert!(!g.add(s(), "http://ex/p", Term::literal("o")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn add_then_remove_restores() {
        let mut g = Graph::new();
        g.add(s(), "http://ex/p", Term::literal("keep"));
        let before = g.clone();
        let t = Triple::new(s(), Term::iri("http://ex/q"), Term::iri("http://ex/o"));
        g.insert(t.clone());
        g.remove(&t);
        assert_eq!(g, before);
    }

    #[test]
    fn cardinality_lookups() {
        let mut g = Graph::new();
        assert!(g.zero_or_one(&s(), "http://ex/p").unwrap().is_none());
        assert!(g.one(&s(), "http://ex/p").is_err());
        g.add(s(), "http://ex/p", Term::literal("a"));
        assert_eq!(g.one(&s(), "http://ex/p").unwrap(), &Term::literal("a"));
        g.add(s(), "http://ex/p", Term::literal("b"));
        let err = g.zero_or_one(&s(), "http://ex/p").unwrap_err();
        assert!(matches!(err, RdfError::Cardinality { found: 2, .. }));
    }

    #[test]
    fn pattern_matching() {
        let mut g = Graph::new();
        g.add(s(), "http://ex/p", Term::iri("http://ex/o1"));
        g.add(s(), "http://ex/p", Term::iri("http://ex/o2"));
        g.add(Term::iri("http://ex/t"), "http://ex/p", Term::iri("http://ex/o1"));
        assert_eq!(g.objects(&s(), "http://ex/p").count(), 2);
        assert_eq!(g.subjects("http://ex/p", &Term::iri("http://ex/o1")).count(), 2);
        assert_eq!(g.remove_matching(Some(&s()), None, None), 2);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn collections() {
        let mut g = Graph::new();
        let head = Term::Blank("l0".into());
        let tail = Term::Blank("l1".into());
        g.add(head.clone(), rdf::FIRST, Term::literal("a"));
        g.add(head.clone(), rdf::REST, tail.clone());
        g.add(tail.clone(), rdf::FIRST, Term::literal("b"));
        g.add(tail, rdf::REST, Term::iri(rdf::NIL));
        let items = g.list(&head).unwrap();
        assert_eq!(items, vec![&Term::literal("a"), &Term::literal("b")]);
    }
}

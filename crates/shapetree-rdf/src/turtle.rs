//! Turtle reading and writing on top of `sophia_turtle`.
//!
//! N-Triples is read as a Turtle subset. Written Turtle is subject-grouped
//! and compacted with the caller's prefixes.

use regex_lite::Regex;
use sophia_api::parser::TripleParser;
use sophia_api::prefix::Prefix;
use sophia_api::serializer::{Stringifier, TripleSerializer};
use sophia_api::source::{StreamError, TripleSource};
use sophia_api::triple::Triple as _;
use sophia_iri::Iri;
use sophia_turtle::parser::turtle::TurtleParser;
use sophia_turtle::serializer::turtle::{TurtleConfig, TurtleSerializer};
use url::Url;

use crate::bridge::{simple, BlankScope};
use crate::error::{RdfError, RdfResult};
use crate::graph::Graph;
use crate::prefixes::Prefixes;
use crate::term::Triple;

const PREFIX_DECL: &str = r"(?mi)^\s*@?prefix\s+([^\s:]*):\s*<([^>]*)>";

/// Parse a Turtle document, resolving relative IRIs against `base`.
pub fn parse_turtle(text: &str, base: Option<&Url>) -> RdfResult<(Graph, Prefixes)> {
    let parser = TurtleParser {
        base: base.map(sophia_base).transpose()?,
    };

    let mut graph = Graph::new();
    let mut blanks = BlankScope::new();
    parser
        .parse_str(text)
        .try_for_each_triple(|t| -> RdfResult<()> {
            graph.insert(Triple::new(
                blanks.term(t.s())?,
                blanks.term(t.p())?,
                blanks.term(t.o())?,
            ));
            Ok(())
        })
        .map_err(|e| match e {
            StreamError::SourceError(e) => RdfError::Syntax(e.to_string()),
            StreamError::SinkError(e) => e,
        })?;

    Ok((graph, declared_prefixes(text, base)?))
}

fn sophia_base(base: &Url) -> RdfResult<Iri<String>> {
    Iri::new(base.to_string()).map_err(|e| RdfError::BadIri {
        iri: base.to_string(),
        reason: e.to_string(),
    })
}

/// The `@prefix` / `PREFIX` bindings a document declares.
fn declared_prefixes(text: &str, base: Option<&Url>) -> RdfResult<Prefixes> {
    let decl = Regex::new(PREFIX_DECL).map_err(|e| RdfError::Syntax(e.to_string()))?;
    let mut prefixes = Prefixes::new();
    for caps in decl.captures_iter(text) {
        let (Some(name), Some(ns)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let ns = match (&base, Url::parse(ns.as_str())) {
            (_, Ok(abs)) => abs.to_string(),
            (Some(base), Err(_)) => match base.join(ns.as_str()) {
                Ok(abs) => abs.to_string(),
                Err(_) => continue,
            },
            (None, Err(_)) => continue,
        };
        prefixes.insert(name.as_str(), ns);
    }
    Ok(prefixes)
}

/// Serialize `graph` as Turtle, declaring every prefix in `prefixes`.
pub fn serialize_turtle(graph: &Graph, prefixes: &Prefixes) -> RdfResult<String> {
    let prefix_map = prefixes
        .iter()
        .filter_map(|(name, ns)| {
            let prefix = Prefix::new(Box::<str>::from(name)).ok()?;
            let ns = Iri::new(Box::<str>::from(ns)).ok()?;
            Some((prefix, ns))
        })
        .collect();
    let config = TurtleConfig::new()
        .with_pretty(true)
        .with_own_prefix_map(prefix_map);

    let triples: Vec<[_; 3]> = graph
        .iter()
        .map(|t| [simple(&t.subject), simple(&t.predicate), simple(&t.object)])
        .collect();

    let mut serializer = TurtleSerializer::new_stringifier_with_config(config);
    serializer
        .serialize_graph(&triples)
        .map_err(|e| RdfError::Serialize(e.to_string()))?;
    Ok(serializer.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Literal, Term};
    use shapetree_types::vocab::{ldp, rdf, tree, xsd};

    fn base() -> Url {
        Url::parse("http://localhost/Apps/").unwrap()
    }

    #[test]
    fn parses_prefixed_triples() {
        let text = r#"
            @prefix ldp: <http://www.w3.org/ns/ldp#> .
            # containment
            <> a ldp:BasicContainer ;
               ldp:contains <a/>, <b/> .
        "#;
        let (g, p) = parse_turtle(text, Some(&base())).unwrap();
        assert_eq!(p.get("ldp"), Some(ldp::NS));
        let me = Term::iri("http://localhost/Apps/");
        assert_eq!(g.objects(&me, ldp::CONTAINS).count(), 2);
        assert!(g.contains(&Triple::new(
            me.clone(),
            Term::iri(rdf::TYPE),
            Term::iri(ldp::BASIC_CONTAINER)
        )));
    }

    #[test]
    fn sparql_style_directives() {
        let text = "PREFIX tree: <http://www.w3.org/ns/shapetree#>\nBASE <http://ex.org/s>\n<#root> tree:contents <#a> .";
        let (g, p) = parse_turtle(text, None).unwrap();
        assert_eq!(p.get("tree"), Some(tree::NS));
        let root = Term::iri("http://ex.org/s#root");
        assert_eq!(g.one(&root, tree::CONTENTS).unwrap(), &Term::iri("http://ex.org/s#a"));
    }

    #[test]
    fn relative_prefix_resolves_against_base() {
        let (_, p) = parse_turtle("@prefix : <#> .\n:a :b :c .", Some(&base())).unwrap();
        assert_eq!(p.get(""), Some("http://localhost/Apps/#"));
    }

    #[test]
    fn literals_of_every_form() {
        let text = r#"@prefix : <http://ex/> .
            :s :a "plain" ; :b 'single' ; :c """long "quoted"
line""" ; :d "hi"@en-GB ; :e "5"^^<http://www.w3.org/2001/XMLSchema#integer> ;
               :f 42 ; :g -3.5 ; :h 1e3 ; :i true ; :j "tab\there" ."#;
        let (g, _) = parse_turtle(text, None).unwrap();
        let s = Term::iri("http://ex/s");
        let get = |p: &str| g.one(&s, &format!("http://ex/{p}")).unwrap().clone();
        assert_eq!(get("a"), Term::literal("plain"));
        assert_eq!(get("b"), Term::literal("single"));
        assert_eq!(get("c"), Term::literal("long \"quoted\"\nline"));
        assert_eq!(get("d"), Term::Literal(Literal::lang("hi", "en-gb")));
        assert_eq!(get("e"), Term::Literal(Literal::typed("5", xsd::INTEGER)));
        assert_eq!(get("f"), Term::Literal(Literal::typed("42", xsd::INTEGER)));
        assert_eq!(get("g"), Term::Literal(Literal::typed("-3.5", xsd::DECIMAL)));
        assert_eq!(get("h"), Term::Literal(Literal::typed("1e3", xsd::DOUBLE)));
        assert_eq!(get("i"), Term::Literal(Literal::typed("true", xsd::BOOLEAN)));
        assert_eq!(get("j"), Term::literal("tab\there"));
    }

    #[test]
    fn blank_nodes_and_collections() {
        let text = r#"@prefix sh: <http://www.w3.org/ns/shacl#> .
            <http://ex/Shape> sh:property [ sh:path <http://ex/p> ; sh:minCount 1 ] ;
                sh:ignoredProperties ( <http://ex/q> <http://ex/r> ) .
            _:x <http://ex/p> _:x ."#;
        let (g, _) = parse_turtle(text, None).unwrap();
        let shape = Term::iri("http://ex/Shape");
        let prop = g.one(&shape, "http://www.w3.org/ns/shacl#property").unwrap();
        assert!(prop.is_blank());
        let head = g.one(&shape, "http://www.w3.org/ns/shacl#ignoredProperties").unwrap();
        assert_eq!(g.list(head).unwrap().len(), 2);
        let selfloop = g
            .iter()
            .find(|t| t.predicate.is_iri("http://ex/p") && t.subject.is_blank())
            .unwrap();
        assert_eq!(selfloop.subject, selfloop.object);
    }

    #[test]
    fn blank_labels_are_fresh_per_parse() {
        let (g1, _) = parse_turtle("_:a <http://ex/p> 1 .", None).unwrap();
        let (g2, _) = parse_turtle("_:a <http://ex/p> 1 .", None).unwrap();
        assert_ne!(g1, g2);
    }

    #[test]
    fn undeclared_prefix_is_a_syntax_error() {
        let err = parse_turtle("<http://ex/s>\n<http://ex/p>\nundeclared:o .", None).unwrap_err();
        assert!(matches!(err, RdfError::Syntax(_)), "{err}");
    }

    #[test]
    fn serialize_then_parse_preserves_graph() {
        let text = r#"@prefix tree: <http://www.w3.org/ns/shapetree#> .
            <http://ex/c/> tree:shapeTreeInstancePath "repos" ;
                tree:shapeTreeRoot <http://ex/s#root> ;
                <http://ex/odd> "line\nbreak"@en , 3 ."#;
        let (g, p) = parse_turtle(text, None).unwrap();
        let out = serialize_turtle(&g, &p).unwrap();
        assert!(out.contains("tree:shapeTreeRoot"), "{out}");
        let (g2, _) = parse_turtle(&out, None).unwrap();
        assert_eq!(g, g2);
    }

    #[test]
    fn serialized_blank_nodes_survive_reparse() {
        let mut g = Graph::new();
        let node = Term::fresh_blank();
        g.add(Term::iri("http://ex/c/"), "http://ex/p", node.clone());
        g.add(node, "http://ex/q", Term::literal("v"));
        let out = serialize_turtle(&g, &Prefixes::with_defaults()).unwrap();
        let (back, _) = parse_turtle(&out, None).unwrap();
        assert_eq!(back.len(), 2);
        let inner = back.one(&Term::iri("http://ex/c/"), "http://ex/p").unwrap();
        assert_eq!(back.one(inner, "http://ex/q").unwrap(), &Term::literal("v"));
    }

    #[test]
    fn empty_graph_serializes_to_parseable_text() {
        let out = serialize_turtle(&Graph::new(), &Prefixes::with_defaults()).unwrap();
        let (g, _) = parse_turtle(&out, None).unwrap();
        assert!(g.is_empty());
    }
}

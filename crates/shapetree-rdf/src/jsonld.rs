//! JSON-LD reading on top of `sophia_jsonld`.
//!
//! The parse base is injected as an `@base` context entry ahead of the
//! document's own context, so a document-level `@base` still wins. Remote
//! contexts are rejected before expansion; quads from named graphs are
//! folded into the one returned graph.

use serde_json::{json, Map, Value};
use sophia_api::parser::QuadParser;
use sophia_api::quad::Quad as _;
use sophia_api::source::{QuadSource, StreamError};
use sophia_jsonld::JsonLdParser;
use url::Url;

use crate::bridge::BlankScope;
use crate::error::{RdfError, RdfResult};
use crate::graph::Graph;
use crate::prefixes::Prefixes;
use crate::term::Triple;

/// Parse a JSON-LD document into a graph plus the prefixes its context declared.
pub fn parse_jsonld(text: &str, base: Option<&Url>) -> RdfResult<(Graph, Prefixes)> {
    let doc: Value = serde_json::from_str(text)?;
    let mut prefixes = Prefixes::new();
    visit_contexts(&doc, &mut prefixes)?;
    let doc = with_base(doc, base);

    let parser: JsonLdParser = JsonLdParser::new();
    let mut graph = Graph::new();
    let mut blanks = BlankScope::new();
    parser
        .parse_str(&doc.to_string())
        .try_for_each_quad(|q| -> RdfResult<()> {
            graph.insert(Triple::new(
                blanks.term(q.s())?,
                blanks.term(q.p())?,
                blanks.term(q.o())?,
            ));
            Ok(())
        })
        .map_err(|e| match e {
            StreamError::SourceError(e) => RdfError::Syntax(e.to_string()),
            StreamError::SinkError(e) => e,
        })?;
    Ok((graph, prefixes))
}

fn with_base(doc: Value, base: Option<&Url>) -> Value {
    let Some(base) = base else {
        return doc;
    };
    let base_ctx = json!({ "@base": base.as_str() });
    match doc {
        Value::Object(mut obj) => {
            let ctx = match obj.remove("@context") {
                None | Some(Value::Null) => base_ctx,
                Some(Value::Array(mut items)) => {
                    items.insert(0, base_ctx);
                    Value::Array(items)
                }
                Some(other) => Value::Array(vec![base_ctx, other]),
            };
            obj.insert("@context".into(), ctx);
            Value::Object(obj)
        }
        Value::Array(items) => json!({ "@context": base_ctx, "@graph": items }),
        other => other,
    }
}

/// Collect prefix definitions from every inline context, rejecting remote ones.
fn visit_contexts(value: &Value, prefixes: &mut Prefixes) -> RdfResult<()> {
    match value {
        Value::Array(items) => items.iter().try_for_each(|v| visit_contexts(v, prefixes)),
        Value::Object(obj) => {
            if let Some(ctx) = obj.get("@context") {
                read_context(ctx, prefixes)?;
            }
            obj.iter()
                .filter(|(k, _)| k.as_str() != "@context")
                .try_for_each(|(_, v)| visit_contexts(v, prefixes))
        }
        _ => Ok(()),
    }
}

fn read_context(ctx: &Value, prefixes: &mut Prefixes) -> RdfResult<()> {
    match ctx {
        Value::Null => Ok(()),
        Value::Array(items) => items.iter().try_for_each(|c| read_context(c, prefixes)),
        Value::Object(defs) => {
            read_definitions(defs, prefixes);
            Ok(())
        }
        Value::String(remote) => Err(RdfError::UnsupportedFormat(format!(
            "remote JSON-LD context {remote}"
        ))),
        other => Err(RdfError::Syntax(format!("invalid @context {other}"))),
    }
}

fn read_definitions(defs: &Map<String, Value>, prefixes: &mut Prefixes) {
    for (term, def) in defs {
        if term.starts_with('@') {
            continue;
        }
        if let Value::String(ns) = def {
            if ns.ends_with('/') || ns.ends_with('#') {
                prefixes.insert(term.as_str(), ns.as_str());
            }
        }
    }
}

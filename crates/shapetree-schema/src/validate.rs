//! Payload validation against shapes.
//!
//! The validator is a capability: a [`ValidatorFactory`] builds a
//! [`ShapeValidator`] over a fetched shape document. [`ShaclLite`] is the
//! default and understands the SHACL core used by ShapeTree schemas:
//! property shapes with cardinality, datatype, node kind, class and value
//! constraints, and closed shapes.

use std::collections::BTreeSet;
use std::fmt;

use shapetree_fetch::Fetch;
use shapetree_rdf::{Graph, Term};
use shapetree_types::vocab::{rdf, sh, xsd};
use url::Url;

use crate::error::{SchemaError, SchemaResult};
use crate::tree::{fetch_graph, RemoteShapeTree};

/// One constraint violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub focus: String,
    pub path: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} {}: {}", self.focus, path, self.message),
            None => write!(f, "{}: {}", self.focus, self.message),
        }
    }
}

/// Outcome of validating one focus node. Any error means non-conformance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn conforms(&self) -> bool {
        self.errors.is_empty()
    }

    /// All issues on one line, separated by `; `.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Checks a focus node of a data graph against a shape.
pub trait ShapeValidator: Send + Sync {
    fn validate(&self, data: &Graph, focus: &Term, shape: &Term) -> SchemaResult<ValidationReport>;
}

/// Builds validators from shape documents.
pub trait ValidatorFactory: Send + Sync {
    fn build(&self, shapes: Graph) -> SchemaResult<Box<dyn ShapeValidator>>;
}

/// Factory for [`ShaclLite`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ShaclLiteFactory;

impl ValidatorFactory for ShaclLiteFactory {
    fn build(&self, shapes: Graph) -> SchemaResult<Box<dyn ShapeValidator>> {
        Ok(Box::new(ShaclLite::new(shapes)))
    }
}

/// A validator for the SHACL core subset listed in the module docs.
#[derive(Clone, Debug)]
pub struct ShaclLite {
    shapes: Graph,
}

impl ShaclLite {
    pub fn new(shapes: Graph) -> Self {
        Self { shapes }
    }

    fn count(&self, node: &Term, predicate: &str) -> SchemaResult<Option<usize>> {
        match self.shapes.zero_or_one(node, predicate)? {
            None => Ok(None),
            Some(term) => term
                .value_str()
                .and_then(|v| v.parse().ok())
                .map(Some)
                .ok_or_else(|| shape_error(node, format!("{predicate} is not a count"))),
        }
    }

    fn check_property(
        &self,
        data: &Graph,
        focus: &Term,
        property: &Term,
        report: &mut ValidationReport,
    ) -> SchemaResult<String> {
        let path = self
            .shapes
            .one(property, sh::PATH)?
            .as_iri()
            .ok_or_else(|| shape_error(property, "sh:path must be an IRI"))?
            .to_string();
        let values: Vec<&Term> = data.objects(focus, &path).collect();
        let mut issue = |message: String| {
            report.errors.push(ValidationIssue {
                focus: focus.to_string(),
                path: Some(path.clone()),
                message,
            })
        };

        if let Some(min) = self.count(property, sh::MIN_COUNT)? {
            if values.len() < min {
                issue(format!("expected at least {min} values, found {}", values.len()));
            }
        }
        if let Some(max) = self.count(property, sh::MAX_COUNT)? {
            if values.len() > max {
                issue(format!("expected at most {max} values, found {}", values.len()));
            }
        }
        if let Some(datatype) = self.shapes.zero_or_one(property, sh::DATATYPE)? {
            let datatype = datatype.as_iri().unwrap_or_default();
            for value in &values {
                let ok = value.as_literal().is_some_and(|l| l.datatype == datatype);
                if !ok {
                    issue(format!("{value} is not a {datatype}"));
                }
            }
        }
        if let Some(kind) = self.shapes.zero_or_one(property, sh::NODE_KIND)? {
            let kind = kind.as_iri().unwrap_or_default();
            for value in &values {
                let ok = match kind {
                    sh::IRI => matches!(value, Term::Iri(_)),
                    sh::LITERAL => value.is_literal(),
                    sh::BLANK_NODE => value.is_blank(),
                    sh::BLANK_NODE_OR_IRI => !value.is_literal(),
                    _ => true,
                };
                if !ok {
                    issue(format!("{value} is not of node kind {kind}"));
                }
            }
        }
        if let Some(class) = self.shapes.zero_or_one(property, sh::CLASS)? {
            for value in &values {
                let typed = data.objects(value, rdf::TYPE).any(|t| t == class);
                if !typed {
                    issue(format!("{value} is not an instance of {class}"));
                }
            }
        }
        if let Some(expected) = self.shapes.zero_or_one(property, sh::HAS_VALUE)? {
            if !values.iter().any(|v| *v == expected) {
                issue(format!("missing required value {expected}"));
            }
        }
        Ok(path)
    }
}

impl ShapeValidator for ShaclLite {
    fn validate(&self, data: &Graph, focus: &Term, shape: &Term) -> SchemaResult<ValidationReport> {
        if self.shapes.matching(Some(shape), None, None).next().is_none() {
            return Err(SchemaError::missing_shape(shape, "shape is not described in its document"));
        }
        let mut report = ValidationReport::default();
        let mut allowed = BTreeSet::new();
        for property in self.shapes.objects(shape, sh::PROPERTY) {
            allowed.insert(self.check_property(data, focus, property, &mut report)?);
        }

        let closed = self
            .shapes
            .zero_or_one(shape, sh::CLOSED)?
            .and_then(|t| t.as_literal())
            .is_some_and(|l| l.lexical == "true" && l.datatype == xsd::BOOLEAN);
        if closed {
            if let Some(head) = self.shapes.zero_or_one(shape, sh::IGNORED_PROPERTIES)? {
                for ignored in self.shapes.list(head)? {
                    if let Some(iri) = ignored.as_iri() {
                        allowed.insert(iri.to_string());
                    }
                }
            }
            let used: BTreeSet<&str> = data
                .matching(Some(focus), None, None)
                .map(|t| t.predicate.as_iri().unwrap_or_default())
                .collect();
            for predicate in used {
                if !allowed.contains(predicate) {
                    report.errors.push(ValidationIssue {
                        focus: focus.to_string(),
                        path: Some(predicate.to_string()),
                        message: "property not allowed by closed shape".to_string(),
                    });
                }
            }
        }
        Ok(report)
    }
}

fn shape_error(node: &Term, reason: impl ToString) -> SchemaError {
    SchemaError::missing_shape(node, reason)
}

/// Validate `target` in `payload` against `shape`, fetching the shape's
/// document through `fetcher`.
pub async fn validate_payload(
    fetcher: &dyn Fetch,
    factory: &dyn ValidatorFactory,
    shape: &Url,
    payload: &Graph,
    target: &Url,
) -> SchemaResult<()> {
    let (shapes, _) = fetch_graph(fetcher, shape).await?;
    let validator = factory.build(shapes)?;
    let report = validator.validate(payload, &Term::from(target), &Term::from(shape))?;
    if report.conforms() {
        tracing::debug!(target = %target, shape = %shape, "payload conforms");
        return Ok(());
    }
    let summary = report.summary();
    tracing::info!(target = %target, shape = %shape, %summary, "payload rejected");
    Err(SchemaError::Validation {
        target: target.to_string(),
        shape: shape.to_string(),
        summary,
    })
}

impl RemoteShapeTree {
    /// Check `payload` against `shape` with `target` as the focus node.
    pub async fn validate(
        &self,
        fetcher: &dyn Fetch,
        factory: &dyn ValidatorFactory,
        shape: &Url,
        payload: &Graph,
        target: &Url,
    ) -> SchemaResult<()> {
        validate_payload(fetcher, factory, shape, payload, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapetree_fetch::MemoryFetcher;
    use shapetree_rdf::parse_turtle;

    const SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix ex: <http://ex.example/ns#> .

<#IssueShape>
    sh:closed true ;
    sh:ignoredProperties ( rdf:type ) ;
    sh:property [ sh:path ex:title ; sh:minCount 1 ; sh:maxCount 1 ; sh:datatype xsd:string ] ;
    sh:property [ sh:path ex:status ; sh:hasValue ex:Open ; sh:nodeKind sh:IRI ] ;
    sh:property [ sh:path ex:assignee ; sh:class ex:Person ] .
"#;

    fn shape() -> Url {
        Url::parse("http://schema.example/shapes.ttl#IssueShape").unwrap()
    }

    fn target() -> Url {
        Url::parse("http://h/Apps/proj1/issues/1.ttl").unwrap()
    }

    fn fetcher() -> MemoryFetcher {
        MemoryFetcher::new().with(&shape(), "text/turtle", SHAPES).unwrap()
    }

    fn payload(text: &str) -> Graph {
        parse_turtle(
            &format!("@prefix ex: <http://ex.example/ns#> .\n{text}"),
            Some(&target()),
        )
        .unwrap()
        .0
    }

    async fn check(text: &str) -> SchemaResult<()> {
        validate_payload(&fetcher(), &ShaclLiteFactory, &shape(), &payload(text), &target()).await
    }

    #[tokio::test]
    async fn conforming_payload_passes() {
        check(
            r#"<> a ex:Issue ; ex:title "Broken link" ; ex:status ex:Open ; ex:assignee <#me> .
               <#me> a ex:Person ."#,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn cardinality_and_value_failures() {
        let err = check(r#"<> ex:status ex:Closed ."#).await.unwrap_err();
        let SchemaError::Validation { summary, .. } = &err else {
            panic!("unexpected {err:?}");
        };
        assert!(summary.contains("at least 1"), "{summary}");
        assert!(summary.contains("missing required value"), "{summary}");
        assert_eq!(err.status(), 422);
    }

    #[tokio::test]
    async fn datatype_class_and_closed_failures() {
        let err = check(
            r#"<> ex:title 42 ; ex:status ex:Open ; ex:assignee <#bot> ; ex:extra "x" ."#,
        )
        .await
        .unwrap_err();
        let summary = err.to_string();
        assert!(summary.contains("is not a http://www.w3.org/2001/XMLSchema#string"), "{summary}");
        assert!(summary.contains("is not an instance of"), "{summary}");
        assert!(summary.contains("closed shape"), "{summary}");
    }

    #[tokio::test]
    async fn unknown_shape_document_is_missing() {
        let err = validate_payload(
            &MemoryFetcher::new(),
            &ShaclLiteFactory,
            &shape(),
            &Graph::new(),
            &target(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingShape { .. }));
        assert_eq!(err.status(), 424);
    }

    #[tokio::test]
    async fn undescribed_shape_is_missing() {
        let other = Url::parse("http://schema.example/shapes.ttl#Nope").unwrap();
        let err = validate_payload(&fetcher(), &ShaclLiteFactory, &other, &Graph::new(), &target())
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingShape { .. }));
    }
}

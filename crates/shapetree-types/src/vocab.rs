//! RDF vocabularies used by the ShapeTree protocol.
//!
//! Each namespace module exposes `NS` plus full-IRI constants for the terms
//! the workspace reads or writes.

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod rdfs {
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

pub mod dcterms {
    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const FORMAT: &str = "http://purl.org/dc/terms/format";
}

pub mod ldp {
    pub const NS: &str = "http://www.w3.org/ns/ldp#";
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";
    pub const RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#RDFSource";
    pub const NON_RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#NonRDFSource";
}

/// ShapeTree schema and binding terms.
pub mod tree {
    pub const NS: &str = "http://www.w3.org/ns/shapetree#";
    pub const CONTENTS: &str = "http://www.w3.org/ns/shapetree#contents";
    pub const EXPECTS_TYPE: &str = "http://www.w3.org/ns/shapetree#expectsType";
    pub const MATCHES_URI_TEMPLATE: &str = "http://www.w3.org/ns/shapetree#matchesUriTemplate";
    pub const VALIDATED_BY: &str = "http://www.w3.org/ns/shapetree#validatedBy";
    pub const SHAPE_TREE_ROOT: &str = "http://www.w3.org/ns/shapetree#shapeTreeRoot";
    pub const SHAPE_TREE_INSTANCE_PATH: &str = "http://www.w3.org/ns/shapetree#shapeTreeInstancePath";
    pub const SHAPE_TREE_INSTANCE_ROOT: &str = "http://www.w3.org/ns/shapetree#shapeTreeInstanceRoot";
}

/// Terms written by the default ecosystem.
pub mod eco {
    pub const NS: &str = "http://www.w3.org/ns/shapetree/ecosystem#";
    pub const SHAPE_TREE_INSTANCE: &str = "http://www.w3.org/ns/shapetree/ecosystem#ShapeTreeInstance";
    pub const HAS_SHAPE_TREE_INSTANCE: &str =
        "http://www.w3.org/ns/shapetree/ecosystem#hasShapeTreeInstance";
    pub const SHAPE_TREE_ROOT: &str = "http://www.w3.org/ns/shapetree/ecosystem#shapeTreeRoot";
    pub const SHAPE_TREE_INSTANCE_ROOT: &str =
        "http://www.w3.org/ns/shapetree/ecosystem#shapeTreeInstanceRoot";
    pub const NAME: &str = "http://www.w3.org/ns/shapetree/ecosystem#name";
}

pub mod sh {
    pub const NS: &str = "http://www.w3.org/ns/shacl#";
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
    pub const PATH: &str = "http://www.w3.org/ns/shacl#path";
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";
    pub const NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";
    pub const CLASS: &str = "http://www.w3.org/ns/shacl#class";
    pub const HAS_VALUE: &str = "http://www.w3.org/ns/shacl#hasValue";
    pub const CLOSED: &str = "http://www.w3.org/ns/shacl#closed";
    pub const IGNORED_PROPERTIES: &str = "http://www.w3.org/ns/shacl#ignoredProperties";
    pub const IRI: &str = "http://www.w3.org/ns/shacl#IRI";
    pub const LITERAL: &str = "http://www.w3.org/ns/shacl#Literal";
    pub const BLANK_NODE: &str = "http://www.w3.org/ns/shacl#BlankNode";
    pub const BLANK_NODE_OR_IRI: &str = "http://www.w3.org/ns/shacl#BlankNodeOrIRI";
}

/// Prefixes conventionally declared when serializing ShapeTree graphs.
pub const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("rdf", rdf::NS),
    ("rdfs", rdfs::NS),
    ("xsd", xsd::NS),
    ("dcterms", dcterms::NS),
    ("ldp", ldp::NS),
    ("tree", tree::NS),
    ("eco", eco::NS),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_live_in_their_namespace() {
        for term in [tree::CONTENTS, tree::SHAPE_TREE_ROOT, tree::VALIDATED_BY] {
            assert!(term.starts_with(tree::NS));
        }
        for term in [ldp::CONTAINS, ldp::CONTAINER, ldp::NON_RDF_SOURCE] {
            assert!(term.starts_with(ldp::NS));
        }
        assert!(eco::NAME.starts_with(eco::NS));
        assert!(sh::MIN_COUNT.starts_with(sh::NS));
    }

    #[test]
    fn default_prefixes_are_unique() {
        let mut names: Vec<_> = DEFAULT_PREFIXES.iter().map(|(p, _)| *p).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_PREFIXES.len());
    }
}

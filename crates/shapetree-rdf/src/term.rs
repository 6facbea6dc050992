use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use shapetree_types::vocab::{rdf, xsd};
use url::Url;

static NEXT_BLANK: AtomicU64 = AtomicU64::new(0);

/// A literal value: lexical form, datatype IRI, optional language tag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub lexical: String,
    pub datatype: String,
    pub language: Option<String>,
}

impl Literal {
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: xsd::STRING.to_string(),
            language: None,
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: rdf::LANG_STRING.to_string(),
            language: Some(language.into().to_ascii_lowercase()),
        }
    }
}

/// An RDF term.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal(Literal::plain(lexical))
    }

    /// A blank node with a process-unique label.
    pub fn fresh_blank() -> Self {
        let n = NEXT_BLANK.fetch_add(1, Ordering::Relaxed);
        Self::Blank(format!("b{n}"))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Lexical form of a literal, or the IRI text of an IRI.
    pub fn value_str(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::Literal(lit) => Some(&lit.lexical),
            Self::Blank(_) => None,
        }
    }

    pub fn is_iri(&self, iri: &str) -> bool {
        matches!(self, Self::Iri(i) if i == iri)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl From<&Url> for Term {
    fn from(url: &Url) -> Self {
        Self::Iri(url.to_string())
    }
}

impl From<Url> for Term {
    fn from(url: Url) -> Self {
        Self::Iri(url.into())
    }
}

impl fmt::Display for Term {
    /// N-Triples form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Blank(label) => write!(f, "_:{label}"),
            Self::Literal(lit) => {
                write!(f, "\"{}\"", escape_string(&lit.lexical))?;
                if let Some(lang) = &lit.language {
                    write!(f, "@{lang}")
                } else if lit.datatype != xsd::STRING {
                    write!(f, "^^<{}>", lit.datatype)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Escape a string for a double-quoted Turtle/N-Triples literal.
pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// A single statement.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

//! Conversions between sophia terms and this crate's [`Term`].

use std::collections::HashMap;

use sophia_api::term::{BnodeId, LanguageTag, SimpleTerm, Term as _, TermKind};
use sophia_iri::IriRef;

use crate::error::{RdfError, RdfResult};
use crate::term::{Literal, Term};

/// Blank node labels seen during one parse, mapped to fresh local labels.
#[derive(Debug, Default)]
pub(crate) struct BlankScope {
    labels: HashMap<String, Term>,
}

impl BlankScope {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn get(&mut self, label: &str) -> Term {
        self.labels
            .entry(label.to_string())
            .or_insert_with(Term::fresh_blank)
            .clone()
    }

    /// Convert a parsed sophia term.
    pub(crate) fn term<T: sophia_api::term::Term>(&mut self, term: T) -> RdfResult<Term> {
        match term.kind() {
            TermKind::Iri => term
                .iri()
                .map(|iri| Term::Iri(iri.as_str().to_string()))
                .ok_or_else(|| RdfError::Syntax("IRI term without an IRI".into())),
            TermKind::BlankNode => term
                .bnode_id()
                .map(|id| self.get(id.as_str()))
                .ok_or_else(|| RdfError::Syntax("blank node without a label".into())),
            TermKind::Literal => {
                let lexical = term
                    .lexical_form()
                    .ok_or_else(|| RdfError::Syntax("literal without a lexical form".into()))?;
                let lexical: &str = &lexical;
                if let Some(tag) = term.language_tag() {
                    return Ok(Term::Literal(Literal::lang(lexical, tag.as_str())));
                }
                let datatype = term
                    .datatype()
                    .ok_or_else(|| RdfError::Syntax("literal without a datatype".into()))?;
                Ok(Term::Literal(Literal::typed(lexical, datatype.as_str())))
            }
            other => Err(RdfError::UnsupportedFormat(format!("{other:?} terms"))),
        }
    }
}

/// Borrow one of our terms as a sophia term for serialization.
pub(crate) fn simple(term: &Term) -> SimpleTerm<'_> {
    match term {
        Term::Iri(iri) => SimpleTerm::Iri(IriRef::new_unchecked(iri.as_str().into())),
        Term::Blank(label) => SimpleTerm::BlankNode(BnodeId::new_unchecked(label.as_str().into())),
        Term::Literal(lit) => match &lit.language {
            Some(lang) => SimpleTerm::LiteralLanguage(
                lit.lexical.as_str().into(),
                LanguageTag::new_unchecked(lang.as_str().into()),
            ),
            None => SimpleTerm::LiteralDatatype(
                lit.lexical.as_str().into(),
                IriRef::new_unchecked(lit.datatype.as_str().into()),
            ),
        },
    }
}

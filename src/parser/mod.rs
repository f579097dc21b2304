//! Reading KIF source text into the rule model.
//!
//! The reader is split the same way as the rest of the pipeline: `sexp`
//! produces raw expression trees, and this module classifies the elements
//! (`?x` is a variable, any other symbol a constant, a list a function) and
//! enforces the built-in relation shapes while building [`Rule`] values.

pub mod sexp;

pub use sexp::Expr;

use crate::error::TranslationError;
use crate::gdl::{Rule, Sentence, Term};

/// Parse source text into raw top-level expression trees.
pub fn parse_gdl(source: &str) -> Result<Vec<Expr>, TranslationError> {
    sexp::parse_exprs(source).map_err(|detail| TranslationError::Parse { detail })
}

/// Classify a raw element as a term.
pub fn term_from_expr(expr: &Expr) -> Result<Term, TranslationError> {
    match expr {
        Expr::Atom(sym) => Ok(Term::from_symbol(sym)),
        Expr::List(items) => {
            let name = items
                .first()
                .and_then(Expr::as_atom)
                .ok_or_else(|| TranslationError::Parse {
                    detail: format!("function term must start with a symbol: {}", expr),
                })?;
            let args = items[1..]
                .iter()
                .map(term_from_expr)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::Function(name.to_string(), args))
        }
    }
}

/// Build a sentence from a raw element, handling `not` wrappers.
pub fn sentence_from_expr(expr: &Expr) -> Result<Sentence, TranslationError> {
    match expr {
        Expr::Atom(sym) => Sentence::new(sym, vec![], false),
        Expr::List(items) => {
            let name = items
                .first()
                .and_then(Expr::as_atom)
                .ok_or_else(|| TranslationError::Parse {
                    detail: format!("sentence must start with a relation name: {}", expr),
                })?;
            if name == "not" {
                if items.len() != 2 {
                    return Err(TranslationError::Parse {
                        detail: format!("'not' takes exactly one sentence: {}", expr),
                    });
                }
                return Ok(sentence_from_expr(&items[1])?.negate());
            }
            let terms = items[1..]
                .iter()
                .map(term_from_expr)
                .collect::<Result<Vec<_>, _>>()?;
            Sentence::new(name, terms, false)
        }
    }
}

/// Build a rule from a raw element. `(<= head body...)` is an implication;
/// anything else is a bare fact.
pub fn rule_from_expr(expr: &Expr) -> Result<Rule, TranslationError> {
    if let Expr::List(items) = expr {
        if items.first().and_then(Expr::as_atom) == Some("<=") {
            if items.len() < 2 {
                return Err(TranslationError::Parse {
                    detail: format!("'<=' needs a head: {}", expr),
                });
            }
            let head = sentence_from_expr(&items[1])?;
            let body = items[2..]
                .iter()
                .map(sentence_from_expr)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Rule::new(head, body));
        }
    }
    Ok(Rule::fact(sentence_from_expr(expr)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_rule(source: &str) -> Result<Rule, TranslationError> {
        let exprs = parse_gdl(source).unwrap();
        rule_from_expr(&exprs[0])
    }

    #[test]
    fn bare_sentence_is_a_fact() {
        let rule = parse_rule("(role xplayer)").unwrap();
        assert_eq!(rule.head.relation, "role");
        assert!(rule.body.is_empty());
    }

    #[test]
    fn implication_splits_head_and_body() {
        let rule =
            parse_rule("(<= (next (cell ?m ?n x)) (does xplayer (mark ?m ?n)))").unwrap();
        assert_eq!(rule.head.relation, "next");
        assert_eq!(rule.body.len(), 1);
        assert_eq!(rule.body[0].relation, "does");
    }

    #[test]
    fn not_sets_the_negation_flag() {
        let rule = parse_rule(
            "(<= (next (cell ?m ?n ?w)) (true (cell ?m ?n ?w)) (not (does ?p (mark ?m ?n))))",
        )
        .unwrap();
        assert!(!rule.body[0].negated);
        assert!(rule.body[1].negated);
        assert_eq!(rule.body[1].relation, "does");
    }

    #[test]
    fn builtin_misuse_is_fatal_at_construction() {
        let err = parse_rule("(goal xplayer)").unwrap_err();
        assert!(matches!(err, TranslationError::ArityMismatch { .. }));
    }

    #[test]
    fn variables_lose_their_question_mark() {
        let rule = parse_rule("(<= (row ?m ?x) (true (cell ?m 1 ?x)))").unwrap();
        assert_eq!(rule.head.terms[0], Term::Variable("m".to_string()));
    }
}

//! Sentences: a relation applied to terms, with a negation flag.

use super::term::Term;
use crate::error::TranslationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed vocabulary of built-in relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Role,
    Init,
    True,
    Does,
    Next,
    Legal,
    Goal,
    Terminal,
    Distinct,
}

impl Builtin {
    /// Look up a relation name in the built-in vocabulary.
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "role" => Some(Builtin::Role),
            "init" => Some(Builtin::Init),
            "true" => Some(Builtin::True),
            "does" => Some(Builtin::Does),
            "next" => Some(Builtin::Next),
            "legal" => Some(Builtin::Legal),
            "goal" => Some(Builtin::Goal),
            "terminal" => Some(Builtin::Terminal),
            "distinct" => Some(Builtin::Distinct),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Role => "role",
            Builtin::Init => "init",
            Builtin::True => "true",
            Builtin::Does => "does",
            Builtin::Next => "next",
            Builtin::Legal => "legal",
            Builtin::Goal => "goal",
            Builtin::Terminal => "terminal",
            Builtin::Distinct => "distinct",
        }
    }

    fn arity(self) -> usize {
        match self {
            Builtin::True | Builtin::Next | Builtin::Init | Builtin::Role => 1,
            Builtin::Does | Builtin::Legal | Builtin::Goal | Builtin::Distinct => 2,
            Builtin::Terminal => 0,
        }
    }

    /// Validate the argument shape for this built-in.
    fn check_shape(self, terms: &[Term]) -> Result<(), TranslationError> {
        let fail = |detail: &str| {
            Err(TranslationError::ArityMismatch {
                relation: self.name().to_string(),
                detail: detail.to_string(),
            })
        };
        if terms.len() != self.arity() {
            return fail(&format!(
                "expected {} argument(s), found {}",
                self.arity(),
                terms.len()
            ));
        }
        match self {
            Builtin::True | Builtin::Next | Builtin::Init => match terms[0] {
                Term::Function(_, _) => Ok(()),
                _ => fail("argument must be a function term"),
            },
            Builtin::Does | Builtin::Legal => match (&terms[0], &terms[1]) {
                (Term::Function(_, _), _) => fail("first argument (role) must not be a function term"),
                (_, Term::Variable(_)) => {
                    fail("second argument (move) must be a constant or function term")
                }
                _ => Ok(()),
            },
            Builtin::Role => match terms[0] {
                Term::Function(_, _) => fail("argument must not be a function term"),
                _ => Ok(()),
            },
            Builtin::Goal => match (&terms[0], &terms[1]) {
                (Term::Function(_, _), _) => fail("first argument (role) must not be a function term"),
                (_, Term::Constant(_)) => Ok(()),
                _ => fail("second argument (score) must be a constant"),
            },
            Builtin::Terminal | Builtin::Distinct => Ok(()),
        }
    }
}

/// A relation name applied to ordered terms, possibly negated.
///
/// Construction is the only path that can produce a built-in relation name,
/// and it validates the built-in's arity and argument shape, so a `Sentence`
/// whose name matches the fixed vocabulary is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub relation: String,
    pub terms: Vec<Term>,
    pub negated: bool,
}

impl Sentence {
    /// Build a sentence, enforcing the built-in arity/shape table.
    pub fn new(relation: &str, terms: Vec<Term>, negated: bool) -> Result<Sentence, TranslationError> {
        if let Some(builtin) = Builtin::from_name(relation) {
            builtin.check_shape(&terms)?;
        }
        Ok(Sentence {
            relation: relation.to_string(),
            terms,
            negated,
        })
    }

    /// The built-in this sentence names, if any.
    pub fn builtin(&self) -> Option<Builtin> {
        Builtin::from_name(&self.relation)
    }

    /// Copy with the negation flag flipped.
    pub fn negate(&self) -> Sentence {
        Sentence {
            relation: self.relation.clone(),
            terms: self.terms.clone(),
            negated: !self.negated,
        }
    }

    /// Rewrite a `next`- or `init`-headed sentence to its `true` form.
    /// Returns `None` if this sentence is not `next` or `init`.
    pub fn true_analogue(&self) -> Option<Sentence> {
        match self.builtin() {
            Some(Builtin::Next) | Some(Builtin::Init) => Some(Sentence {
                relation: Builtin::True.name().to_string(),
                terms: self.terms.clone(),
                negated: self.negated,
            }),
            _ => None,
        }
    }

    /// Rewrite a `true`-headed sentence to its `next` form.
    /// Returns `None` if this sentence is not `true`.
    pub fn next_analogue(&self) -> Option<Sentence> {
        match self.builtin() {
            Some(Builtin::True) => Some(Sentence {
                relation: Builtin::Next.name().to_string(),
                terms: self.terms.clone(),
                negated: self.negated,
            }),
            _ => None,
        }
    }

    /// Collect variable names in order of first occurrence.
    pub fn collect_variables(&self, vars: &mut Vec<String>) {
        for term in &self.terms {
            term.collect_variables(vars);
        }
    }

    /// Copy with every variable renamed through `map`.
    pub fn rename_variables(&self, map: &IndexMap<String, String>) -> Sentence {
        Sentence {
            relation: self.relation.clone(),
            terms: self.terms.iter().map(|t| t.rename_variables(map)).collect(),
            negated: self.negated,
        }
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "(not ")?;
        }
        if self.terms.is_empty() {
            write!(f, "{}", self.relation)?;
        } else {
            write!(f, "({}", self.relation)?;
            for term in &self.terms {
                write!(f, " {}", term)?;
            }
            write!(f, ")")?;
        }
        if self.negated {
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(n: &str, args: Vec<Term>) -> Term {
        Term::Function(n.to_string(), args)
    }

    fn con(n: &str) -> Term {
        Term::Constant(n.to_string())
    }

    #[test]
    fn builtin_arity_is_enforced() {
        let err = Sentence::new("role", vec![], false).unwrap_err();
        match err {
            TranslationError::ArityMismatch { relation, .. } => assert_eq!(relation, "role"),
            other => panic!("expected ArityMismatch, got {:?}", other),
        }
    }

    #[test]
    fn builtin_shape_is_enforced() {
        // `true` needs a function argument, not a bare constant.
        assert!(Sentence::new("true", vec![con("p")], false).is_err());
        assert!(Sentence::new("true", vec![func("p", vec![])], false).is_ok());
        // `does` allows a variable role and a constant move, but never a
        // function role or a variable move.
        assert!(Sentence::new("does", vec![con("x"), con("noop")], false).is_ok());
        assert!(Sentence::new(
            "does",
            vec![Term::Variable("p".to_string()), func("mark", vec![con("1")])],
            false
        )
        .is_ok());
        assert!(Sentence::new(
            "does",
            vec![con("x"), Term::Variable("m".to_string())],
            false
        )
        .is_err());
        assert!(
            Sentence::new("does", vec![func("f", vec![]), con("noop")], false).is_err()
        );
        // `role` quantifies over roles in rule bodies, so a variable is as
        // legitimate as a constant; only a function term is malformed.
        assert!(Sentence::new("role", vec![con("xplayer")], false).is_ok());
        assert!(
            Sentence::new("role", vec![Term::Variable("p".to_string())], false).is_ok()
        );
        assert!(Sentence::new("role", vec![func("f", vec![])], false).is_err());
    }

    #[test]
    fn user_relations_are_unconstrained() {
        assert!(Sentence::new("line", vec![con("x"), con("y"), con("z")], false).is_ok());
        assert!(Sentence::new("open", vec![], false).is_ok());
    }

    #[test]
    fn analogues_rewrite_only_the_relation() {
        let next = Sentence::new("next", vec![func("cell", vec![con("1")])], false).unwrap();
        let t = next.true_analogue().unwrap();
        assert_eq!(t.relation, "true");
        assert_eq!(t.terms, next.terms);
        assert_eq!(t.next_analogue().unwrap().relation, "next");

        let user = Sentence::new("line", vec![con("x")], false).unwrap();
        assert!(user.true_analogue().is_none());
        assert!(user.next_analogue().is_none());
    }

    #[test]
    fn negate_returns_flipped_copy() {
        let s = Sentence::new("line", vec![con("x")], false).unwrap();
        let n = s.negate();
        assert!(n.negated);
        assert!(!s.negated);
        assert_eq!(n.negate(), s);
    }
}

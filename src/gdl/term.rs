//! Terms of the game description language.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A GDL term: constant, variable, or function application.
///
/// Variable names are stored without the leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Constant(String),
    Variable(String),
    Function(String, Vec<Term>),
}

impl Term {
    /// Classify a raw string element: `?x` is a variable, anything else a
    /// constant.
    pub fn from_symbol(sym: &str) -> Term {
        match sym.strip_prefix('?') {
            Some(name) => Term::Variable(name.to_string()),
            None => Term::Constant(sym.to_string()),
        }
    }

    /// Name of a function term, if this is one.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Term::Function(name, _) => Some(name),
            _ => None,
        }
    }

    /// Approximate subsumption between two terms.
    ///
    /// A variable covers any variable or constant; a constant covers only an
    /// identical constant; a function covers a same-named function whose
    /// arguments cover pairwise. This is a deliberately non-rigorous
    /// heuristic used only to decide whether one `next`-relation usage
    /// subsumes another for frame tracking. It is not a soundness guarantee.
    pub fn covers(&self, other: &Term) -> bool {
        match (self, other) {
            (Term::Variable(_), Term::Variable(_)) | (Term::Variable(_), Term::Constant(_)) => true,
            (Term::Constant(a), Term::Constant(b)) => a == b,
            (Term::Function(a, args_a), Term::Function(b, args_b)) => {
                a == b
                    && args_a.len() == args_b.len()
                    && args_a.iter().zip(args_b).all(|(x, y)| x.covers(y))
            }
            _ => false,
        }
    }

    /// Collect variable names in order of first occurrence.
    pub fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Term::Variable(v) => {
                if !vars.contains(v) {
                    vars.push(v.clone());
                }
            }
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }

    /// Return a copy with every variable renamed through `map`. Variables
    /// absent from the map are kept.
    pub fn rename_variables(&self, map: &IndexMap<String, String>) -> Term {
        match self {
            Term::Variable(v) => match map.get(v) {
                Some(new) => Term::Variable(new.clone()),
                None => self.clone(),
            },
            Term::Constant(_) => self.clone(),
            Term::Function(name, args) => Term::Function(
                name.clone(),
                args.iter().map(|a| a.rename_variables(map)).collect(),
            ),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{}", c),
            Term::Variable(v) => write!(f, "?{}", v),
            Term::Function(name, args) => {
                write!(f, "({}", name)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(n: &str) -> Term {
        Term::Variable(n.to_string())
    }

    fn con(n: &str) -> Term {
        Term::Constant(n.to_string())
    }

    fn func(n: &str, args: Vec<Term>) -> Term {
        Term::Function(n.to_string(), args)
    }

    #[test]
    fn variable_covers_variable_and_constant() {
        assert!(var("x").covers(&var("y")));
        assert!(var("x").covers(&con("a")));
        assert!(!var("x").covers(&func("f", vec![con("a")])));
    }

    #[test]
    fn constant_covers_only_identical_constant() {
        assert!(con("a").covers(&con("a")));
        assert!(!con("a").covers(&con("b")));
        assert!(!con("a").covers(&var("x")));
    }

    #[test]
    fn function_covers_pointwise() {
        let general = func("cell", vec![var("m"), var("n"), var("w")]);
        let usage = func("cell", vec![var("x"), var("y"), con("b")]);
        assert!(general.covers(&usage));
        assert!(!usage.covers(&general));

        let other = func("step", vec![var("m"), var("n"), var("w")]);
        assert!(!general.covers(&other));
    }

    #[test]
    fn rename_keeps_unmapped_variables() {
        let mut map = IndexMap::new();
        map.insert("m".to_string(), "fv1".to_string());
        let t = func("cell", vec![var("m"), var("n")]);
        assert_eq!(
            t.rename_variables(&map),
            func("cell", vec![var("fv1"), var("n")])
        );
    }

    #[test]
    fn display_is_kif() {
        let t = func("cell", vec![con("1"), var("x")]);
        assert_eq!(t.to_string(), "(cell 1 ?x)");
    }
}

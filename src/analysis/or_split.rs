//! Disjunction elimination over raw expression trees.
//!
//! One pass finds the first `or` node (pre-order) and produces one copy of
//! the whole axiom per disjunct, with that node replaced. A single pass
//! eliminates exactly one disjunction; axioms with nested disjunctions need
//! the pass re-applied, which [`expand`] does up to the configured bound.

use crate::error::TranslationError;
use crate::parser::Expr;

fn is_or_node(expr: &Expr) -> bool {
    matches!(expr, Expr::List(items) if items.first().and_then(Expr::as_atom) == Some("or"))
}

fn contains_or(expr: &Expr) -> bool {
    if is_or_node(expr) {
        return true;
    }
    match expr {
        Expr::Atom(_) => false,
        Expr::List(items) => items.iter().any(contains_or),
    }
}

/// Disjuncts of the first `or` node in pre-order, if any.
fn first_or_disjuncts(expr: &Expr) -> Result<Option<Vec<Expr>>, TranslationError> {
    if let Expr::List(items) = expr {
        if items.first().and_then(Expr::as_atom) == Some("or") {
            if items.len() < 2 {
                return Err(TranslationError::MalformedDisjunction {
                    detail: format!("'or' with no disjuncts: {}", expr),
                });
            }
            return Ok(Some(items[1..].to_vec()));
        }
        for item in items {
            if let Some(found) = first_or_disjuncts(item)? {
                return Ok(Some(found));
            }
        }
    }
    Ok(None)
}

/// Copy of `expr` with the first `or` node (same pre-order walk as
/// [`first_or_disjuncts`]) replaced by `with`.
fn replace_first_or(expr: &Expr, with: &Expr, done: &mut bool) -> Expr {
    if *done {
        return expr.clone();
    }
    if is_or_node(expr) {
        *done = true;
        return with.clone();
    }
    match expr {
        Expr::Atom(_) => expr.clone(),
        Expr::List(items) => Expr::List(
            items
                .iter()
                .map(|item| replace_first_or(item, with, done))
                .collect(),
        ),
    }
}

/// Eliminate the first disjunction of one axiom. Returns `None` when the
/// axiom has no disjunction.
pub fn split_first(expr: &Expr) -> Result<Option<Vec<Expr>>, TranslationError> {
    let disjuncts = match first_or_disjuncts(expr)? {
        Some(d) => d,
        None => return Ok(None),
    };
    let mut rules = Vec::with_capacity(disjuncts.len());
    for disjunct in &disjuncts {
        let mut done = false;
        rules.push(replace_first_or(expr, disjunct, &mut done));
    }
    Ok(Some(rules))
}

/// Re-apply [`split_first`] until no disjunction remains.
pub fn expand(expr: &Expr, max_passes: usize) -> Result<Vec<Expr>, TranslationError> {
    let mut work = vec![expr.clone()];
    for _ in 0..max_passes {
        if !work.iter().any(contains_or) {
            return Ok(work);
        }
        let mut next = Vec::with_capacity(work.len());
        for item in work {
            match split_first(&item)? {
                Some(copies) => next.extend(copies),
                None => next.push(item),
            }
        }
        work = next;
    }
    if !work.iter().any(contains_or) {
        return Ok(work);
    }
    Err(TranslationError::DisjunctionLimitExceeded {
        detail: format!("{} passes were not enough for: {}", max_passes, expr),
    })
}

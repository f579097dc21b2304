//! Rule classification.
//!
//! One forward pass over the (already or-split) ruleset buckets every rule
//! by head relation and records the per-relation bookkeeping the
//! translators need: the role constant, the best goal score, which `next`
//! function constants are persistence-protected by frame axioms, and which
//! removal strategy each function constant was assigned first.

use crate::config::{CompilerConfig, GoalPolicy, RolePolicy};
use crate::error::{TranslationError, Warning};
use crate::gdl::{Builtin, Rule, Term};
use indexmap::{IndexMap, IndexSet};

/// How facts of a `next` function constant get retracted.
///
/// Assigned first-seen-wins in document order: a frame axiom seen later
/// than a plain `next` rule for the same constant is not retroactively
/// honored, so a constant never carries both strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalStrategy {
    /// Merged frame-axiom removal productions.
    Frame,
    /// A single generic expire-after-one-step production.
    Generic,
}

/// Output of classification.
#[derive(Debug, Default)]
pub struct ClassifiedRules {
    /// The game's role constant, if a `role` rule was seen.
    pub role: Option<String>,
    /// Payload function terms of `init` rules, in document order.
    pub inits: Vec<Term>,
    /// Unconditional facts, grouped by relation name.
    pub facts: IndexMap<String, Vec<Rule>>,
    /// Conditional elaborations (user-defined heads with bodies, plus any
    /// facts reclassified after a conditional sighting of their relation).
    pub elaborations: Vec<Rule>,
    /// terminal, legal, goal, and generic `next` implications.
    pub implications: Vec<Rule>,
    /// Frame axioms, collected separately for the frame compiler.
    pub frame_axioms: Vec<Rule>,
    /// First-seen removal strategy per `next` function constant.
    pub strategies: IndexMap<String, RemovalStrategy>,
    /// Maximum constant score over all goal rules.
    pub best_score: Option<i64>,
}

/// Bucket every rule, in document order.
pub fn classify(
    rules: &[Rule],
    config: &CompilerConfig,
) -> Result<(ClassifiedRules, Vec<Warning>), TranslationError> {
    let mut out = ClassifiedRules::default();
    let mut warnings = Vec::new();
    let mut conditional: IndexSet<String> = IndexSet::new();
    let mut saw_goal = false;

    for rule in rules {
        match rule.head.builtin() {
            Some(Builtin::Next) => classify_next(rule, &mut out),
            Some(Builtin::Role) => {
                if let Term::Constant(name) = &rule.head.terms[0] {
                    if let Some(prev) = out.role.take() {
                        match config.role_policy {
                            RolePolicy::Fatal => {
                                return Err(TranslationError::DuplicateRole {
                                    kept: name.clone(),
                                    replaced: prev,
                                });
                            }
                            RolePolicy::LastWins => {
                                warnings.push(Warning::DuplicateRoleDefinition {
                                    kept: name.clone(),
                                    replaced: prev,
                                });
                            }
                        }
                    }
                    out.role = Some(name.clone());
                }
            }
            Some(Builtin::Init) => out.inits.push(rule.head.terms[0].clone()),
            Some(Builtin::Goal) => {
                saw_goal = true;
                if let Term::Constant(score) = &rule.head.terms[1] {
                    if let Ok(value) = score.parse::<i64>() {
                        out.best_score = Some(out.best_score.map_or(value, |b| b.max(value)));
                    }
                }
                out.implications.push(rule.clone());
            }
            Some(_) => out.implications.push(rule.clone()),
            None => {
                let name = rule.head.relation.clone();
                if rule.body.is_empty() && !conditional.contains(&name) {
                    out.facts.entry(name).or_default().push(rule.clone());
                } else {
                    // A conditional sighting reclassifies every earlier
                    // unconditional rule for this relation. The reverse
                    // never happens.
                    if let Some(previous) = out.facts.shift_remove(&name) {
                        out.elaborations.extend(previous);
                    }
                    conditional.insert(name);
                    out.elaborations.push(rule.clone());
                }
            }
        }
    }

    if !saw_goal {
        match config.goal_policy {
            GoalPolicy::Fatal => return Err(TranslationError::MissingGoalRules),
            GoalPolicy::Warn => warnings.push(Warning::MissingGoalRules),
        }
    }

    Ok((out, warnings))
}

// Coverage is tracked per function constant: a constant's strategy is
// whatever the first `next` rule naming it implies, so a frame axiom and a
// plain rule for the same constant can never disagree.
fn classify_next(rule: &Rule, out: &mut ClassifiedRules) {
    let name = rule.head.terms[0]
        .function_name()
        .unwrap_or_default()
        .to_string();
    let is_frame = match rule.head.true_analogue() {
        Some(analogue) => rule.body.iter().any(|sent| *sent == analogue),
        None => false,
    };
    if is_frame {
        out.strategies.entry(name).or_insert(RemovalStrategy::Frame);
        out.frame_axioms.push(rule.clone());
    } else {
        out.strategies.entry(name).or_insert(RemovalStrategy::Generic);
        out.implications.push(rule.clone());
    }
}

//! Error and warning types for the translation pipeline.

use std::fmt;

/// Fatal error during translation. Any of these aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    /// A built-in relation was used with the wrong number or shape of arguments.
    ArityMismatch { relation: String, detail: String },
    /// The or-splitter could not expand a disjunction node.
    MalformedDisjunction { detail: String },
    /// An axiom still contained disjunctions after the configured number of
    /// splitter passes. The input is well-formed; the pass budget is not.
    DisjunctionLimitExceeded { detail: String },
    /// No goal rule was observed after classifying every rule.
    MissingGoalRules,
    /// More than one role rule under the strict role policy.
    DuplicateRole { kept: String, replaced: String },
    /// The source text could not be read as s-expressions.
    Parse { detail: String },
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::ArityMismatch { relation, detail } => {
                write!(f, "arity mismatch for built-in '{}': {}", relation, detail)
            }
            TranslationError::MalformedDisjunction { detail } => {
                write!(f, "malformed disjunction: {}", detail)
            }
            TranslationError::DisjunctionLimitExceeded { detail } => {
                write!(f, "disjunction pass limit exceeded: {}", detail)
            }
            TranslationError::MissingGoalRules => {
                write!(f, "game description contains no goal rules")
            }
            TranslationError::DuplicateRole { kept, replaced } => {
                write!(f, "duplicate role definition: '{}' after '{}'", kept, replaced)
            }
            TranslationError::Parse { detail } => write!(f, "parse error: {}", detail),
        }
    }
}

impl std::error::Error for TranslationError {}

/// Non-fatal condition. Recorded and reported; translation proceeds,
/// since partial output is still useful while authoring a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A frame-axiom head contains a nested function term that positional
    /// standardization cannot flatten. The term is left unstandardized.
    EmbeddedFunctionUnsupported { head: String },
    /// A second role rule replaced an earlier one (last-write-wins policy).
    DuplicateRoleDefinition { kept: String, replaced: String },
    /// No goal rule was seen (lenient goal policy only).
    MissingGoalRules,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmbeddedFunctionUnsupported { head } => write!(
                f,
                "frame axiom head '{}' embeds a function term; left unstandardized",
                head
            ),
            Warning::DuplicateRoleDefinition { kept, replaced } => {
                write!(f, "role '{}' replaces earlier role '{}'", kept, replaced)
            }
            Warning::MissingGoalRules => {
                write!(f, "game description contains no goal rules")
            }
        }
    }
}

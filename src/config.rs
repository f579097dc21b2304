//! Compiler configuration types.
//!
//! The reference material for this translator disagrees with itself in a few
//! places (goal-rule strictness, output preamble, duplicate roles). Those
//! choices are surfaced here as explicit configuration instead of being
//! hardcoded.

/// How to treat a ruleset with zero goal rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalPolicy {
    /// Abort the run with `TranslationError::MissingGoalRules`.
    Fatal,
    /// Record a warning and keep translating.
    Warn,
}

/// Which fixed preamble precedes the serialized productions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preamble {
    /// Sources the selection space inside the default directory.
    SelectionSpace,
    /// Sources a single shared header file.
    Header,
}

impl Preamble {
    /// The literal preamble text, emitted before the first production.
    pub fn text(self) -> &'static str {
        match self {
            Preamble::SelectionSpace => "pushd default\nsource selection.soar\npopd\n",
            Preamble::Header => "source header.soar\n",
        }
    }
}

/// Behavior when more than one `role` rule is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePolicy {
    /// Keep the last role seen and record a warning.
    LastWins,
    /// Abort the run.
    Fatal,
}

/// Configuration for one compilation run.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Name asserted on the top state and tested by every translated rule.
    pub game_name: String,
    pub goal_policy: GoalPolicy,
    pub preamble: Preamble,
    pub role_policy: RolePolicy,
    /// Upper bound on or-splitter passes over one axiom, to keep a
    /// pathological description from looping the expander.
    pub max_or_passes: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            game_name: "game".to_string(),
            goal_policy: GoalPolicy::Fatal,
            preamble: Preamble::SelectionSpace,
            role_policy: RolePolicy::LastWins,
            max_or_passes: 64,
        }
    }
}

//! A compiler from GDL (General Game Playing's Game Description Language)
//! to Soar productions.
//!
//! The pipeline reads a game's Horn-clause description, eliminates
//! disjunctions, classifies every rule by its head relation, and emits one
//! forward-chaining production set: proposals and applications for legal
//! moves, state-update rules for `next` facts, elaborations for derived
//! relations, a bootstrap rule for the initial state, and explicit removal
//! rules synthesized from frame axioms (Soar working memory persists until
//! explicitly removed, so expiry must be compiled in).
//!
//! ```
//! use gdlsoar::{compile, CompilerConfig};
//!
//! let source = "
//!     (role xplayer)
//!     (init (step 1))
//!     (<= (legal xplayer noop) (true (step 1)))
//!     (<= terminal (true (step 1)))
//!     (goal xplayer 100)";
//! let output = compile(source, &CompilerConfig::default()).unwrap();
//! assert!(output.text.contains("sp {propose*noop"));
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod gdl;
pub mod json;
pub mod parser;
pub mod soar;
pub mod symbols;
pub mod translate;

pub use config::{CompilerConfig, GoalPolicy, Preamble, RolePolicy};
pub use error::{TranslationError, Warning};
pub use gdl::{Builtin, Rule, Sentence, Term};
pub use soar::{Production, ProductionKind};
pub use symbols::{NameGenerator, VariableMap};
pub use translate::{compile, compile_exprs, CompileOutput};

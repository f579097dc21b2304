//! The GDL data model: terms, sentences, rules.

pub mod rule;
pub mod sentence;
pub mod term;

pub use rule::Rule;
pub use sentence::{Builtin, Sentence};
pub use term::Term;

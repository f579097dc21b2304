//! Ruleset analysis: disjunction elimination and classification.

pub mod classify;
pub mod or_split;

pub use classify::{classify, ClassifiedRules, RemovalStrategy};

#[cfg(test)]
mod proptest_tests;

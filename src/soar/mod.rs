//! Target production model and builder.

pub mod builder;
pub mod production;

pub use production::{Action, Cond, Production, ProductionKind, Value};

//! The target intermediate representation: Soar productions.
//!
//! A production is an ordered list of condition nodes (each testing
//! attributes of one identifier), optionally grouped into negative
//! conjunctions, followed by actions. Rendering to the engine's `sp {...}`
//! syntax lives entirely in the `Display` impl; the rest of the compiler
//! only manipulates the structure through the builder methods.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of production, reflected in naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionKind {
    Propose,
    Apply,
    Elaborate,
}

/// A value on the right-hand side of a test or action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// A production variable, rendered `<name>`.
    Sym(String),
    /// A literal constant, rendered verbatim.
    Const(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Sym(s) => write!(f, "<{}>", s),
            Value::Const(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum TestValue {
    Ground(String),
    Id(String),
    /// Binds `sym` while requiring it differ from every listed value,
    /// rendered `{ <> a <> b <sym> }`.
    Distinct { sym: String, others: Vec<Value> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Test {
    pub attr: String,
    pub negated: bool,
    pub value: TestValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CondNode {
    pub subject: String,
    pub is_state: bool,
    pub tests: Vec<Test>,
}

/// Handle to a condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cond(pub(crate) usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Item {
    Node(usize),
    BeginNeg,
    EndNeg,
}

/// An action in the production's right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Make {
        subject: String,
        attr: String,
        value: Value,
        preference: Option<char>,
    },
    Remove {
        subject: String,
        attr: String,
        value: Value,
    },
    Halt,
}

/// One condition/action rule for the target engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub name: String,
    pub kind: ProductionKind,
    pub(crate) nodes: Vec<CondNode>,
    pub(crate) order: Vec<Item>,
    pub(crate) actions: Vec<Action>,
    pub(crate) locals: indexmap::IndexMap<String, u32>,
    pub(crate) neg_depth: usize,
}

impl Production {
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Whether any condition sits inside a negative conjunction.
    pub fn has_negative_group(&self) -> bool {
        self.order.iter().any(|i| matches!(i, Item::BeginNeg))
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sp {{{}", self.name)?;
        for item in &self.order {
            match item {
                Item::Node(idx) => {
                    let node = &self.nodes[*idx];
                    if node.tests.is_empty() {
                        continue;
                    }
                    write!(f, "   (")?;
                    if node.is_state {
                        write!(f, "state ")?;
                    }
                    write!(f, "<{}>", node.subject)?;
                    for test in &node.tests {
                        write!(f, " ")?;
                        if test.negated {
                            write!(f, "-")?;
                        }
                        write!(f, "^{} ", test.attr)?;
                        match &test.value {
                            TestValue::Ground(v) => write!(f, "{}", v)?,
                            TestValue::Id(sym) => write!(f, "<{}>", sym)?,
                            TestValue::Distinct { sym, others } => {
                                write!(f, "{{ ")?;
                                for other in others {
                                    write!(f, "<> {} ", other)?;
                                }
                                write!(f, "<{}> }}", sym)?;
                            }
                        }
                    }
                    writeln!(f, ")")?;
                }
                Item::BeginNeg => writeln!(f, "  -{{")?,
                Item::EndNeg => writeln!(f, "   }}")?,
            }
        }
        writeln!(f, "-->")?;
        for action in &self.actions {
            match action {
                Action::Make {
                    subject,
                    attr,
                    value,
                    preference,
                } => {
                    write!(f, "   (<{}> ^{} {}", subject, attr, value)?;
                    if let Some(pref) = preference {
                        write!(f, " {}", pref)?;
                    }
                    writeln!(f, ")")?;
                }
                Action::Remove {
                    subject,
                    attr,
                    value,
                } => writeln!(f, "   (<{}> ^{} {} -)", subject, attr, value)?,
                Action::Halt => writeln!(f, "   (halt)")?,
            }
        }
        write!(f, "}}")
    }
}

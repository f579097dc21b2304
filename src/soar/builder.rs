//! Builder surface over [`Production`].
//!
//! The translators construct productions exclusively through these calls:
//! conditions hang off a parent condition handle, predicates attach to a
//! condition, actions target identifier symbols. Local identifier symbols
//! are allocated from a per-production counter keyed by seed, which keeps
//! output deterministic without consulting the run-wide name generator.

use super::production::{Action, Cond, CondNode, Item, Production, ProductionKind, Test, TestValue, Value};

fn seed_from_attr(attr: &str) -> String {
    let cleaned: String = attr.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if cleaned.is_empty() {
        "v".to_string()
    } else {
        cleaned
    }
}

impl Production {
    /// A production starts with a single state condition bound to `<s>`.
    pub fn new(name: &str, kind: ProductionKind) -> Production {
        Production {
            name: name.to_string(),
            kind,
            nodes: vec![CondNode {
                subject: "s".to_string(),
                is_state: true,
                tests: vec![],
            }],
            order: vec![Item::Node(0)],
            actions: vec![],
            locals: indexmap::IndexMap::new(),
            neg_depth: 0,
        }
    }

    /// Handle to the root state condition.
    pub fn state(&self) -> Cond {
        Cond(0)
    }

    /// Identifier symbol bound by a condition.
    pub fn subject(&self, cond: Cond) -> &str {
        &self.nodes[cond.0].subject
    }

    fn local(&mut self, seed: &str) -> String {
        let counter = self.locals.entry(seed.to_string()).or_insert(0);
        *counter += 1;
        format!("{}{}", seed, counter)
    }

    fn push_node(&mut self, node: CondNode) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.order.push(Item::Node(idx));
        idx
    }

    /// Test `^attr <sym>` on the parent and bind a new condition for `sym`.
    /// With `negate`, the attribute test is negated (an absence test when
    /// the bound identifier is never constrained further).
    pub fn add_condition(&mut self, parent: Cond, attr: &str, negate: bool) -> Cond {
        let sym = self.local(&seed_from_attr(attr));
        self.add_condition_as(parent, attr, &sym, negate)
    }

    /// Like [`Self::add_condition`] with a caller-chosen symbol.
    pub fn add_condition_as(&mut self, parent: Cond, attr: &str, sym: &str, negate: bool) -> Cond {
        let link = Test {
            attr: attr.to_string(),
            negated: negate,
            value: TestValue::Id(sym.to_string()),
        };
        if self.neg_depth > 0 {
            // Inside a negative conjunction the link must be re-tested on a
            // fresh condition so the group negation covers it.
            let subject = self.nodes[parent.0].subject.clone();
            self.push_node(CondNode {
                subject,
                is_state: false,
                tests: vec![link],
            });
        } else {
            self.nodes[parent.0].tests.push(link);
        }
        let idx = self.push_node(CondNode {
            subject: sym.to_string(),
            is_state: false,
            tests: vec![],
        });
        Cond(idx)
    }

    /// Test `^attr value` with a literal value.
    pub fn add_ground_predicate(&mut self, cond: Cond, attr: &str, value: &str) {
        self.nodes[cond.0].tests.push(Test {
            attr: attr.to_string(),
            negated: false,
            value: TestValue::Ground(value.to_string()),
        });
    }

    /// Test `^attr <sym>`, binding `sym` (allocated when not supplied).
    /// Returns a condition handle for the bound identifier and its symbol.
    pub fn add_id_predicate(&mut self, cond: Cond, attr: &str, name: Option<&str>) -> (Cond, String) {
        let sym = match name {
            Some(n) => n.to_string(),
            None => self.local(&seed_from_attr(attr)),
        };
        self.nodes[cond.0].tests.push(Test {
            attr: attr.to_string(),
            negated: false,
            value: TestValue::Id(sym.clone()),
        });
        let idx = self.push_node(CondNode {
            subject: sym.clone(),
            is_state: false,
            tests: vec![],
        });
        (Cond(idx), sym)
    }

    /// Bind `sym` under `^attr` while requiring it differ from every value
    /// in `others`.
    pub fn add_distinct_predicate(&mut self, cond: Cond, attr: &str, sym: &str, others: Vec<Value>) {
        self.nodes[cond.0].tests.push(Test {
            attr: attr.to_string(),
            negated: false,
            value: TestValue::Distinct {
                sym: sym.to_string(),
                others,
            },
        });
    }

    pub fn begin_negative_conjunction(&mut self) {
        self.order.push(Item::BeginNeg);
        self.neg_depth += 1;
    }

    pub fn end_negative_conjunction(&mut self) {
        debug_assert!(self.neg_depth > 0, "unbalanced negative conjunction");
        self.order.push(Item::EndNeg);
        self.neg_depth = self.neg_depth.saturating_sub(1);
    }

    /// Test that the selected operator carries the given name.
    pub fn add_operator_test(&mut self, name: &str) -> Cond {
        let sym = self.local("o");
        let op = self.add_condition_as(self.state(), "operator", &sym, false);
        self.add_ground_predicate(op, "name", name);
        op
    }

    /// Add a WME with an explicit value.
    pub fn add_wme(&mut self, subject: &str, attr: &str, value: Value) {
        self.actions.push(Action::Make {
            subject: subject.to_string(),
            attr: attr.to_string(),
            value,
            preference: None,
        });
    }

    /// Add a WME whose value is a freshly allocated identifier; returns the
    /// identifier symbol so further attributes can be attached to it.
    pub fn add_id_wme(&mut self, subject: &str, attr: &str, seed: &str) -> String {
        let sym = self.local(&seed_from_attr(seed));
        self.actions.push(Action::Make {
            subject: subject.to_string(),
            attr: attr.to_string(),
            value: Value::Sym(sym.clone()),
            preference: None,
        });
        sym
    }

    /// Remove the WME binding `sym` under `^attr`.
    pub fn remove_id_wme(&mut self, subject: &str, attr: &str, sym: &str) {
        self.actions.push(Action::Remove {
            subject: subject.to_string(),
            attr: attr.to_string(),
            value: Value::Sym(sym.to_string()),
        });
    }

    /// Propose an operator with the given preference; returns the operator
    /// symbol for attaching name and arguments.
    pub fn add_op_proposal(&mut self, preference: char) -> String {
        let sym = self.local("o");
        self.actions.push(Action::Make {
            subject: "s".to_string(),
            attr: "operator".to_string(),
            value: Value::Sym(sym.clone()),
            preference: Some(preference),
        });
        sym
    }

    pub fn add_halt(&mut self) {
        self.actions.push(Action::Halt);
    }

    /// Structural copy under a new name.
    pub fn copy(&self, new_name: &str) -> Production {
        let mut copy = self.clone();
        copy.name = new_name.to_string();
        copy
    }
}

//! Rules: a head sentence with an ordered body.

use super::sentence::Sentence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Horn rule. A bare fact is a rule with an empty body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub head: Sentence,
    pub body: Vec<Sentence>,
}

impl Rule {
    pub fn new(head: Sentence, body: Vec<Sentence>) -> Rule {
        Rule { head, body }
    }

    pub fn fact(head: Sentence) -> Rule {
        Rule { head, body: vec![] }
    }

    /// Collect variable names across head and body in first-occurrence order.
    pub fn collect_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.head.collect_variables(&mut vars);
        for sent in &self.body {
            sent.collect_variables(&mut vars);
        }
        vars
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.body.is_empty() {
            write!(f, "{}", self.head)
        } else {
            write!(f, "(<= {}", self.head)?;
            for sent in &self.body {
                write!(f, " {}", sent)?;
            }
            write!(f, ")")
        }
    }
}

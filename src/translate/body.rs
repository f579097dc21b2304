//! Shared lowering of rule bodies into production conditions.
//!
//! Every category translator drives the same machinery: a [`RuleLowering`]
//! wraps one production under construction together with the variable scope
//! for one rule. `true` literals become conditions under the game-state
//! node, `does` literals match the `last-move` structure, user relations
//! match under the elaborations node, and `distinct` literals fold into a
//! value inequality at the first condition that binds their variable.

use crate::gdl::{Builtin, Sentence, Term};
use crate::soar::{Cond, Production, ProductionKind, Value};
use crate::symbols::{NameGenerator, VariableMap};
use indexmap::{IndexMap, IndexSet};

/// Lowering context for one rule.
pub struct RuleLowering<'a> {
    pub prod: Production,
    gen: &'a mut NameGenerator,
    pub vars: VariableMap,
    /// Variables forced to a constant (role literals, negated distinct
    /// against a constant). Checked before the symbol map.
    ground: IndexMap<String, String>,
    /// Distinctness obligations per variable, discharged at its bind site.
    pending_distinct: IndexMap<String, Vec<Term>>,
    bound: IndexSet<String>,
    gs: Option<Cond>,
    el: Option<Cond>,
    role: Option<String>,
}

impl<'a> RuleLowering<'a> {
    pub fn new(
        name: &str,
        kind: ProductionKind,
        game_name: &str,
        role: Option<&str>,
        gen: &'a mut NameGenerator,
    ) -> RuleLowering<'a> {
        let mut prod = Production::new(name, kind);
        let state = prod.state();
        prod.add_ground_predicate(state, "name", game_name);
        RuleLowering {
            prod,
            gen,
            vars: VariableMap::new(),
            ground: IndexMap::new(),
            pending_distinct: IndexMap::new(),
            bound: IndexSet::new(),
            gs: None,
            el: None,
            role: role.map(str::to_string),
        }
    }

    pub fn into_production(self) -> Production {
        self.prod
    }

    /// Condition for the game-state node, created on first use. Must first
    /// be used outside any negative conjunction.
    pub fn gs(&mut self) -> Cond {
        if let Some(cond) = self.gs {
            return cond;
        }
        debug_assert_eq!(self.prod.neg_depth, 0, "gs link created inside a negative group");
        let cond = self.prod.add_condition_as(self.prod.state(), "gs", "gs", false);
        self.gs = Some(cond);
        cond
    }

    /// Condition for the elaborations node, created on first use.
    pub fn el(&mut self) -> Cond {
        if let Some(cond) = self.el {
            return cond;
        }
        debug_assert_eq!(self.prod.neg_depth, 0, "el link created inside a negative group");
        let cond = self
            .prod
            .add_condition_as(self.prod.state(), "elaborations", "el", false);
        self.el = Some(cond);
        cond
    }

    /// Test that the selected operator carries `name`.
    pub fn operator_test(&mut self, name: &str) -> Cond {
        self.prod.add_operator_test(name)
    }

    /// Record a distinctness obligation for `var` against `other`.
    /// Duplicate obligations (common after merging frame bodies) collapse.
    pub fn require_distinct(&mut self, var: &str, other: Term) {
        let entry = self.pending_distinct.entry(var.to_string()).or_default();
        if !entry.contains(&other) {
            entry.push(other);
        }
    }

    /// Scan the body for literals that constrain variables rather than
    /// matching structure: positive `distinct` folds into inequalities,
    /// negated variable-to-variable `distinct` aliases the two variables,
    /// negated variable-to-constant `distinct` grounds the variable, and
    /// `role` literals ground their variable to the game's role.
    pub fn prescan(&mut self, body: &[Sentence]) {
        for sent in body {
            match sent.builtin() {
                Some(Builtin::Distinct) => {
                    let (a, b) = (&sent.terms[0], &sent.terms[1]);
                    if !sent.negated {
                        match (a, b) {
                            (Term::Variable(v), other) | (other, Term::Variable(v)) => {
                                self.require_distinct(v, other.clone());
                            }
                            _ => {}
                        }
                    } else {
                        match (a, b) {
                            (Term::Variable(x), Term::Variable(y)) => {
                                let sym = self.vars.get(self.gen, x);
                                self.vars.pin(y, &sym);
                            }
                            (Term::Variable(v), Term::Constant(c))
                            | (Term::Constant(c), Term::Variable(v)) => {
                                self.ground.insert(v.clone(), c.clone());
                            }
                            _ => {}
                        }
                    }
                }
                Some(Builtin::Role) => {
                    if let (Term::Variable(v), Some(role)) = (&sent.terms[0], &self.role) {
                        self.ground.insert(v.clone(), role.clone());
                    }
                }
                _ => {}
            }
        }
    }

    /// Lower a whole body: prescan, create the parent links the body will
    /// need (so negative conjunctions never have to create them), then
    /// lower every structural literal.
    pub fn lower_body(&mut self, body: &[Sentence]) {
        self.prescan(body);
        self.ensure_parents(body);
        for sent in body {
            self.lower_literal(sent);
        }
    }

    /// Create gs/el links up front for the literal kinds present in `body`.
    pub fn ensure_parents(&mut self, body: &[Sentence]) {
        for sent in body {
            match sent.builtin() {
                Some(Builtin::True) | Some(Builtin::Does) => {
                    self.gs();
                }
                None => {
                    self.el();
                }
                _ => {}
            }
        }
    }

    /// Lower one literal. Constraint literals handled by [`Self::prescan`]
    /// are skipped here.
    pub fn lower_literal(&mut self, sent: &Sentence) {
        if matches!(sent.builtin(), Some(Builtin::Distinct) | Some(Builtin::Role)) {
            return;
        }
        if sent.negated {
            self.prod.begin_negative_conjunction();
            self.lower_positive(sent);
            self.prod.end_negative_conjunction();
        } else {
            self.lower_positive(sent);
        }
    }

    fn lower_positive(&mut self, sent: &Sentence) {
        match sent.builtin() {
            Some(Builtin::True) => {
                if let Term::Function(name, args) = &sent.terms[0] {
                    let name = name.clone();
                    let args = args.clone();
                    let gs = self.gs();
                    let cond = self.prod.add_condition(gs, &name, false);
                    self.lower_args(cond, &args);
                }
            }
            Some(Builtin::Does) => {
                let role = sent.terms[0].clone();
                let mv = sent.terms[1].clone();
                let gs = self.gs();
                let cond = self.prod.add_condition(gs, "last-move", false);
                self.lower_arg(cond, "role", &role);
                match &mv {
                    Term::Function(name, args) => {
                        self.prod.add_ground_predicate(cond, "name", name);
                        self.lower_args(cond, &args.clone());
                    }
                    other => self.lower_arg(cond, "name", other),
                }
            }
            Some(Builtin::Terminal) => {
                let state = self.prod.state();
                self.prod.add_ground_predicate(state, "terminal", "true");
            }
            None => {
                let relation = sent.relation.clone();
                let terms = sent.terms.clone();
                let el = self.el();
                let cond = self.prod.add_condition(el, &relation, false);
                self.lower_args(cond, &terms);
            }
            // next/init/legal/goal never occur in a body; role and distinct
            // are filtered above.
            _ => {}
        }
    }

    /// Lower positional arguments `p1..pn` onto `cond`.
    pub fn lower_args(&mut self, cond: Cond, args: &[Term]) {
        for (i, arg) in args.iter().enumerate() {
            let attr = format!("p{}", i + 1);
            self.lower_arg(cond, &attr, arg);
        }
    }

    fn lower_arg(&mut self, cond: Cond, attr: &str, term: &Term) {
        match term {
            Term::Constant(c) => self.prod.add_ground_predicate(cond, attr, c),
            Term::Variable(v) => {
                if let Some(c) = self.ground.get(v) {
                    let c = c.clone();
                    self.prod.add_ground_predicate(cond, attr, &c);
                    return;
                }
                let sym = self.vars.get(self.gen, v);
                let first = self.bound.insert(v.clone());
                let obligations = if first {
                    self.pending_distinct.shift_remove(v).unwrap_or_default()
                } else {
                    Vec::new()
                };
                if obligations.is_empty() {
                    self.prod.add_id_predicate(cond, attr, Some(&sym));
                } else {
                    let others = obligations.iter().map(|t| self.value_of(t)).collect();
                    self.prod.add_distinct_predicate(cond, attr, &sym, others);
                }
            }
            Term::Function(name, args) => {
                let (inner, _) = self.prod.add_id_predicate(cond, attr, None);
                self.prod.add_ground_predicate(inner, "name", name);
                self.lower_args(inner, &args.clone());
            }
        }
    }

    /// Right-hand-side value for a leaf term.
    pub fn value_of(&mut self, term: &Term) -> Value {
        match term {
            Term::Constant(c) => Value::Const(c.clone()),
            Term::Variable(v) => match self.ground.get(v) {
                Some(c) => Value::Const(c.clone()),
                None => Value::Sym(self.vars.get(self.gen, v)),
            },
            Term::Function(name, _) => Value::Const(name.clone()),
        }
    }

    /// Assert `term` as a structure under the identifier `subject`. The top
    /// level hangs off an attribute named after the function constant;
    /// nested functions additionally carry a `name` attribute.
    pub fn assert_term(&mut self, subject: &str, term: &Term) {
        match term {
            Term::Function(name, args) => {
                let name = name.clone();
                let args = args.clone();
                let id = self.prod.add_id_wme(subject, &name, &name);
                self.assert_args(&id, &args);
            }
            leaf => {
                let value = self.value_of(leaf);
                if let Value::Const(c) = &value {
                    let c = c.clone();
                    self.prod.add_wme(subject, &c, Value::Const("true".to_string()));
                } else {
                    self.prod.add_wme(subject, "value", value);
                }
            }
        }
    }

    /// Assert a user-relation sentence under the identifier `subject`.
    pub fn assert_relation(&mut self, subject: &str, sent: &Sentence) {
        let relation = sent.relation.clone();
        let terms = sent.terms.clone();
        let id = self.prod.add_id_wme(subject, &relation, &relation);
        self.assert_args(&id, &terms);
    }

    pub fn assert_args(&mut self, subject: &str, args: &[Term]) {
        for (i, arg) in args.iter().enumerate() {
            let attr = format!("p{}", i + 1);
            match arg {
                Term::Function(name, inner) => {
                    let name = name.clone();
                    let inner = inner.clone();
                    let id = self.prod.add_id_wme(subject, &attr, &name);
                    self.prod.add_wme(&id, "name", Value::Const(name));
                    self.assert_args(&id, &inner);
                }
                leaf => {
                    let value = self.value_of(leaf);
                    self.prod.add_wme(subject, &attr, value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_gdl, rule_from_expr};

    fn body_of(source: &str) -> Vec<Sentence> {
        let exprs = parse_gdl(source).unwrap();
        rule_from_expr(&exprs[0]).unwrap().body
    }

    fn lowered(source: &str) -> String {
        let mut gen = NameGenerator::new();
        let mut lowering = RuleLowering::new(
            "elaborate*t",
            ProductionKind::Elaborate,
            "game",
            Some("xplayer"),
            &mut gen,
        );
        lowering.lower_body(&body_of(source));
        lowering.into_production().to_string()
    }

    #[test]
    fn true_literal_matches_under_the_game_state() {
        let text = lowered("(<= terminal (true (cell 1 1 ?w)))");
        assert!(text.contains("(state <s> ^name game ^gs <gs>)"), "{}", text);
        assert!(text.contains("(<gs> ^cell <cell1>)"), "{}", text);
        assert!(text.contains("(<cell1> ^p1 1 ^p2 1 ^p3 <w>)"), "{}", text);
    }

    #[test]
    fn does_literal_matches_the_last_move() {
        let text = lowered("(<= terminal (does xplayer (mark ?m ?n)))");
        assert!(text.contains("(<gs> ^last-move <lastmove1>)"), "{}", text);
        assert!(
            text.contains("(<lastmove1> ^role xplayer ^name mark ^p1 <m> ^p2 <n>)"),
            "{}",
            text
        );
    }

    #[test]
    fn constant_move_has_no_arguments() {
        let text = lowered("(<= terminal (does xplayer noop))");
        assert!(text.contains("^role xplayer ^name noop)"), "{}", text);
    }

    #[test]
    fn user_relation_matches_under_elaborations() {
        let text = lowered("(<= terminal (line ?x))");
        assert!(text.contains("^elaborations <el>"), "{}", text);
        assert!(text.contains("(<el> ^line <line1>)"), "{}", text);
        assert!(text.contains("(<line1> ^p1 <x>)"), "{}", text);
    }

    #[test]
    fn distinct_folds_at_the_first_bind_site() {
        let text = lowered("(<= terminal (true (cell ?m ?n ?w)) (distinct ?w b))");
        assert!(text.contains("^p3 { <> b <w> }"), "{}", text);
    }

    #[test]
    fn distinct_between_variables_uses_the_other_symbol() {
        let text =
            lowered("(<= terminal (true (cell ?m ?n ?w)) (true (cell ?m ?n2 ?v)) (distinct ?w ?v))");
        assert!(text.contains("^p3 { <> <v> <w> }"), "{}", text);
    }

    #[test]
    fn negated_distinct_against_a_constant_grounds_the_variable() {
        let text = lowered("(<= terminal (true (cell ?m ?n ?w)) (not (distinct ?w b)))");
        assert!(text.contains("^p3 b"), "{}", text);
    }

    #[test]
    fn role_literal_grounds_its_variable() {
        let text = lowered("(<= terminal (role ?p) (does ?p noop))");
        assert!(text.contains("^role xplayer"), "{}", text);
    }

    #[test]
    fn negated_literal_sits_in_a_negative_conjunction() {
        let text = lowered(
            "(<= terminal (true (cell ?m ?n b)) (not (does xplayer (mark ?m ?n))))",
        );
        let neg = text.find("-{").expect("negative group");
        let link = text.find("(<gs> ^last-move").expect("re-tested link");
        assert!(link > neg, "{}", text);
        // The gs link itself stays outside the group.
        assert!(text.find("^gs <gs>").unwrap() < neg, "{}", text);
    }

    #[test]
    fn nested_function_argument_gets_a_name_attribute() {
        let text = lowered("(<= terminal (true (cell 1 (coord ?x ?y) b)))");
        assert!(text.contains("(<p21> ^name coord ^p1 <x> ^p2 <y>)"), "{}", text);
    }

    #[test]
    fn assert_term_builds_the_structure() {
        let mut gen = NameGenerator::new();
        let mut lowering = RuleLowering::new(
            "apply*t",
            ProductionKind::Apply,
            "game",
            None,
            &mut gen,
        );
        let term = crate::parser::term_from_expr(
            &crate::parser::sexp::parse_exprs("(cell 1 1 b)").unwrap()[0],
        )
        .unwrap();
        lowering.assert_term("gs", &term);
        let text = lowering.into_production().to_string();
        assert!(text.contains("(<gs> ^cell <cell1>)"), "{}", text);
        assert!(text.contains("(<cell1> ^p1 1)"), "{}", text);
        assert!(text.contains("(<cell1> ^p2 1)"), "{}", text);
        assert!(text.contains("(<cell1> ^p3 b)"), "{}", text);
    }
}

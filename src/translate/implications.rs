//! Translation of classified implications: terminal, legal, goal, generic
//! `next`, and conditional elaborations.

use crate::analysis::{ClassifiedRules, RemovalStrategy};
use crate::config::CompilerConfig;
use crate::gdl::{Builtin, Rule, Term};
use crate::soar::{Production, ProductionKind, Value};
use crate::symbols::NameGenerator;
use indexmap::IndexSet;

use super::body::RuleLowering;

/// Translates implications one rule at a time, deduplicating the
/// per-move-name apply productions and the per-function generic removal
/// productions across rules.
pub struct ImplicationTranslator<'a> {
    config: &'a CompilerConfig,
    classified: &'a ClassifiedRules,
    gen: &'a mut NameGenerator,
    emitted_applies: IndexSet<(String, usize)>,
    emitted_removers: IndexSet<String>,
    productions: Vec<Production>,
}

impl<'a> ImplicationTranslator<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        classified: &'a ClassifiedRules,
        gen: &'a mut NameGenerator,
    ) -> ImplicationTranslator<'a> {
        ImplicationTranslator {
            config,
            classified,
            gen,
            emitted_applies: IndexSet::new(),
            emitted_removers: IndexSet::new(),
            productions: Vec::new(),
        }
    }

    fn lowering(&mut self, name: &str, kind: ProductionKind) -> RuleLowering<'_> {
        RuleLowering::new(
            name,
            kind,
            &self.config.game_name,
            self.classified.role.as_deref(),
            self.gen,
        )
    }

    /// Dispatch one rule by its head relation.
    pub fn translate(&mut self, rule: &Rule) {
        match rule.head.builtin() {
            Some(Builtin::Terminal) => self.translate_terminal(rule),
            Some(Builtin::Legal) => self.translate_legal(rule),
            Some(Builtin::Next) => self.translate_next(rule),
            Some(Builtin::Goal) => self.translate_goal(rule),
            None => self.translate_elaboration(rule),
            // role/init/true/does/distinct heads never reach this bucket.
            _ => {}
        }
    }

    pub fn finish(self) -> Vec<Production> {
        self.productions
    }

    /// A terminal rule becomes two elaborations: one for lookahead states
    /// (marked with `duplicate-of`), which only flags termination, and one
    /// for the real game state, which also halts the agent.
    fn translate_terminal(&mut self, rule: &Rule) {
        let name = self.gen.fresh("elaborate*terminal");
        let mut lowering = self.lowering(&name, ProductionKind::Elaborate);
        lowering.lower_body(&rule.body);
        lowering
            .prod
            .add_wme("s", "terminal", Value::Const("true".to_string()));
        let mut base = lowering.into_production();

        let dup_name = self.gen.fresh("elaborate*terminal*duplicate");
        let mut dup = base.copy(&dup_name);
        dup.add_condition(dup.state(), "duplicate-of", false);
        self.productions.push(dup);

        base.add_condition(base.state(), "duplicate-of", true);
        base.add_halt();
        self.productions.push(base);
    }

    /// A legal rule becomes a proposal for its move. The matching apply
    /// production records the selected move as `last-move`; one apply per
    /// move name and arity serves every proposal of that move.
    fn translate_legal(&mut self, rule: &Rule) {
        let role = rule.head.terms[0].clone();
        let mv = rule.head.terms[1].clone();
        let (move_name, move_args) = match &mv {
            Term::Function(name, args) => (name.clone(), args.clone()),
            Term::Constant(name) => (name.clone(), Vec::new()),
            Term::Variable(_) => return,
        };

        let name = self.gen.fresh(&format!("propose*{}", move_name));
        let mut lowering = self.lowering(&name, ProductionKind::Propose);
        lowering.lower_body(&rule.body);
        // No proposals while a chosen move is still waiting to be applied
        // to the game state.
        let gs = lowering.gs();
        lowering.prod.add_condition(gs, "last-move", true);
        let op = lowering.prod.add_op_proposal('+');
        lowering
            .prod
            .add_wme(&op, "name", Value::Const(move_name.clone()));
        let role_value = lowering.value_of(&role);
        lowering.prod.add_wme(&op, "role", role_value);
        for (i, arg) in move_args.iter().enumerate() {
            let attr = format!("p{}", i + 1);
            let value = lowering.value_of(arg);
            lowering.prod.add_wme(&op, &attr, value);
        }
        let propose = lowering.into_production();
        self.productions.push(propose);

        if self
            .emitted_applies
            .insert((move_name.clone(), move_args.len()))
        {
            let apply = self.move_apply(&move_name, move_args.len());
            self.productions.push(apply);
        }
    }

    /// `apply*{move}`: copy the selected operator's fields into a
    /// `last-move` structure on the game state.
    fn move_apply(&mut self, move_name: &str, arity: usize) -> Production {
        let name = self.gen.fresh(&format!("apply*{}", move_name));
        let mut prod = Production::new(&name, ProductionKind::Apply);
        let state = prod.state();
        prod.add_ground_predicate(state, "name", &self.config.game_name);
        prod.add_condition_as(state, "gs", "gs", false);
        let op = prod.add_operator_test(move_name);
        let (_, role_sym) = prod.add_id_predicate(op, "role", Some("role"));
        let mut arg_syms = Vec::with_capacity(arity);
        for i in 0..arity {
            let attr = format!("p{}", i + 1);
            let (_, sym) = prod.add_id_predicate(op, &attr, None);
            arg_syms.push(sym);
        }
        let lm = prod.add_id_wme("gs", "last-move", "lm");
        prod.add_wme(&lm, "name", Value::Const(move_name.to_string()));
        prod.add_wme(&lm, "role", Value::Sym(role_sym));
        for (i, sym) in arg_syms.into_iter().enumerate() {
            let attr = format!("p{}", i + 1);
            prod.add_wme(&lm, &attr, Value::Sym(sym));
        }
        prod
    }

    /// A generic `next` rule becomes an update production under the
    /// `update-state` operator. Function constants without frame coverage
    /// additionally get one shared removal production that expires every
    /// instance each step.
    fn translate_next(&mut self, rule: &Rule) {
        let head_fn = rule.head.terms[0].clone();
        let fname = head_fn.function_name().unwrap_or_default().to_string();

        let name = self.gen.fresh(&format!("apply*update-state*{}", fname));
        let mut lowering = self.lowering(&name, ProductionKind::Apply);
        lowering.operator_test("update-state");
        lowering.lower_body(&rule.body);
        let gs = lowering.gs();
        let gs_sym = lowering.prod.subject(gs).to_string();
        lowering.assert_term(&gs_sym, &head_fn);
        let update = lowering.into_production();
        self.productions.push(update);

        let generic = self.classified.strategies.get(&fname)
            == Some(&RemovalStrategy::Generic);
        if generic && self.emitted_removers.insert(fname.clone()) {
            let remover = self.generic_remover(&fname);
            self.productions.push(remover);
        }
    }

    /// `apply*update-state*remove-{f}`: retract every instance of `f`.
    fn generic_remover(&mut self, fname: &str) -> Production {
        let name = self
            .gen
            .fresh(&format!("apply*update-state*remove-{}", fname));
        let mut prod = Production::new(&name, ProductionKind::Apply);
        let state = prod.state();
        prod.add_ground_predicate(state, "name", &self.config.game_name);
        let gs = prod.add_condition_as(state, "gs", "gs", false);
        prod.add_operator_test("update-state");
        let fact = prod.add_condition(gs, fname, false);
        let sym = prod.subject(fact).to_string();
        prod.remove_id_wme("gs", fname, &sym);
        prod
    }

    /// A goal rule becomes an elaboration that fires once the state is
    /// terminal and records the outcome. Whether the outcome counts as a
    /// success is decided at translation time against the best score any
    /// goal rule can award.
    fn translate_goal(&mut self, rule: &Rule) {
        let outcome = match (&rule.head.terms[1], self.classified.best_score) {
            (Term::Constant(score), Some(best)) => match score.parse::<i64>() {
                Ok(value) if value >= best => "success",
                _ => "failure",
            },
            _ => "failure",
        };
        let name = self.gen.fresh("elaborate*goal");
        let mut lowering = self.lowering(&name, ProductionKind::Elaborate);
        let state = lowering.prod.state();
        lowering.prod.add_ground_predicate(state, "terminal", "true");
        lowering.lower_body(&rule.body);
        lowering
            .prod
            .add_wme("s", "outcome", Value::Const(outcome.to_string()));
        let prod = lowering.into_production();
        self.productions.push(prod);
    }

    /// A user-relation rule becomes an elaboration asserting its head under
    /// the elaborations node.
    fn translate_elaboration(&mut self, rule: &Rule) {
        let name = self
            .gen
            .fresh(&format!("elaborate*{}", rule.head.relation));
        let mut lowering = self.lowering(&name, ProductionKind::Elaborate);
        lowering.lower_body(&rule.body);
        let el = lowering.el();
        let el_sym = lowering.prod.subject(el).to_string();
        let head = rule.head.clone();
        lowering.assert_relation(&el_sym, &head);
        let prod = lowering.into_production();
        self.productions.push(prod);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classify;
    use crate::parser::{parse_gdl, rule_from_expr};

    fn translate_all(source: &str, config: &CompilerConfig) -> Vec<Production> {
        let rules: Vec<Rule> = parse_gdl(source)
            .unwrap()
            .iter()
            .map(|e| rule_from_expr(e).unwrap())
            .collect();
        let (classified, _) = classify(&rules, config).unwrap();
        let mut gen = NameGenerator::new();
        let mut translator = ImplicationTranslator::new(config, &classified, &mut gen);
        for rule in &classified.implications {
            translator.translate(rule);
        }
        for rule in &classified.elaborations {
            translator.translate(rule);
        }
        translator.finish()
    }

    fn named<'a>(productions: &'a [Production], name: &str) -> &'a Production {
        productions
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| {
                panic!(
                    "no production named '{}' in {:?}",
                    name,
                    productions.iter().map(|p| &p.name).collect::<Vec<_>>()
                )
            })
    }

    #[test]
    fn terminal_rule_yields_halting_and_duplicate_variants() {
        let prods = translate_all(
            "(<= terminal (true (line x))) (goal xplayer 100)",
            &CompilerConfig::default(),
        );
        let real = named(&prods, "elaborate*terminal");
        let dup = named(&prods, "elaborate*terminal*duplicate");
        assert!(real.to_string().contains("(halt)"));
        assert!(real.to_string().contains("-^duplicate-of"));
        assert!(!dup.to_string().contains("(halt)"));
        assert!(dup.to_string().contains("^duplicate-of <duplicateof"));
    }

    #[test]
    fn legal_rule_yields_proposal_and_shared_apply() {
        let source = "
            (<= (legal xplayer (mark ?m ?n)) (true (cell ?m ?n b)))
            (<= (legal xplayer (mark 1 1)) (true (open)))
            (goal xplayer 100)";
        let prods = translate_all(source, &CompilerConfig::default());
        let propose = named(&prods, "propose*mark");
        let text = propose.to_string();
        assert!(text.contains("-^last-move"), "{}", text);
        assert!(text.contains("^operator <o1> +"), "{}", text);
        assert!(text.contains("(<o1> ^name mark)"), "{}", text);
        // Two proposals, one apply.
        assert_eq!(
            prods.iter().filter(|p| p.name.starts_with("propose*mark")).count(),
            2
        );
        assert_eq!(
            prods.iter().filter(|p| p.name.starts_with("apply*mark")).count(),
            1
        );
        let apply = named(&prods, "apply*mark");
        let text = apply.to_string();
        assert!(text.contains("^name mark"), "{}", text);
        assert!(text.contains("(<gs> ^last-move <lm1>)"), "{}", text);
    }

    #[test]
    fn generic_next_rule_gets_one_remover_per_function() {
        let source = "
            (<= (next (control oplayer)) (true (control xplayer)))
            (<= (next (control xplayer)) (true (control oplayer)))
            (goal xplayer 100)";
        let prods = translate_all(source, &CompilerConfig::default());
        assert_eq!(
            prods
                .iter()
                .filter(|p| p.name.starts_with("apply*update-state*control"))
                .count(),
            2
        );
        assert_eq!(
            prods
                .iter()
                .filter(|p| p.name.starts_with("apply*update-state*remove-control"))
                .count(),
            1
        );
        let update = named(&prods, "apply*update-state*control");
        let text = update.to_string();
        assert!(text.contains("^name update-state"), "{}", text);
        assert!(text.contains("(<gs> ^control <control"), "{}", text);
    }

    #[test]
    fn goal_outcome_is_decided_against_the_best_score() {
        let source = "
            (<= (goal xplayer 100) (true (line x)))
            (<= (goal xplayer 0) (true (line o)))";
        let prods = translate_all(source, &CompilerConfig::default());
        let win = named(&prods, "elaborate*goal");
        let lose = named(&prods, "elaborate*goal2");
        assert!(win.to_string().contains("^outcome success"));
        assert!(lose.to_string().contains("^outcome failure"));
        assert!(win.to_string().contains("^terminal true"));
    }

    #[test]
    fn elaboration_asserts_its_head_under_elaborations() {
        let prods = translate_all(
            "(<= (row ?m ?x) (true (cell ?m 1 ?x)) (true (cell ?m 2 ?x)) (true (cell ?m 3 ?x)))
             (goal xplayer 100)",
            &CompilerConfig::default(),
        );
        let row = named(&prods, "elaborate*row");
        let text = row.to_string();
        assert!(text.contains("(<el> ^row <row1>)"), "{}", text);
        assert!(text.contains("(<row1> ^p1 <m>)"), "{}", text);
        assert!(text.contains("(<row1> ^p2 <x>)"), "{}", text);
    }
}

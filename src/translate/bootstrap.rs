//! The bootstrap production: builds the initial game state.
//!
//! `init` payloads and unconditional facts are ground by the time they get
//! here, so they are asserted directly rather than routed through a
//! variable scope. The production fires once, under the `init-game`
//! operator, before the state carries its game name.

use crate::analysis::ClassifiedRules;
use crate::config::CompilerConfig;
use crate::gdl::Term;
use crate::soar::{Production, ProductionKind, Value};

pub fn init_production(classified: &ClassifiedRules, config: &CompilerConfig) -> Production {
    let mut prod = Production::new("apply*init-game", ProductionKind::Apply);
    prod.add_operator_test("init-game");

    prod.add_wme("s", "name", Value::Const(config.game_name.clone()));
    let gs = prod.add_id_wme("s", "gs", "gs");
    let el = prod.add_id_wme("s", "elaborations", "el");

    for term in &classified.inits {
        assert_ground_term(&mut prod, &gs, term);
    }
    for rules in classified.facts.values() {
        for rule in rules {
            let id = prod.add_id_wme(&el, &rule.head.relation, &rule.head.relation);
            assert_ground_args(&mut prod, &id, &rule.head.terms);
        }
    }
    prod
}

fn assert_ground_term(prod: &mut Production, subject: &str, term: &Term) {
    match term {
        Term::Function(name, args) => {
            let id = prod.add_id_wme(subject, name, name);
            assert_ground_args(prod, &id, args);
        }
        Term::Constant(c) => prod.add_wme(subject, c, Value::Const("true".to_string())),
        Term::Variable(_) => {}
    }
}

fn assert_ground_args(prod: &mut Production, subject: &str, args: &[Term]) {
    for (i, arg) in args.iter().enumerate() {
        let attr = format!("p{}", i + 1);
        match arg {
            Term::Function(name, inner) => {
                let id = prod.add_id_wme(subject, &attr, name);
                prod.add_wme(&id, "name", Value::Const(name.clone()));
                assert_ground_args(prod, &id, inner);
            }
            Term::Constant(c) => prod.add_wme(subject, &attr, Value::Const(c.clone())),
            // Facts are ground; a stray variable becomes an unbound symbol
            // and is caught by the engine's loader.
            Term::Variable(v) => prod.add_wme(subject, &attr, Value::Sym(v.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classify;
    use crate::parser::{parse_gdl, rule_from_expr};

    fn bootstrap(source: &str) -> String {
        let rules: Vec<_> = parse_gdl(source)
            .unwrap()
            .iter()
            .map(|e| rule_from_expr(e).unwrap())
            .collect();
        let config = CompilerConfig::default();
        let (classified, _) = classify(&rules, &config).unwrap();
        init_production(&classified, &config).to_string()
    }

    #[test]
    fn asserts_name_state_nodes_inits_and_facts() {
        let text = bootstrap(
            "(init (cell 1 1 b)) (init (control xplayer)) (succ 1 2) (goal xplayer 100)",
        );
        assert!(text.contains("(<o1> ^name init-game)"), "{}", text);
        assert!(text.contains("(<s> ^name game)"), "{}", text);
        assert!(text.contains("(<s> ^gs <gs1>)"), "{}", text);
        assert!(text.contains("(<s> ^elaborations <el1>)"), "{}", text);
        assert!(text.contains("(<gs1> ^cell <cell1>)"), "{}", text);
        assert!(text.contains("(<cell1> ^p3 b)"), "{}", text);
        assert!(text.contains("(<gs1> ^control <control1>)"), "{}", text);
        assert!(text.contains("(<el1> ^succ <succ1>)"), "{}", text);
        assert!(text.contains("(<succ1> ^p1 1)"), "{}", text);
        assert!(text.contains("(<succ1> ^p2 2)"), "{}", text);
    }
}

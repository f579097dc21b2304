//! Fixed auxiliary productions: operator lifecycle housekeeping and the
//! substate link-propagation elaboration.

use crate::config::CompilerConfig;
use crate::soar::{Production, ProductionKind, Value};

pub fn auxiliary_productions(config: &CompilerConfig) -> Vec<Production> {
    vec![
        propose_init_game(),
        propose_update_state(config),
        remove_last_move(config),
        derived_facts(config),
    ]
}

/// Propose initialization on the top state before it carries a name.
fn propose_init_game() -> Production {
    let mut prod = Production::new("propose*init-game", ProductionKind::Propose);
    let state = prod.state();
    prod.add_ground_predicate(state, "superstate", "nil");
    prod.add_condition(state, "name", true);
    let op = prod.add_op_proposal('+');
    prod.add_wme(&op, "name", Value::Const("init-game".to_string()));
    prod
}

/// Propose a state update once a chosen move is waiting.
fn propose_update_state(config: &CompilerConfig) -> Production {
    let mut prod = Production::new("propose*update-state", ProductionKind::Propose);
    let state = prod.state();
    prod.add_ground_predicate(state, "name", &config.game_name);
    let gs = prod.add_condition_as(state, "gs", "gs", false);
    prod.add_condition(gs, "last-move", false);
    let op = prod.add_op_proposal('+');
    prod.add_wme(&op, "name", Value::Const("update-state".to_string()));
    prod
}

/// Consume the chosen move at the end of the update step.
fn remove_last_move(config: &CompilerConfig) -> Production {
    let mut prod = Production::new(
        "apply*update-state*remove-last-move",
        ProductionKind::Apply,
    );
    let state = prod.state();
    prod.add_ground_predicate(state, "name", &config.game_name);
    let gs = prod.add_condition_as(state, "gs", "gs", false);
    prod.add_operator_test("update-state");
    let lm = prod.add_condition(gs, "last-move", false);
    let sym = prod.subject(lm).to_string();
    prod.remove_id_wme("gs", "last-move", &sym);
    prod
}

/// Make lookahead substates look like the game state: share the game-state
/// and elaborations links downward and mark the copy as a duplicate.
fn derived_facts(config: &CompilerConfig) -> Production {
    let mut prod = Production::new("elaborate*derived-facts", ProductionKind::Elaborate);
    let state = prod.state();
    let ss = prod.add_condition(state, "superstate", false);
    prod.add_ground_predicate(ss, "name", &config.game_name);
    let (_, gs) = prod.add_id_predicate(ss, "gs", Some("gs"));
    let (_, el) = prod.add_id_predicate(ss, "elaborations", Some("el"));
    prod.add_wme("s", "name", Value::Const(config.game_name.clone()));
    prod.add_wme("s", "gs", Value::Sym(gs));
    prod.add_wme("s", "elaborations", Value::Sym(el));
    let ss_sym = prod.subject(ss).to_string();
    prod.add_wme("s", "duplicate-of", Value::Sym(ss_sym));
    prod
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts() -> Vec<String> {
        auxiliary_productions(&CompilerConfig::default())
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn init_game_is_proposed_only_on_the_unnamed_top_state() {
        let texts = texts();
        assert!(texts[0].contains("^superstate nil"), "{}", texts[0]);
        assert!(texts[0].contains("-^name <name1>"), "{}", texts[0]);
        assert!(texts[0].contains("^name init-game"), "{}", texts[0]);
    }

    #[test]
    fn update_state_is_proposed_once_a_move_is_waiting() {
        let texts = texts();
        assert!(texts[1].contains("(<gs> ^last-move <lastmove1>)"), "{}", texts[1]);
        assert!(texts[1].contains("(<s> ^operator <o1> +)"), "{}", texts[1]);
    }

    #[test]
    fn last_move_is_consumed_by_the_update() {
        let texts = texts();
        assert!(
            texts[2].contains("(<gs> ^last-move <lastmove1> -)"),
            "{}",
            texts[2]
        );
    }

    #[test]
    fn substates_inherit_the_game_links_and_a_duplicate_marker() {
        let texts = texts();
        assert!(texts[3].contains("^superstate <superstate1>"), "{}", texts[3]);
        assert!(texts[3].contains("(<s> ^gs <gs>)"), "{}", texts[3]);
        assert!(
            texts[3].contains("(<s> ^duplicate-of <superstate1>)"),
            "{}",
            texts[3]
        );
    }
}

//! Frame-axiom compilation: standardization, merging, and removal-rule
//! synthesis.
//!
//! Working memory persists until explicitly removed, so a fact carried
//! forward by frame axioms must be retracted once no axiom justifies it any
//! longer. Frame axioms with structurally identical heads merge into
//! one [`FrameRecord`]; a fact is then unjustified when every merged body
//! has at least one falsified literal, which the synthesizer enumerates as
//! a cross product of "pick one literal per body" choices, one removal
//! production per combination.

use crate::analysis::{ClassifiedRules, RemovalStrategy};
use crate::config::CompilerConfig;
use crate::error::Warning;
use crate::gdl::{Builtin, Rule, Sentence, Term};
use crate::soar::{Production, ProductionKind};
use crate::symbols::NameGenerator;
use indexmap::{IndexMap, IndexSet};

use super::body::RuleLowering;

const FRAME_VAR_PREFIX: &str = "fv";

/// A group of merged frame axioms: one standardized head, the alternative
/// bodies justifying retention, and the head-variable distinctness matrix
/// that was part of the merge key.
#[derive(Debug)]
pub struct FrameRecord {
    pub head: Sentence,
    pub bodies: Vec<Vec<Sentence>>,
    pub matrix: Vec<Vec<bool>>,
}

/// Rename head variables positionally to `fv1..fvn`, propagate the
/// substitution into the body, and drop the persistence literal (the head's
/// `true` analogue) from the body.
fn standardize(rule: &Rule, warnings: &mut Vec<Warning>) -> (Sentence, Vec<Sentence>) {
    let mut map = IndexMap::new();
    if let Term::Function(_, args) = &rule.head.terms[0] {
        for (i, arg) in args.iter().enumerate() {
            match arg {
                Term::Variable(v) => {
                    map.entry(v.clone())
                        .or_insert_with(|| format!("{}{}", FRAME_VAR_PREFIX, i + 1));
                }
                Term::Function(_, _) => warnings.push(Warning::EmbeddedFunctionUnsupported {
                    head: rule.head.to_string(),
                }),
                Term::Constant(_) => {}
            }
        }
    }
    let head = rule.head.rename_variables(&map);
    let mut body: Vec<Sentence> = rule
        .body
        .iter()
        .map(|s| s.rename_variables(&map))
        .collect();
    if let Some(analogue) = head.true_analogue() {
        if let Some(pos) = body.iter().position(|s| *s == analogue) {
            body.remove(pos);
        }
    }
    (head, body)
}

fn fv_index(name: &str, n: usize) -> Option<usize> {
    let rest = name.strip_prefix(FRAME_VAR_PREFIX)?;
    let idx: usize = rest.parse().ok()?;
    if (1..=n).contains(&idx) {
        Some(idx - 1)
    } else {
        None
    }
}

/// `M[i][j]` iff the body asserts `distinct` between head positions i and j.
fn distinctness_matrix(head: &Sentence, body: &[Sentence]) -> Vec<Vec<bool>> {
    let n = match &head.terms[0] {
        Term::Function(_, args) => args.len(),
        _ => 0,
    };
    let mut matrix = vec![vec![false; n]; n];
    for sent in body {
        if sent.builtin() != Some(Builtin::Distinct) || sent.negated {
            continue;
        }
        if let (Term::Variable(a), Term::Variable(b)) = (&sent.terms[0], &sent.terms[1]) {
            if let (Some(i), Some(j)) = (fv_index(a, n), fv_index(b, n)) {
                matrix[i][j] = true;
                matrix[j][i] = true;
            }
        }
    }
    matrix
}

/// Standardize every frame axiom and merge the ones whose heads and
/// distinctness matrices are identical.
pub fn build_frame_records(axioms: &[Rule]) -> (Vec<FrameRecord>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut records: IndexMap<String, FrameRecord> = IndexMap::new();
    for rule in axioms {
        let (head, body) = standardize(rule, &mut warnings);
        let matrix = distinctness_matrix(&head, &body);
        let key = format!("{} {:?}", head, matrix);
        match records.get_mut(&key) {
            Some(record) => record.bodies.push(body),
            None => {
                records.insert(
                    key,
                    FrameRecord {
                        head,
                        bodies: vec![body],
                        matrix,
                    },
                );
            }
        }
    }
    (records.into_values().collect(), warnings)
}

/// Emit removal productions for every record whose function constant was
/// assigned the frame strategy. A record with a body that has no
/// falsifiable literal justifies the fact unconditionally, so it produces
/// no removals at all.
pub fn synthesize_removals(
    records: &[FrameRecord],
    classified: &ClassifiedRules,
    config: &CompilerConfig,
    gen: &mut NameGenerator,
) -> Vec<Production> {
    let mut productions = Vec::new();
    for record in records {
        let (fname, head_args) = match &record.head.terms[0] {
            Term::Function(name, args) => (name.clone(), args.clone()),
            _ => continue,
        };
        if classified.strategies.get(&fname) != Some(&RemovalStrategy::Frame) {
            continue;
        }

        let mut head_vars = Vec::new();
        for arg in &head_args {
            arg.collect_variables(&mut head_vars);
        }

        // Mangle each body's non-head variables so literals drawn from
        // different source rules never alias by name.
        let mut pinned: Vec<String> = head_vars.clone();
        let mut bodies: Vec<Vec<Sentence>> = Vec::with_capacity(record.bodies.len());
        for body in &record.bodies {
            let mut vars = Vec::new();
            for sent in body {
                sent.collect_variables(&mut vars);
            }
            let mut map = IndexMap::new();
            for v in vars {
                if head_vars.contains(&v) {
                    continue;
                }
                let fresh = gen.fresh(&v);
                pinned.push(fresh.clone());
                map.insert(v, fresh);
            }
            bodies.push(body.iter().map(|s| s.rename_variables(&map)).collect());
        }

        // Role literals only ground a variable; they are not falsifiable,
        // so they constrain every combination instead of joining the pick
        // domain.
        let roles: Vec<Sentence> = bodies
            .iter()
            .flatten()
            .filter(|s| s.builtin() == Some(Builtin::Role))
            .cloned()
            .collect();
        let choices: Vec<Vec<&Sentence>> = bodies
            .iter()
            .map(|body| {
                body.iter()
                    .filter(|s| s.builtin() != Some(Builtin::Role))
                    .collect()
            })
            .collect();
        if choices.iter().any(|c| c.is_empty()) {
            continue;
        }

        let counts: Vec<usize> = choices.iter().map(|c| c.len()).collect();
        let mut idx = vec![0usize; counts.len()];
        loop {
            let mut seen = IndexSet::new();
            let mut constraints = roles.clone();
            let mut block: Vec<Sentence> = Vec::new();
            for (b, &i) in idx.iter().enumerate() {
                let lit = choices[b][i];
                if !seen.insert(lit.to_string()) {
                    continue;
                }
                if lit.builtin() == Some(Builtin::Distinct) {
                    constraints.push(lit.clone());
                } else {
                    block.push(lit.clone());
                }
            }
            productions.push(removal_production(
                &fname,
                &head_args,
                &block,
                &constraints,
                &pinned,
                classified,
                config,
                gen,
            ));

            let mut exhausted = true;
            let mut k = counts.len();
            while k > 0 {
                k -= 1;
                idx[k] += 1;
                if idx[k] < counts[k] {
                    exhausted = false;
                    break;
                }
                idx[k] = 0;
            }
            if exhausted {
                break;
            }
        }
    }
    productions
}

/// One removal production: the fact currently holds, the chosen block fails
/// as one grouped unit, and the `distinct` constraints extracted from this
/// combination hold directly at their bind sites.
#[allow(clippy::too_many_arguments)]
fn removal_production(
    fname: &str,
    head_args: &[Term],
    block: &[Sentence],
    constraints: &[Sentence],
    pinned: &[String],
    classified: &ClassifiedRules,
    config: &CompilerConfig,
    gen: &mut NameGenerator,
) -> Production {
    let name = gen.fresh(&format!("apply*update-state*remove-{}", fname));
    let mut lowering = RuleLowering::new(
        &name,
        ProductionKind::Apply,
        &config.game_name,
        classified.role.as_deref(),
        gen,
    );
    for sym in pinned {
        lowering.vars.pin(sym, sym);
    }
    lowering.prescan(constraints);
    lowering.operator_test("update-state");
    let gs = lowering.gs();
    lowering.ensure_parents(block);
    let fact = lowering.prod.add_condition(gs, fname, false);
    lowering.lower_args(fact, head_args);
    let fact_sym = lowering.prod.subject(fact).to_string();

    // The chosen set is a conjunction of justification fragments; removal
    // requires the whole block to fail together, not each literal
    // independently. A combination made up entirely of extracted
    // inequalities has nothing left to negate.
    if !block.is_empty() {
        lowering.prod.begin_negative_conjunction();
        for lit in block {
            lowering.lower_literal(lit);
        }
        lowering.prod.end_negative_conjunction();
    }

    lowering.prod.remove_id_wme("gs", fname, &fact_sym);
    lowering.into_production()
}

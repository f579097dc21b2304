use super::or_split;
use crate::parser::sexp::parse_exprs;
use crate::symbols::NameGenerator;
use proptest::prelude::*;

proptest! {
    #[test]
    fn flat_disjunction_yields_one_rule_per_disjunct(n in 1usize..12) {
        let disjuncts: Vec<String> = (0..n).map(|i| format!("(p{} ?x)", i)).collect();
        let source = format!("(<= (w ?x) (or {}))", disjuncts.join(" "));
        let expr = parse_exprs(&source).unwrap().remove(0);
        let rules = or_split::expand(&expr, 64).unwrap();
        prop_assert_eq!(rules.len(), n);
    }

    #[test]
    fn two_disjunctions_multiply(a in 1usize..6, b in 1usize..6) {
        let left: Vec<String> = (0..a).map(|i| format!("(l{} ?x)", i)).collect();
        let right: Vec<String> = (0..b).map(|i| format!("(r{} ?x)", i)).collect();
        let source = format!(
            "(<= (w ?x) (or {}) (or {}))",
            left.join(" "),
            right.join(" ")
        );
        let expr = parse_exprs(&source).unwrap().remove(0);
        let rules = or_split::expand(&expr, 64).unwrap();
        prop_assert_eq!(rules.len(), a * b);
    }

    #[test]
    fn generated_names_are_unique(seeds in proptest::collection::vec("[a-z]{1,4}[0-9]{0,2}", 1..40)) {
        let mut gen = NameGenerator::new();
        let names: Vec<String> = seeds.iter().map(|s| gen.fresh(s)).collect();
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), names.len());
    }
}

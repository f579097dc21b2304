//! Fresh-name allocation for one compilation run.
//!
//! Every symbol that reaches the output (Soar variables, production names)
//! is drawn from a [`NameGenerator`] so that no name is ever issued twice
//! within a run. Allocation is a monotone counter per seed with no other
//! entropy source, which is what makes repeated compilations of the same
//! input byte-identical.

use indexmap::{IndexMap, IndexSet};

/// Run-scoped unique name allocator.
///
/// The first request for a seed returns the seed itself; later requests get
/// a numeric suffix. A candidate that happens to collide with a name already
/// issued under a different seed is skipped.
#[derive(Debug, Default)]
pub struct NameGenerator {
    counters: IndexMap<String, u32>,
    issued: IndexSet<String>,
}

impl NameGenerator {
    pub fn new() -> Self {
        NameGenerator::default()
    }

    /// Allocate a fresh name seeded with `seed` for readability.
    pub fn fresh(&mut self, seed: &str) -> String {
        let mut n = self.counters.get(seed).copied().unwrap_or(0);
        loop {
            n += 1;
            let candidate = if n == 1 {
                seed.to_string()
            } else {
                format!("{}{}", seed, n)
            };
            if self.issued.insert(candidate.clone()) {
                self.counters.insert(seed.to_string(), n);
                return candidate;
            }
        }
    }
}

/// Mapping from GDL variable names to target symbols, scoped to one rule or
/// one merged frame group. Sharing a map across unrelated rules would
/// silently alias their variables, so callers create one per translation.
#[derive(Debug, Default)]
pub struct VariableMap {
    map: IndexMap<String, String>,
}

impl VariableMap {
    pub fn new() -> Self {
        VariableMap::default()
    }

    /// Return the cached symbol for `gdl_name`, allocating one from the
    /// generator on first sight.
    pub fn get(&mut self, gen: &mut NameGenerator, gdl_name: &str) -> String {
        if let Some(sym) = self.map.get(gdl_name) {
            return sym.clone();
        }
        let sym = gen.fresh(gdl_name);
        self.map.insert(gdl_name.to_string(), sym.clone());
        sym
    }

    /// Pin a GDL name to a fixed symbol without consulting the generator.
    /// Used for standardized frame variables, whose names are part of the
    /// merge key and must not be re-allocated.
    pub fn pin(&mut self, gdl_name: &str, sym: &str) {
        self.map.insert(gdl_name.to_string(), sym.to_string());
    }

    /// Whether a GDL name has been mapped in this scope.
    pub fn contains(&self, gdl_name: &str) -> bool {
        self.map.contains_key(gdl_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_returns_seed() {
        let mut gen = NameGenerator::new();
        assert_eq!(gen.fresh("m"), "m");
        assert_eq!(gen.fresh("m"), "m2");
        assert_eq!(gen.fresh("m"), "m3");
    }

    #[test]
    fn collision_with_foreign_seed_is_skipped() {
        let mut gen = NameGenerator::new();
        assert_eq!(gen.fresh("m2"), "m2");
        assert_eq!(gen.fresh("m"), "m");
        // "m2" is taken, so the second "m" jumps to "m3".
        assert_eq!(gen.fresh("m"), "m3");
    }

    #[test]
    fn variable_map_caches_per_scope() {
        let mut gen = NameGenerator::new();
        let mut a = VariableMap::new();
        let mut b = VariableMap::new();
        assert_eq!(a.get(&mut gen, "x"), "x");
        assert_eq!(a.get(&mut gen, "x"), "x");
        // A fresh scope for the same GDL name gets a distinct symbol.
        assert_eq!(b.get(&mut gen, "x"), "x2");
    }

    #[test]
    fn determinism_across_runs() {
        let run = || {
            let mut gen = NameGenerator::new();
            let seeds = ["x", "y", "x", "cell", "x2", "x"];
            seeds.iter().map(|s| gen.fresh(s)).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}

//! JSON summary of a compilation run, for tooling that wants structure
//! rather than the serialized production text.

use crate::config::CompilerConfig;
use crate::soar::ProductionKind;
use crate::translate::CompileOutput;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProductionSummary {
    pub name: String,
    pub kind: ProductionKind,
}

#[derive(Debug, Serialize)]
pub struct TranslationReport {
    pub game: String,
    pub production_count: usize,
    pub productions: Vec<ProductionSummary>,
    pub warnings: Vec<String>,
}

pub fn report(output: &CompileOutput, config: &CompilerConfig) -> TranslationReport {
    TranslationReport {
        game: config.game_name.clone(),
        production_count: output.productions.len(),
        productions: output
            .productions
            .iter()
            .map(|p| ProductionSummary {
                name: p.name.clone(),
                kind: p.kind,
            })
            .collect(),
        warnings: output.warnings.iter().map(|w| w.to_string()).collect(),
    }
}

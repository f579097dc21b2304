//! Translation pipeline: or-split, classify, translate each bucket,
//! synthesize bootstrap and frame removals, append the fixed auxiliary
//! productions, and serialize.

pub mod body;
pub mod bootstrap;
pub mod frames;
pub mod implications;
pub mod support;

use crate::analysis::{self, or_split};
use crate::config::CompilerConfig;
use crate::error::{TranslationError, Warning};
use crate::parser::{self, Expr};
use crate::soar::Production;
use crate::symbols::NameGenerator;

use implications::ImplicationTranslator;

/// Result of one compilation run.
pub struct CompileOutput {
    /// Every production, in generation order.
    pub productions: Vec<Production>,
    /// Serialized output: the configured preamble followed by the
    /// productions.
    pub text: String,
    /// Non-fatal conditions observed along the way.
    pub warnings: Vec<Warning>,
}

/// Compile a game description from source text.
pub fn compile(source: &str, config: &CompilerConfig) -> Result<CompileOutput, TranslationError> {
    let exprs = parser::parse_gdl(source)?;
    compile_exprs(&exprs, config)
}

/// Compile already-parsed top-level expressions.
pub fn compile_exprs(
    exprs: &[Expr],
    config: &CompilerConfig,
) -> Result<CompileOutput, TranslationError> {
    let mut rules = Vec::new();
    for expr in exprs {
        for flat in or_split::expand(expr, config.max_or_passes)? {
            rules.push(parser::rule_from_expr(&flat)?);
        }
    }
    let (classified, mut warnings) = analysis::classify(&rules, config)?;

    let mut gen = NameGenerator::new();
    let mut productions = Vec::new();

    let mut translator = ImplicationTranslator::new(config, &classified, &mut gen);
    for rule in &classified.implications {
        translator.translate(rule);
    }
    for rule in &classified.elaborations {
        translator.translate(rule);
    }
    productions.extend(translator.finish());

    productions.push(bootstrap::init_production(&classified, config));

    let (records, mut frame_warnings) = frames::build_frame_records(&classified.frame_axioms);
    warnings.append(&mut frame_warnings);
    productions.extend(frames::synthesize_removals(
        &records,
        &classified,
        config,
        &mut gen,
    ));

    productions.extend(support::auxiliary_productions(config));

    let mut text = String::from(config.preamble.text());
    for prod in &productions {
        text.push('\n');
        text.push_str(&prod.to_string());
        text.push('\n');
    }

    Ok(CompileOutput {
        productions,
        text,
        warnings,
    })
}

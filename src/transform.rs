use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_ast_visit::VisitMut;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use serde::Serialize;
use tracing::debug;

use crate::cache::GlobalsCache;
use crate::directives::{comment_texts, Directives};
use crate::error::{Result, RewriteError};
use crate::globals::{build_unit_globals, GlobalSet};
use crate::options::RewriteOptions;
use crate::renamer::{ImplicitReceiverRenamer, RewriteStats};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutput {
    pub code: String,
    /// Environments that contributed globals, in the order they were merged.
    pub environments: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: RewriteStats,
}

/// Result of rewriting a tree the caller already owns.
#[derive(Debug, Clone, Default)]
pub struct ProgramRewrite {
    /// `(start, end, text)` edits against the program's source text.
    pub replacements: Vec<(u32, u32, String)>,
    pub stats: RewriteStats,
    pub semantic_errors: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Rewrites one compilation unit using the process-wide globals cache.
pub fn rewrite_source(
    source: &str,
    file_name: &str,
    options: &RewriteOptions,
) -> Result<RewriteOutput> {
    rewrite_source_with_cache(source, file_name, options, GlobalsCache::shared())
}

pub fn rewrite_source_with_cache(
    source: &str,
    file_name: &str,
    options: &RewriteOptions,
    cache: &GlobalsCache,
) -> Result<RewriteOutput> {
    options.validate()?;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, options.source_type.source_type()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(RewriteError::Parse {
            file: file_name.to_string(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }
    let mut program = ret.program;

    // The registry must be complete before the tree is touched.
    let directives = Directives::from_comments(&comment_texts(&program));
    let unit = build_unit_globals(&directives, options, cache)?;

    let rewrite = rewrite_program(&allocator, &mut program, &unit.globals, options);
    let code = apply_replacements(source, rewrite.replacements);

    let mut warnings = unit.warnings;
    warnings.extend(rewrite.semantic_errors);

    debug!(
        file = file_name,
        environments = ?unit.environments,
        globals = unit.globals.len(),
        rewritten = rewrite.stats.rewritten(),
        "rewrote unit"
    );

    Ok(RewriteOutput {
        code,
        environments: unit.environments,
        warnings,
        stats: rewrite.stats,
    })
}

/// Runs the rewrite pass over an already parsed program.
///
/// Scopes are rebuilt from `program`, so the tree must not have been mutated
/// since parsing in ways that change bindings.
pub fn rewrite_program<'a>(
    allocator: &'a Allocator,
    program: &mut Program<'a>,
    globals: &GlobalSet,
    options: &RewriteOptions,
) -> ProgramRewrite {
    let semantic = SemanticBuilder::new().build(program);
    let semantic_errors = semantic.errors.iter().map(|e| e.to_string()).collect();
    let scoping = semantic.semantic.into_scoping();

    let mut renamer = ImplicitReceiverRenamer::new(
        allocator,
        &scoping,
        globals,
        &options.receiver,
        options.assignment_targets,
    );
    renamer.visit_program(program);

    ProgramRewrite {
        replacements: renamer.replacements,
        stats: renamer.stats,
        semantic_errors,
    }
}

/// Splices edits into `source`. Edits must not overlap.
pub fn apply_replacements(source: &str, mut replacements: Vec<(u32, u32, String)>) -> String {
    // Back to front so earlier offsets stay valid.
    replacements.sort_by(|a, b| b.0.cmp(&a.0));

    let mut result = source.to_string();
    for (start, end, replacement) in replacements {
        result.replace_range((start as usize)..(end as usize), &replacement);
    }
    result
}

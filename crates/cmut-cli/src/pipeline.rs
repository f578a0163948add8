//! Mutation pipeline: parse → walk → plan → patch.
//!
//! Each stage consumes the complete output of the previous one. Nothing is
//! written here; the caller emits the outcome only after every stage
//! succeeded.

use std::path::Path;

use anyhow::Context;
use cmut_config::CmutConfig;
use cmut_core::ScopeTree;
use cmut_parser::{Frontend, WalkStats, walk};
use cmut_rewrite::{ApplyReport, RewriteContext, RewriteOutcome, plan};

use crate::bootstrap::frontend_options;

/// Everything one run produced.
#[derive(Debug)]
pub struct Mutation {
    pub tree: ScopeTree,
    pub stats: WalkStats,
    pub planned: usize,
    pub report: ApplyReport,
    pub outcome: RewriteOutcome,
}

/// Run every stage on `input`.
pub fn mutate_file(input: &Path, config: &CmutConfig) -> anyhow::Result<Mutation> {
    let frontend =
        Frontend::new(frontend_options(config)).context("failed to initialize C front end")?;
    let unit = frontend
        .parse_file(input)
        .with_context(|| format!("failed to parse {}", input.display()))?;

    let collected = walk(&unit, config.mutate.retention());
    let edits = plan(&collected.tree, &config.mutate.planner_options())
        .with_context(|| format!("failed to plan edits for {}", input.display()))?;

    let mut ctx = RewriteContext::new();
    ctx.initialize(&unit)?;
    let report = ctx.apply(&edits)?;
    let outcome = ctx.finish()?;

    tracing::debug!(
        file = %input.display(),
        declarators = collected.stats.declarators,
        retained = collected.stats.retained,
        planned = edits.len(),
        applied = report.applied,
        dropped = report.dropped,
        "mutation finished"
    );

    Ok(Mutation {
        tree: collected.tree,
        stats: collected.stats,
        planned: edits.len(),
        report,
        outcome,
    })
}

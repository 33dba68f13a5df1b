//! Prune command - apply the keep-last-N policy to the cache

use crate::cache::{evaluate, Evaluation, Executor, Inventory, KeepPolicy, Mode, Report};
use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::PruneResult;
use crate::oracle::{PackageOracle, ProtectedSet, XbpsQuery};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::PathBuf;
use tracing::debug;

/// Fully resolved options for one prune run
#[derive(Debug, Clone)]
pub struct PruneOptions {
    pub keep: KeepPolicy,
    pub mode: Mode,
    pub cache_dir: PathBuf,
    pub format: OutputFormat,
}

impl PruneOptions {
    /// Combine command-line values with the loaded configuration
    ///
    /// An explicit cache directory wins over `cache.dir`.
    pub fn new(
        keep: KeepPolicy,
        apply: bool,
        cache_dir: Option<PathBuf>,
        format: OutputFormat,
        config: &Config,
    ) -> Self {
        Self {
            keep,
            mode: Mode::from_apply(apply),
            cache_dir: cache_dir.unwrap_or_else(|| config.cache.dir.clone()),
            format,
        }
    }
}

/// Execute the prune command
pub async fn execute(options: PruneOptions, config: &Config) -> PruneResult<()> {
    let oracle = XbpsQuery::new(&config.query, &options.cache_dir);
    let ctx = UiContext::detect();
    if ctx.use_fancy_output() {
        ui::init_theme(options.mode);
    }
    let report = run(&ctx, &options, &oracle, config.query.parallelism).await?;

    if options.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// Scan, resolve protection, evaluate and execute against one oracle
pub async fn run(
    ctx: &UiContext,
    options: &PruneOptions,
    oracle: &dyn PackageOracle,
    parallelism: usize,
) -> PruneResult<Report> {
    let text = options.format == OutputFormat::Text;
    debug!(
        "Pruning {} (keep {}, {})",
        options.cache_dir.display(),
        options.keep,
        options.mode
    );

    let inventory = Inventory::scan(&options.cache_dir)?;
    let protected = resolve_protected(ctx, oracle, parallelism, text).await?;
    let evaluation = evaluate(&inventory, &protected, options.keep);

    if text {
        print_plan(ctx, &inventory, &evaluation, options.mode);
    }

    let executor = Executor::new(inventory.dir());
    let report = executor.execute(evaluation.candidates(), options.mode, |file| {
        if text {
            ui::list_item(ctx, file);
        }
    })?;

    if text {
        print_summary(ctx, &report);
    }
    Ok(report)
}

async fn resolve_protected(
    ctx: &UiContext,
    oracle: &dyn PackageOracle,
    parallelism: usize,
    show_progress: bool,
) -> PruneResult<ProtectedSet> {
    if !show_progress {
        return ProtectedSet::resolve(oracle, parallelism).await;
    }

    let mut spinner = TaskSpinner::new(ctx);
    spinner.start("Querying held packages...");

    match ProtectedSet::resolve(oracle, parallelism).await {
        Ok(protected) => {
            spinner.stop(&format!(
                "{} protected package(s) ({} held, {} dependencies)",
                protected.len(),
                protected.held().len(),
                protected.dependencies().len()
            ));
            Ok(protected)
        }
        Err(e) => {
            spinner.stop_error("Package query failed");
            Err(e)
        }
    }
}

fn print_plan(ctx: &UiContext, inventory: &Inventory, evaluation: &Evaluation<'_>, mode: Mode) {
    let packages = evaluation.pruned().count();
    ui::key_value(ctx, "Cache", &inventory.dir().display().to_string());
    ui::key_value(
        ctx,
        "Archives",
        &format!(
            "{} from {} package(s)",
            inventory.archives().len(),
            inventory.package_keys().len()
        ),
    );
    ui::key_value(
        ctx,
        "Candidates",
        &format!(
            "{} archive(s) from {} package(s)",
            evaluation.candidate_count(),
            packages
        ),
    );

    if evaluation.candidate_count() == 0 {
        return;
    }

    match mode {
        Mode::DryRun => ui::section(ctx, "Deletion candidates"),
        Mode::Apply => ui::section(ctx, "Deletion list"),
    }
}

fn print_summary(ctx: &UiContext, report: &Report) {
    let size = ui::human_bytes(report.bytes);

    match report.mode {
        Mode::DryRun => {
            if !report.orphans_pending.is_empty() {
                ui::step_info(
                    ctx,
                    &format!(
                        "{} orphan signature(s) would be removed",
                        report.orphans_pending.len()
                    ),
                );
            }
            ui::outro_warn(ctx, "No files were deleted (dry run)");
            ui::remark(ctx, &format!("Potentially {} could be freed", size));
        }
        Mode::Apply => {
            ui::step_ok(
                ctx,
                &format!(
                    "{} orphan signature(s) removed",
                    report.orphan_signatures_removed
                ),
            );
            ui::outro_success(
                ctx,
                &format!("Removed {} file(s), {} freed", report.files.len(), size),
            );
        }
    }
}

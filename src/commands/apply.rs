//! `tempfetch apply` - converge a manifest

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{ConfirmCallback, ExecuteOptions, ExecuteSummary, compute_diffs, execute};

use super::Session;
use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::build_plan;
use crate::engine::differ::display_diff;
use crate::progress::BarProgress;
use crate::ui;

/// Asks on the terminal unless `--yes` was given.
struct PromptConfirm {
    assume_yes: bool,
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let session = Session::load(&args.manifest)?;
    if session.catalog.is_empty() {
        ui::warn("Manifest declares no resources");
        return Ok(());
    }
    let plan = build_plan(&session.catalog, &session.run);

    if !ctx.quiet {
        display_diff(&compute_diffs(&plan.resources));
    }

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: args.jobs.unwrap_or_else(|| session.settings.jobs()).max(1),
        verbose: ctx.verbose > 0,
    };

    let mut progress = BarProgress::new(plan.total_resources(), ctx.verbose > 0, ctx.quiet);
    let mut confirm = PromptConfirm {
        assume_yes: args.yes,
    };

    println!();
    let summary = execute(plan, opts.clone(), &mut progress, &mut confirm)?;
    progress.finish();

    log::debug!(
        "Paths fetched this run: {:?}",
        session.run.tracked.snapshot()
    );

    if opts.dry_run {
        ui::info("Dry run - no changes made");
        return Ok(());
    }

    print_summary(&summary);

    if !summary.is_success() {
        bail!("{} resource(s) failed", summary.failed);
    }
    Ok(())
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Manifest applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Manifest applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} resources modified", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} resources removed", summary.removed);
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    if summary.no_change > 0 {
        println!("    • {} resources unchanged", summary.no_change);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

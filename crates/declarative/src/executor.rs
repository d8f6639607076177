//! Execution engine - applies resources in dependency order

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::compute_diffs;
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;
use rayon::prelude::*;
use std::collections::HashSet;

/// Execute a plan with the given options and callbacks
///
/// Resources are applied level by level (see [`ExecutionPlan::levels`]),
/// so a resource never runs before the resources it depends on. When a
/// resource fails, everything that depends on it, directly or through
/// other resources, is skipped.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, jobs, verbose)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback
///
/// # Returns
/// Summary of execution results
pub fn execute<P, C>(
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let levels = plan.levels()?;

    // Compute diffs for reporting
    let diffs = compute_diffs(&plan.resources);

    if diffs.is_empty() {
        return Ok(ExecuteSummary {
            no_change: plan.total_resources(),
            ..Default::default()
        });
    }

    // Confirm before proceeding (unless dry_run)
    if !opts.dry_run && !confirm.confirm("Apply changes?")? {
        return Ok(ExecuteSummary {
            skipped: diffs.len(),
            ..Default::default()
        });
    }

    if opts.dry_run {
        return Ok(ExecuteSummary::default());
    }

    let pool = if opts.jobs > 1 {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(opts.jobs)
                .build()
                .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?,
        )
    } else {
        None
    };

    let mut summary = ExecuteSummary::default();
    let mut blocked: HashSet<String> = HashSet::new();

    for (n, level) in levels.iter().enumerate() {
        progress.on_level_start(n, level.len());

        let mut runnable = Vec::with_capacity(level.len());
        for &i in level {
            let resource = plan.resources[i].as_ref();
            if let Some(dep) = resource
                .depends_on()
                .into_iter()
                .find(|d| blocked.contains(d))
            {
                let result = ApplyResult::Skipped {
                    reason: format!("dependency failed: {dep}"),
                };
                log::warn!("Skipping {}: dependency {} failed", resource.id(), dep);
                blocked.insert(resource.id());
                progress.on_resource_complete(&resource.id(), &result);
                summary.add_result(&result);
            } else {
                runnable.push(resource);
            }
        }

        let results = match &pool {
            Some(pool) if runnable.len() > 1 => {
                execute_parallel(pool, &runnable, opts.verbose, progress)
            }
            _ => execute_sequential(&runnable, opts.verbose, progress),
        };

        for (id, result) in results {
            if !result.is_success() {
                blocked.insert(id);
            }
            summary.add_result(&result);
        }

        progress.on_level_complete();
    }

    Ok(summary)
}

/// Apply resources one at a time, reporting progress as each completes
fn execute_sequential<P: ProgressCallback>(
    resources: &[&dyn Resource],
    verbose: bool,
    progress: &mut P,
) -> Vec<(String, ApplyResult)> {
    let mut results = Vec::with_capacity(resources.len());
    for resource in resources {
        progress.on_resource_start(&resource.id(), &resource.description());
        let result = apply_resource(*resource, verbose);
        progress.on_resource_complete(&resource.id(), &result);
        results.push((resource.id(), result));
    }
    results
}

/// Apply one dependency level on the rayon pool
///
/// Resources that opt out of parallelism run afterwards, sequentially.
fn execute_parallel<P: ProgressCallback>(
    pool: &rayon::ThreadPool,
    resources: &[&dyn Resource],
    verbose: bool,
    progress: &mut P,
) -> Vec<(String, ApplyResult)> {
    let (parallel, serial): (Vec<&dyn Resource>, Vec<&dyn Resource>) =
        resources.iter().copied().partition(|r| r.can_parallelize());

    // The progress callback is not thread-safe, so results are
    // collected first and reported afterwards.
    let mut results: Vec<(String, ApplyResult)> = pool.install(|| {
        parallel
            .par_iter()
            .map(|resource| (resource.id(), apply_resource(*resource, verbose)))
            .collect()
    });

    for (id, result) in &results {
        progress.on_resource_complete(id, result);
    }

    results.extend(execute_sequential(&serial, verbose, progress));
    results
}

/// Apply a single resource
fn apply_resource(resource: &dyn Resource, verbose: bool) -> ApplyResult {
    match resource.needs_apply() {
        Ok(false) => return ApplyResult::NoChange,
        Ok(true) => {}
        Err(e) => {
            return ApplyResult::Failed {
                error: format!("{e:#}"),
            };
        }
    }

    let mut ctx = ApplyContext::new(false, verbose);

    match resource.apply(&mut ctx) {
        Ok(result) => result,
        Err(e) => {
            log::error!("{} failed: {e:#}", resource.id());
            ApplyResult::Failed {
                error: format!("{e:#}"),
            }
        }
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: ExecutionPlan, opts: ExecuteOptions) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}

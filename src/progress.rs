//! Progress display while a plan is applied.

use declarative::{ApplyResult, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui;

/// Progress bar over all resources of a plan.
///
/// Changes, skips and failures are printed above the bar as they happen;
/// unchanged resources only move the bar unless `verbose` is set. A
/// `hidden` bar prints nothing at all.
pub struct BarProgress {
    bar: ProgressBar,
    verbose: bool,
}

impl BarProgress {
    pub fn new(total: usize, verbose: bool, hidden: bool) -> Self {
        if hidden {
            return Self {
                bar: ProgressBar::hidden(),
                verbose,
            };
        }

        let style = ProgressStyle::default_bar()
            .template("  [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        Self { bar, verbose }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for BarProgress {
    fn on_level_start(&mut self, level: usize, count: usize) {
        log::debug!("Level {} ({count} resources)", level + 1);
    }

    fn on_resource_start(&mut self, id: &str, _description: &str) {
        self.bar.set_message(id.to_string());
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        if self.verbose || !matches!(result, ApplyResult::NoChange) {
            self.bar.println(format!(
                "  {} {id} {}",
                ui::result_symbol(result),
                ui::result_label(result)
            ));
        }
        self.bar.inc(1);
    }

    fn on_level_complete(&mut self) {}
}

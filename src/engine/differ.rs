//! Diff display

use colored::Colorize;
use declarative::{DiffSummary, ResourceDiff, ResourceState};
use std::collections::BTreeMap;

use crate::resource::{PACKAGE, TEMPORARY_FILE, TEMPORARY_FILE_CLEANUP};

/// Display a list of diffs grouped by resource type
pub fn display_diff(diffs: &[ResourceDiff]) {
    if diffs.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    let mut by_type: BTreeMap<&str, Vec<&ResourceDiff>> = BTreeMap::new();
    for diff in diffs {
        by_type
            .entry(diff.resource_type.as_str())
            .or_default()
            .push(diff);
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Pending Changes".bold()
    );
    println!("│");

    for (resource_type, type_diffs) in &by_type {
        println!("│ {}", type_title(resource_type).bold());

        for diff in type_diffs {
            let symbol = if diff.is_addition() {
                "+".green()
            } else if diff.is_removal() {
                "-".red()
            } else {
                "~".yellow()
            };

            println!(
                "│   {} {:<40} {}",
                symbol,
                diff.resource_id,
                state_description(diff).dimmed()
            );
        }
        println!("│");
    }

    let summary = DiffSummary::from_diffs(diffs);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} pending ({} add, {} remove, {} other)",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.removals.to_string().red(),
        summary.modifications.to_string().yellow()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn type_title(resource_type: &str) -> &str {
    match resource_type {
        TEMPORARY_FILE => "Downloads (fetched only if required)",
        TEMPORARY_FILE_CLEANUP => "Cleanups",
        PACKAGE => "Packages",
        other => other,
    }
}

fn state_description(diff: &ResourceDiff) -> String {
    match (&diff.current, &diff.desired) {
        (ResourceState::Absent, ResourceState::Present { details }) => details
            .as_ref()
            .map(|d| format!("→ {d}"))
            .unwrap_or_default(),
        (ResourceState::Present { details }, ResourceState::Absent) => format!(
            "(will remove{})",
            details
                .as_ref()
                .map(|d| format!(" {d}"))
                .unwrap_or_default()
        ),
        (from, to) => format!("{from:?} → {to:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(current: ResourceState, desired: ResourceState) -> ResourceDiff {
        ResourceDiff {
            resource_id: "Temporary_file[jdk]".to_string(),
            resource_type: TEMPORARY_FILE.to_string(),
            description: String::new(),
            current,
            desired,
        }
    }

    #[test]
    fn test_state_description() {
        let add = diff(
            ResourceState::Absent,
            ResourceState::Present {
                details: Some("/tmp/jdk".to_string()),
            },
        );
        assert_eq!(state_description(&add), "→ /tmp/jdk");

        let remove = diff(
            ResourceState::Present {
                details: Some("/tmp/jdk".to_string()),
            },
            ResourceState::Absent,
        );
        assert_eq!(state_description(&remove), "(will remove /tmp/jdk)");
    }

    #[test]
    fn test_type_title() {
        assert_eq!(type_title(PACKAGE), "Packages");
        assert_eq!(type_title("host"), "host");
    }
}

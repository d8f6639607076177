use colored::Colorize;
use declarative::ApplyResult;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Colored status symbol for an apply result
pub fn result_symbol(result: &ApplyResult) -> String {
    let symbol = result.symbol();
    match result {
        ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => {
            symbol.green().to_string()
        }
        ApplyResult::Failed { .. } => symbol.red().to_string(),
        ApplyResult::Skipped { .. } => symbol.yellow().to_string(),
        ApplyResult::NoChange => symbol.dimmed().to_string(),
    }
}

/// One-word description of an apply result
pub fn result_label(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => "unchanged".to_string(),
        ApplyResult::Created => "created".to_string(),
        ApplyResult::Modified => "modified".to_string(),
        ApplyResult::Removed => "removed".to_string(),
        ApplyResult::Failed { error } => format!("failed: {error}"),
        ApplyResult::Skipped { reason } => format!("skipped: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_label() {
        assert_eq!(result_label(&ApplyResult::Created), "created");
        assert_eq!(
            result_label(&ApplyResult::Skipped {
                reason: "not required by any resource".to_string()
            }),
            "skipped: not required by any resource"
        );
    }

    #[test]
    fn test_result_symbol_keeps_glyph() {
        colored::control::set_override(false);
        assert_eq!(result_symbol(&ApplyResult::NoChange), "○");
        assert_eq!(
            result_symbol(&ApplyResult::Failed {
                error: "x".to_string()
            }),
            "✗"
        );
    }
}

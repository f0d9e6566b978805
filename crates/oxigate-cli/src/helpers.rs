//! Shared CLI helpers — banner and status marks.

use colored::Colorize;

/// Print the banner shown when a command starts.
pub fn print_banner(mode: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Oxigate".cyan().bold(), version.dimmed());
    println!("  Mode: {mode}");
    println!();
}

pub fn ok_mark() -> String {
    "✓".green().to_string()
}

pub fn fail_mark() -> String {
    "✗".red().to_string()
}

/// Render a comma-separated list, or a dimmed placeholder when empty.
pub fn list_or_none<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        joined
    }
}

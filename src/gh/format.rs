//! PR title and body formatting.

/// First non-empty line of the description.
pub fn format_pr_title(description: &str) -> String {
    description
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// The full description, trimmed.
pub fn format_pr_body(description: &str) -> String {
    description.trim().to_string()
}

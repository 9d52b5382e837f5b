//! Error panel display.

use super::colors::*;
use crate::error::ShiprError;

const ERROR_PANEL_WIDTH: usize = 64;

/// Print a fatal error: the violated guard, what went wrong, and how to recover.
pub fn print_shipr_error(err: &ShiprError) {
    let remediation = err.remediation();
    print_error_panel(err.kind(), &err.to_string(), remediation.as_deref());
}

/// Print a bordered error panel on stderr.
pub fn print_error_panel(error_type: &str, message: &str, remediation: Option<&str>) {
    for line in render_error_panel(error_type, message, remediation) {
        eprintln!("{}", line);
    }
}

fn render_error_panel(error_type: &str, message: &str, remediation: Option<&str>) -> Vec<String> {
    let top_border = format!("╔{}╗", "═".repeat(ERROR_PANEL_WIDTH - 2));
    let bottom_border = format!("╚{}╝", "═".repeat(ERROR_PANEL_WIDTH - 2));
    let separator = format!("╟{}╢", "─".repeat(ERROR_PANEL_WIDTH - 2));

    let mut lines = vec![format!("{RED}{BOLD}{}{RESET}", top_border)];

    let header = format!(" ERROR: {} ", error_type);
    let header_padding = ERROR_PANEL_WIDTH.saturating_sub(header.chars().count() + 2);
    let left_pad = header_padding / 2;
    let right_pad = header_padding - left_pad;
    lines.push(format!(
        "{RED}{BOLD}║{}{}{}║{RESET}",
        " ".repeat(left_pad),
        header,
        " ".repeat(right_pad)
    ));

    lines.push(format!("{RED}{}{RESET}", separator));
    push_panel_content(&mut lines, "Problem", message);

    if let Some(fix) = remediation {
        lines.push(format!("{RED}{}{RESET}", separator));
        push_panel_content(&mut lines, "To fix", fix);
    }

    lines.push(format!("{RED}{BOLD}{}{RESET}", bottom_border));
    lines
}

fn push_panel_content(lines: &mut Vec<String>, label: &str, content: &str) {
    let max_content_width = ERROR_PANEL_WIDTH - 6;

    lines.push(panel_line(&format!("{}:", label)));

    for line in content.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() <= max_content_width {
            lines.push(panel_line(&format!("  {}", line)));
            continue;
        }

        let mut remaining = &chars[..];
        while !remaining.is_empty() {
            let limit = max_content_width - 2;
            let split = if remaining.len() <= limit {
                remaining.len()
            } else {
                remaining[..limit]
                    .iter()
                    .rposition(|c| c.is_whitespace() || *c == '/' || *c == ':')
                    .map(|i| i + 1)
                    .unwrap_or(limit)
            };
            let chunk: String = remaining[..split].iter().collect();
            lines.push(panel_line(&format!("  {}", chunk)));
            remaining = &remaining[split..];
        }
    }
}

fn panel_line(text: &str) -> String {
    let max_width = ERROR_PANEL_WIDTH - 4;
    let display_text: String = text.chars().take(max_width).collect();
    let padding = max_width.saturating_sub(display_text.chars().count());
    format!(
        "{RED}║{RESET} {}{} {RED}║{RESET}",
        display_text,
        " ".repeat(padding)
    )
}

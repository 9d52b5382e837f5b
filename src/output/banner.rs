//! Flow banner display.

use terminal_size::{terminal_size, Width};

use super::colors::*;

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const MIN_BANNER_WIDTH: usize = 20;
const MAX_BANNER_WIDTH: usize = 80;

/// Color options for banners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BannerColor {
    /// Cyan - new request flow
    Cyan,
    /// Blue - update flow
    Blue,
}

impl BannerColor {
    /// Get the ANSI color code for this banner color.
    pub fn ansi_code(&self) -> &'static str {
        match self {
            BannerColor::Cyan => CYAN,
            BannerColor::Blue => BLUE,
        }
    }
}

fn get_terminal_width_for_banner() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH as usize)
}

/// Render `━━━ LABEL ━━━` sized to the terminal, clamped between MIN and MAX.
fn banner_line(label: &str, width: usize) -> String {
    let banner_width = width.clamp(MIN_BANNER_WIDTH, MAX_BANNER_WIDTH);
    let label = format!(" {} ", label);
    let remaining = banner_width.saturating_sub(label.chars().count());
    let left = remaining / 2;
    let right = remaining - left;
    format!("{}{}{}", "━".repeat(left), label, "━".repeat(right))
}

/// Print a color-coded flow banner on stderr.
pub fn print_flow_banner(label: &str, color: BannerColor) {
    let line = banner_line(label, get_terminal_width_for_banner());
    eprintln!("{}{BOLD}{}{RESET}", color.ansi_code(), line);
}

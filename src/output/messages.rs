//! Basic message output functions.
//!
//! Provides simple warning and info message display on stderr.

use super::colors::*;

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{YELLOW}Warning:{RESET} {}", msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{CYAN}Info:{RESET} {}", msg);
}

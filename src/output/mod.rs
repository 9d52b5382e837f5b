//! Terminal output formatting for shipr.
//!
//! Human-facing output goes to stderr so that stdout stays clean for `--json`.
//! Functions are organized by domain:
//!
//! - [`banner`] - Flow banners
//! - [`messages`] - Warning and info messages
//! - [`pr`] - Pull request and no-op result output
//! - [`error`] - Error panels with kind and remediation
//! - [`reporter`] - [`TerminalReporter`], the live progress view of a run

pub mod banner;
pub mod error;
pub mod messages;
pub mod pr;
pub mod reporter;

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
}

// Re-export colors at module level for convenience
pub use colors::*;

pub use banner::{print_flow_banner, BannerColor};
pub use error::{print_error_panel, print_shipr_error};
pub use messages::{print_info, print_warning};
pub use pr::{print_noop, print_outcome, print_pr_result};
pub use reporter::TerminalReporter;

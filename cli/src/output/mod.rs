//! Output formatting module
//!
//! Progress and diagnostics go to stderr; summaries and tables go to stdout
//! so `--json` output can be piped.

pub mod human;
pub mod json;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stderr is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether results are emitted as JSON.
    pub json: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    ///
    /// JSON mode implies `quiet` for progress lines.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool, json: bool) -> Self {
        let is_tty = Term::stderr().is_term();
        let use_colors = !no_color && is_tty && std::env::var_os("NO_COLOR").is_none();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            is_tty,
            quiet: quiet || json,
            json,
        }
    }

    /// Print a section header to stderr. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg.style(self.styles.header));
        }
    }

    /// Print a detail line to stderr. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {msg}");
        }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `!` to stderr. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "!".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print a key-value pair with the key dimmed to stdout.
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {:<18} {value}", key.style(self.styles.dim));
    }
}

//! `TerminalReporter`, the presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY each `step()` runs a spinner until the next step or `success()`.
/// Otherwise:
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
/// - `output()` prints `"    {line}"`, dimmed
///
/// Everything is suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<(ProgressBar, String)>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }

    fn print_above_spinner(&self, line: &str) {
        match self.spinner.borrow().as_ref() {
            Some((pb, _)) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }

    fn settle(&self) {
        if let Some((pb, message)) = self.spinner.borrow_mut().take() {
            progress::finish_ok(&pb, message.trim_end_matches("..."));
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if self.ctx.show_progress() {
            self.settle();
            *self.spinner.borrow_mut() = Some((progress::spinner(message), message.to_string()));
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if let Some((pb, _)) = self.spinner.borrow_mut().take() {
            progress::finish_ok(&pb, message);
        } else {
            println!("  {} {message}", "✓".style(self.ctx.styles.success));
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        self.print_above_spinner(&format!("  {} {message}", "!".style(self.ctx.styles.warning)));
    }

    fn output(&self, line: &str) {
        if self.ctx.quiet {
            return;
        }
        self.print_above_spinner(&format!("    {}", line.style(self.ctx.styles.dim)));
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some((pb, _)) = self.spinner.get_mut().take() {
            progress::abandon(&pb);
        }
    }
}

//! Handles all user-facing output for the CLI.
//!
//! Diagnostics for build failures go through miette; everything else is printed
//! here with colored headers.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Prints a green `ok:` line to stdout.
pub fn print_success(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(stdout, "ok:");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", message);
}

/// Prints a red `error:` line to stderr.
pub fn print_failure(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error:");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {}", message);
}

//! User-facing progress output.

use std::fmt::Display;
use std::io::Write;

/// Writes one line of progress output, ignoring write failures.
pub fn write_line(out: &mut dyn Write, message: impl Display) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

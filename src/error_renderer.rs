//! Error rendering using ariadne
//!
//! This module renders QBISA errors with source snippets and annotations.
//! Assembly errors point at the offending token; runtime and registry errors
//! have no source location and render as a single line.

use crate::Error;
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<asm>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use qbisa::{ExecutionOptions, render_error, run_assembly};
///
/// let source = "PUSH 1\nFROB\n";
/// if let Err(e) = run_assembly(source, ExecutionOptions::default()) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs and UIs)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
///
/// This is the same as `render_error_to_string` but without ANSI color codes,
/// making the output easier to compare in tests.
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Assemble {
            message,
            src,
            span,
            help,
            ..
        } => {
            let mut colors = ColorGenerator::new();
            colors.next(); // Skip the first color.

            let range = span.offset()..span.offset() + span.len();
            let mut report = Report::build(ReportKind::Error, (SOURCE_ID, range.clone()))
                .with_message(message)
                .with_code(error.code())
                .with_config(ariadne::Config::default().with_color(use_color));

            report = report.with_label(
                Label::new((SOURCE_ID, range))
                    .with_message(message)
                    .with_color(colors.next()),
            );
            if let Some(help) = help {
                report = report.with_help(help);
            }

            report
                .finish()
                .write((SOURCE_ID, Source::from(src.as_str())), &mut *writer)
        }
        Error::Execution(e) => {
            writeln!(writer, "Execution error [{}]: {}", e.code(), e)
        }
        Error::Registry(e) => {
            writeln!(writer, "Registry error [{}]: {}", e.code(), e)
        }
    }
}

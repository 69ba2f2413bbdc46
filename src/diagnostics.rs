use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::report::{ResolutionReport, Warning};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print markdown to stderr, bolding heading lines.
fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    print_markdown(&render_error(e));
}

/// Render a resolution report as markdown and print to stderr.
/// A clean report prints nothing.
pub fn print_report(report: &ResolutionReport) {
    if report.is_clean() {
        return;
    }
    print_markdown(&render_report(report));
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::BatchCorrupt { reason } => format!(
            "\
# Error: Batch Corrupt

{reason}

## Fix

Every document needs a non-empty vault `path`.
"
        ),
        Error::BatchNotFound { path } => format!(
            "\
# Error: Batch Not Found

`{}` does not exist.
",
            path.display()
        ),
        Error::DuplicateDocument { path } => render_duplicate_document(path),
        Error::FileNotFound { path } => format!(
            "\
# Error: File Not Found

`{}` does not exist.
",
            path.display()
        ),
        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),
        Error::Json(e) => format!(
            "\
# Error: Invalid Batch JSON

{e}

## Expected shape

    {{ \"documents\": [ {{ \"path\": \"Notes/A.md\", \"content\": \"...\", \"id\": \"JournalEntry.a\" }} ],
      \"assets\": [ {{ \"relative_path\": \"vault/a.png\", \"data_path\": \"worlds/w/a.png\" }} ] }}
"
        ),
        Error::TomlDe(e) => format!(
            "\
# Error: Invalid TOML

{e}

## Fix

Check `{CONFIG_FILE}`. Allowed keys: `include`, `exclude`, `page_entity_types`.
"
        ),
    };
}

/// Two batch documents claim one vault path.
fn render_duplicate_document(path: &str) -> String {
    return format!(
        "\
# Error: Duplicate Document

`{path}` appears more than once in the batch.

## Fix

Each vault path may appear once. Merge or rename the duplicates.
"
    );
}

/// Render the warnings of a resolution pass, grouped by kind.
pub fn render_report(report: &ResolutionReport) -> String {
    let mut out = format!(
        "\
# Unresolved References

{} resolved links, {} resolved assets, {} warnings.
",
        report.resolved_links,
        report.resolved_assets,
        report.warnings.len()
    );

    render_warning_section(
        &mut out,
        "Unresolved links",
        "No document in the batch has this name. The original text was kept.",
        report.warnings.iter().filter(|w| return matches!(w, Warning::UnresolvedLink { .. })),
    );
    render_warning_section(
        &mut out,
        "Unresolved assets",
        "No uploaded asset matches this path. The original text was kept.",
        report.warnings.iter().filter(|w| return matches!(w, Warning::UnresolvedAsset { .. })),
    );
    render_warning_section(
        &mut out,
        "Unknown identifiers",
        "The target is not in the batch. The link was kept in store syntax.",
        report.warnings.iter().filter(|w| return matches!(w, Warning::UnknownIdentifier { .. })),
    );
    return out;
}

/// Append one `##` section listing warnings; nothing if there are none.
fn render_warning_section<'a>(
    out: &mut String,
    title: &str,
    explanation: &str,
    warnings: impl Iterator<Item = &'a Warning>,
) {
    let mut warnings = warnings.peekable();
    if warnings.peek().is_none() {
        return;
    }
    let _ = write!(out, "\n## {title}\n\n{explanation}\n\n");
    for warning in warnings {
        let _ = writeln!(out, "- {}  `{}`", warning.document(), warning.source_text());
    }
}

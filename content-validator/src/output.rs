//! Shared output formatting for validation reports.
//!
//! Provides JSON and plain-text formatters for `ValidationReport`.
//! Color/terminal formatting is excluded from this module; that concern
//! belongs to the CLI layer. Both formats are deterministic: the same report
//! always renders to the same bytes.

use std::io::Write;

use crate::finding::FindingKind;
use crate::report::ValidationReport;

/// Format a `ValidationReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ValidationReport` as human-readable plain text to a writer.
///
/// Counts come first, then every warning, then every error, each in the
/// order recorded.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  CONTENT INTEGRITY VALIDATOR")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Media types:         {}", report.media_types)?;
    writeln!(writer, "  Categories:          {}", report.categories)?;
    writeln!(writer, "  Items indexed:       {}", report.items_indexed)?;
    writeln!(writer, "  References checked:  {}", report.references_checked)?;
    writeln!(writer, "  Warnings:            {}", report.warnings_count())?;
    writeln!(writer, "  Errors:              {}", report.errors_count())?;
    writeln!(writer)?;

    if !report.collections.is_empty() {
        writeln!(writer, "  Collections:")?;
        for collection in &report.collections {
            match &collection.file {
                Some(file) => writeln!(
                    writer,
                    "    {} ({}): {} item(s)",
                    collection.media_type,
                    file.display(),
                    collection.items
                )?,
                None => writeln!(
                    writer,
                    "    {}: {} item(s)",
                    collection.media_type, collection.items
                )?,
            }
        }
        writeln!(writer)?;
    }

    if !report.warnings.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  WARNINGS")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for warning in &report.warnings {
            writeln!(writer, "{}", warning.format_human_readable())?;
        }
        writeln!(writer)?;
    }

    if !report.errors.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  ERRORS")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for error in &report.errors {
            writeln!(writer, "{}", error.format_human_readable())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    if report.ok {
        if report.warnings.is_empty() {
            writeln!(writer, "\u{2713} All content files are consistent")?;
        } else {
            writeln!(
                writer,
                "\u{2713} No errors found ({} warning(s) can be addressed later)",
                report.warnings_count()
            )?;
        }
    } else {
        writeln!(
            writer,
            "\u{2717} Validation failed with {} error(s)",
            report.errors_count()
        )?;
        write_hints(report, writer)?;
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}

fn write_hints(report: &ValidationReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    let has = |kinds: &[FindingKind]| kinds.iter().any(|&kind| report.count_of(kind) > 0);

    writeln!(writer)?;
    writeln!(writer, "  To fix:")?;
    if has(&[FindingKind::DanglingReference]) {
        writeln!(
            writer,
            "    - Remove dangling ids from the category list or restore the item"
        )?;
    }
    if has(&[FindingKind::MediaTypeMismatch, FindingKind::UnknownMediaType]) {
        writeln!(
            writer,
            "    - A category may only list items of its own mediaType"
        )?;
    }
    if has(&[FindingKind::DuplicateItemId]) {
        writeln!(
            writer,
            "    - Item ids are global: rename one of the duplicated items"
        )?;
    }
    if has(&[
        FindingKind::MissingDataFile,
        FindingKind::LegacyReferenceList,
    ]) {
        writeln!(
            writer,
            "    - Legacy data detected: migrate categories to id lists and give every media type a dataFile"
        )?;
    }
    if has(&[FindingKind::InvalidJson]) {
        writeln!(
            writer,
            "    - Fix JSON syntax errors first: checks skip files that do not parse"
        )?;
    }
    if has(&[FindingKind::InvalidField, FindingKind::MissingField]) {
        writeln!(
            writer,
            "    - Complete the configuration records: mediaType and dataFile are strings, display fields are required"
        )?;
    }
    writeln!(
        writer,
        "    - Each message names the file and id to edit"
    )?;
    Ok(())
}

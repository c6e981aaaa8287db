//! # content-validator
//!
//! Cross-file integrity validator for JSON content catalogs.
//!
//! A project keeps its content in many small JSON documents: a list of
//! categories, a list of media types, one item collection per media type and
//! one reference list (ordered item ids) per category. This crate checks
//! that they agree with each other before a site is rendered from them.
//!
//! Only a missing or unparseable configuration document aborts a run (as a
//! [`ConfigError`]). Every other defect is collected into the
//! [`ValidationReport`] so a single pass surfaces all of them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use content_validator::{validate_project, ValidationConfig};
//!
//! let config = ValidationConfig::for_root("site");
//! let report = validate_project(&config).unwrap();
//! println!("Items indexed: {}", report.items_indexed);
//! println!("Warnings: {}", report.warnings_count());
//! println!("Errors: {}", report.errors_count());
//! println!("OK: {}", report.ok);
//! ```

mod check;
mod config;
mod error;
mod finding;
mod model;
pub mod output;
mod report;
mod source;

use std::collections::{BTreeSet, HashSet};

pub use check::items::CollectionSummary;
pub use config::ValidationConfig;
pub use error::{ConfigError, SourceError, SourceErrorKind};
pub use finding::{Finding, FindingKind, Severity};
pub use model::{Category, MediaType, StringField};
pub use report::ValidationReport;

use check::items::load_media_type_items;
use check::orphans::report_orphans;
use check::references::check_category_references;
use check::schema::check_schema;
use check::sweep::sweep_project_files;
use check::translations::check_translations;
use finding::Findings;
use source::fs::confine;

/// Validate the content files of the project at `config.root`.
///
/// This is the primary public API.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the project root is not a directory, or if
/// the category or media-type document is missing, unreadable, not JSON, or
/// not a list of records. All other problems are reported in the returned
/// report and never abort the run.
pub fn validate_project(config: &ValidationConfig) -> Result<ValidationReport, ConfigError> {
    if !config.root.is_dir() {
        return Err(ConfigError::ProjectRoot {
            path: config.root.clone(),
        });
    }

    let loaded = model::load_categories(config).and_then(|categories| {
        model::load_media_types(config).map(|media_types| (categories, media_types))
    });
    let (categories, media_types) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::warn!(error = %err, "configuration could not be loaded; aborting");
            return Err(err);
        }
    };
    tracing::debug!(
        root = %config.root.display(),
        categories = categories.len(),
        media_types = media_types.len(),
        "configuration loaded"
    );

    let mut findings = Findings::default();
    let mut claimed: BTreeSet<_> = [config.categories_path(), config.media_types_path()]
        .iter()
        .filter_map(|path| confine(path))
        .collect();

    let catalog = load_media_type_items(config, &media_types, &mut findings, &mut claimed);

    let known_media_types: HashSet<&str> = media_types.iter().map(|m| m.id.as_str()).collect();
    let references = check_category_references(
        config,
        &categories,
        &known_media_types,
        &catalog.index,
        &mut findings,
        &mut claimed,
    );

    let orphans = report_orphans(&catalog.index, &references.referenced, &mut findings);
    tracing::debug!(
        items = catalog.index.len(),
        referenced = references.referenced.len(),
        orphans,
        "orphan pass complete"
    );

    if config.check_schema {
        check_schema(
            config,
            &categories,
            &media_types,
            &catalog,
            &references.lists,
            &mut findings,
            &mut claimed,
        );
    }

    if config.check_translations {
        check_translations(config, &mut findings, &mut claimed);
    }

    if config.sweep_files {
        sweep_project_files(config, &claimed, &mut findings);
    }

    let (warnings, errors) = findings.into_parts();
    tracing::info!(
        warnings = warnings.len(),
        errors = errors.len(),
        "validation finished"
    );

    Ok(ValidationReport {
        media_types: media_types.len(),
        categories: categories.len(),
        items_indexed: catalog.index.len(),
        references_checked: references.references_checked,
        collections: catalog.collections.iter().map(CollectionSummary::from).collect(),
        ok: errors.is_empty(),
        warnings,
        errors,
    })
}

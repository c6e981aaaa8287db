//! Validation report types.

use serde::Serialize;

use crate::check::items::CollectionSummary;
use crate::finding::{Finding, FindingKind};

/// Result of a validation run.
///
/// `ok` is `true` iff `errors` is empty; warnings never affect it.
/// Both lists keep the order in which findings were recorded.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ValidationReport {
    /// Media types configured.
    pub media_types: usize,
    /// Categories configured.
    pub categories: usize,
    /// Items in the global identifier index.
    pub items_indexed: usize,
    /// Distinct (category, id) references checked against the index.
    pub references_checked: usize,
    /// Item counts per media type, in configuration order.
    pub collections: Vec<CollectionSummary>,
    /// Whether the run produced no errors.
    pub ok: bool,
    pub warnings: Vec<Finding>,
    pub errors: Vec<Finding>,
}

impl ValidationReport {
    /// Number of warnings recorded.
    #[must_use]
    pub fn warnings_count(&self) -> usize {
        self.warnings.len()
    }

    /// Number of errors recorded.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of findings (warnings and errors) of one kind.
    #[must_use]
    pub fn count_of(&self, kind: FindingKind) -> usize {
        self.warnings
            .iter()
            .chain(&self.errors)
            .filter(|f| f.kind == kind)
            .count()
    }
}

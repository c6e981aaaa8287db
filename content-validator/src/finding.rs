//! Findings: the warnings and errors accumulated during one validation run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{SourceError, SourceErrorKind};

/// Whether a finding blocks success.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational; never affects the exit status.
    Warning,
    /// Blocks success.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// The class of condition a finding reports.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FindingKind {
    /// A media type declares no `dataFile`.
    MissingDataFile,
    /// A `dataFile` path is absolute or climbs out of the project root.
    UnsafeDataFile,
    /// Two media types share an id.
    DuplicateMediaType,
    /// A data or reference file does not exist.
    MissingFile,
    /// A file exists but could not be read.
    UnreadableFile,
    /// A file is not valid JSON.
    InvalidJson,
    /// A file is JSON but not the expected top-level shape.
    InvalidShape,
    /// An item record has no usable `id`.
    MissingItemId,
    /// An item id appears more than once across media-type files.
    DuplicateItemId,
    /// A category declares no `mediaType`.
    MissingMediaType,
    /// A category names a media type that is not configured.
    UnknownMediaType,
    /// A configuration attribute has the wrong JSON type.
    InvalidField,
    /// A configuration record or `app.json` lacks a required or recommended field.
    MissingField,
    /// A referenced item lacks a field its category requires.
    MissingItemField,
    /// Two categories share an id.
    DuplicateCategory,
    /// A reference list contains non-string entries.
    LegacyReferenceList,
    /// An id is listed more than once in one reference list.
    DuplicateReference,
    /// A reference list holds no ids.
    EmptyReferenceList,
    /// A referenced id exists in no media-type file.
    DanglingReference,
    /// A referenced id belongs to a different media type than its category.
    MediaTypeMismatch,
    /// An item is referenced by no category.
    OrphanItem,
    /// A data file is claimed by no media type or category.
    UnusedDataFile,
    /// The data directory could not be fully walked.
    SweepFailure,
    /// The language configuration or a translation file is broken.
    TranslationConfig,
    /// A translation file lacks keys present in another language.
    MissingTranslationKeys,
}

impl FindingKind {
    /// Stable snake-case label, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingDataFile => "missing_data_file",
            Self::UnsafeDataFile => "unsafe_data_file",
            Self::DuplicateMediaType => "duplicate_media_type",
            Self::MissingFile => "missing_file",
            Self::UnreadableFile => "unreadable_file",
            Self::InvalidJson => "invalid_json",
            Self::InvalidShape => "invalid_shape",
            Self::MissingItemId => "missing_item_id",
            Self::DuplicateItemId => "duplicate_item_id",
            Self::MissingMediaType => "missing_media_type",
            Self::UnknownMediaType => "unknown_media_type",
            Self::InvalidField => "invalid_field",
            Self::MissingField => "missing_field",
            Self::MissingItemField => "missing_item_field",
            Self::DuplicateCategory => "duplicate_category",
            Self::LegacyReferenceList => "legacy_reference_list",
            Self::DuplicateReference => "duplicate_reference",
            Self::EmptyReferenceList => "empty_reference_list",
            Self::DanglingReference => "dangling_reference",
            Self::MediaTypeMismatch => "media_type_mismatch",
            Self::OrphanItem => "orphan_item",
            Self::UnusedDataFile => "unused_data_file",
            Self::SweepFailure => "sweep_failure",
            Self::TranslationConfig => "translation_config",
            Self::MissingTranslationKeys => "missing_translation_keys",
        }
    }
}

/// A single warning or error, attributable to a file and/or identifier.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    /// File the finding is about, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub message: String,
}

impl Finding {
    #[must_use]
    pub fn warning(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            file: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            file: None,
            message: message.into(),
        }
    }

    /// Attribute the finding to a file.
    #[must_use]
    pub fn at(mut self, file: &Path) -> Self {
        self.file = Some(file.to_path_buf());
        self
    }

    /// Format the finding for human-readable output.
    ///
    /// `{severity}[{kind}]: {message}`
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        format!("{}[{}]: {}", self.severity, self.kind.as_str(), self.message)
    }
}

/// Ordered accumulator threaded through every loading and checking step.
///
/// Warnings and errors are kept in separate lists, each in recording order.
#[derive(Debug, Default)]
pub struct Findings {
    warnings: Vec<Finding>,
    errors: Vec<Finding>,
}

impl Findings {
    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Warning => self.warnings.push(finding),
            Severity::Error => self.errors.push(finding),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[cfg(test)]
    #[must_use]
    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    #[cfg(test)]
    #[must_use]
    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    /// Split into `(warnings, errors)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Finding>, Vec<Finding>) {
        (self.warnings, self.errors)
    }
}

impl SourceError {
    /// Turn a load failure into an error finding. `label` names the role of
    /// the file, e.g. "media-type data file".
    pub(crate) fn into_finding(self, label: &str) -> Finding {
        let path = self.file.display().to_string();
        let (kind, message) = match self.kind {
            SourceErrorKind::Missing => (FindingKind::MissingFile, format!("missing {label}: {path}")),
            SourceErrorKind::JsonParseError => (
                FindingKind::InvalidJson,
                format!("invalid JSON in {label} {path}: {}", self.message),
            ),
            SourceErrorKind::IoError
            | SourceErrorKind::FileTooLarge
            | SourceErrorKind::InvalidEncoding
            | SourceErrorKind::WalkError
            | SourceErrorKind::InvalidExcludePattern => (
                FindingKind::UnreadableFile,
                format!("cannot read {label} {path}: {}", self.message),
            ),
        };
        Finding::error(kind, message).at(&self.file)
    }
}

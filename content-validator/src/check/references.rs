//! Category reference loader.
//!
//! Validates each category's ordered list of item ids against the global
//! index and accumulates the referenced set used by the orphan pass.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::check::items::ItemIndex;
use crate::config::ValidationConfig;
use crate::finding::{Finding, FindingKind, Findings};
use crate::model::{Category, StringField};
use crate::source::fs::{confine, read_json};
use crate::source::json_kind;

const LABEL: &str = "category reference file";

/// Every identifier that appears in some category's reference list.
#[derive(Debug, Default)]
pub struct ReferencedSet {
    ids: HashSet<String>,
}

impl ReferencedSet {
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn insert(&mut self, id: &str) {
        if !self.ids.contains(id) {
            self.ids.insert(id.to_owned());
        }
    }
}

/// A reference list that loaded cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedList {
    /// Position of the category in the configuration document.
    pub category: usize,
    /// Distinct ids in list order.
    pub ids: Vec<String>,
}

/// Output of the reference pass.
#[derive(Debug, Default)]
pub struct ReferenceSummary {
    pub referenced: ReferencedSet,
    /// Distinct (category, id) pairs that were checked against the index.
    pub references_checked: usize,
    pub lists: Vec<CheckedList>,
}

/// Check every category's reference list.
///
/// `known_media_types` holds the configured media-type ids. Every reference
/// file that was looked at is added to `claimed`. A repeated category id is
/// checked again only when it points at a different reference list.
pub fn check_category_references(
    config: &ValidationConfig,
    categories: &[Category],
    known_media_types: &HashSet<&str>,
    index: &ItemIndex,
    findings: &mut Findings,
    claimed: &mut BTreeSet<PathBuf>,
) -> ReferenceSummary {
    let mut summary = ReferenceSummary::default();
    let mut first_seen: HashMap<&str, (usize, Option<PathBuf>)> = HashMap::new();

    for (position, category) in categories.iter().enumerate() {
        let resolved = reference_path(config, category);

        if let Some((first, first_file)) = first_seen.get(category.id.as_str()) {
            let same_list = first_file.as_ref() == resolved.as_ref().ok();
            findings.push(Finding::warning(
                FindingKind::DuplicateCategory,
                format!(
                    "category '{}' is defined more than once (entries #{first} and #{position}); {}",
                    category.id,
                    if same_list {
                        "the repeated definition is skipped"
                    } else {
                        "both reference lists are checked"
                    }
                ),
            ));
            if same_list {
                continue;
            }
        } else {
            first_seen.insert(&category.id, (position, resolved.as_ref().ok().cloned()));
        }

        let expected_type = declared_media_type(category, known_media_types, findings);

        let file = match resolved {
            Ok(file) => file,
            Err(finding) => {
                findings.push(finding);
                continue;
            }
        };
        claimed.insert(file.clone());

        let Some(ids) = load_reference_list(config, &file, findings) else {
            continue;
        };
        if ids.is_empty() {
            findings.push(
                Finding::warning(
                    FindingKind::EmptyReferenceList,
                    format!("category '{}' reference list is empty", category.id),
                )
                .at(&file),
            );
        }

        let distinct =
            check_ids(category, expected_type, &file, &ids, index, &mut summary.referenced, findings);
        tracing::info!(
            category = %category.id,
            file = %file.display(),
            references = ids.len(),
            "checked category references"
        );
        summary.references_checked += distinct.len();
        summary.lists.push(CheckedList {
            category: position,
            ids: distinct,
        });
    }

    summary
}

/// The category's media type if it is declared and configured; records an
/// error otherwise. Type-mismatch checks are skipped when this is `None`.
fn declared_media_type<'a>(
    category: &'a Category,
    known_media_types: &HashSet<&str>,
    findings: &mut Findings,
) -> Option<&'a str> {
    match &category.media_type {
        StringField::Absent => {
            findings.push(Finding::error(
                FindingKind::MissingMediaType,
                format!("category '{}' missing mediaType", category.id),
            ));
            None
        }
        StringField::WrongType(found) => {
            findings.push(Finding::error(
                FindingKind::InvalidField,
                format!(
                    "category '{}' mediaType must be a string, found {found}",
                    category.id
                ),
            ));
            None
        }
        StringField::Text(media_type) if !known_media_types.contains(media_type.as_str()) => {
            findings.push(Finding::error(
                FindingKind::UnknownMediaType,
                format!(
                    "category '{}' references unknown media type '{media_type}'",
                    category.id
                ),
            ));
            None
        }
        StringField::Text(media_type) => Some(media_type.as_str()),
    }
}

/// `<data_dir>/<id>.json`, or the category's `dataFile` taken relative to the
/// data directory. A leading `<data_dir>/` in `dataFile` is dropped.
fn reference_path(config: &ValidationConfig, category: &Category) -> Result<PathBuf, Finding> {
    let raw = match &category.data_file {
        StringField::Absent => config.data_dir.join(format!("{}.json", category.id)),
        StringField::Text(data_file) => {
            let data_file = Path::new(data_file);
            config
                .data_dir
                .join(data_file.strip_prefix(&config.data_dir).unwrap_or(data_file))
        }
        StringField::WrongType(found) => {
            return Err(Finding::error(
                FindingKind::InvalidField,
                format!(
                    "category '{}' dataFile must be a string, found {found}",
                    category.id
                ),
            ));
        }
    };
    confine(&raw).ok_or_else(|| {
        Finding::error(
            FindingKind::UnsafeDataFile,
            format!(
                "category '{}' reference file escapes the project root: {}",
                category.id,
                raw.display()
            ),
        )
    })
}

/// Read a reference list. `None` (with an error recorded) when the file is
/// missing, unparseable, not an array, or in the legacy object format.
fn load_reference_list(
    config: &ValidationConfig,
    file: &Path,
    findings: &mut Findings,
) -> Option<Vec<String>> {
    let value = match read_json(config, file) {
        Ok(value) => value,
        Err(err) => {
            findings.push(err.into_finding(LABEL));
            return None;
        }
    };

    let Value::Array(entries) = value else {
        findings.push(
            Finding::error(
                FindingKind::InvalidShape,
                format!(
                    "{LABEL} {} must contain a JSON array of item ids, found {}",
                    file.display(),
                    json_kind(&value)
                ),
            )
            .at(file),
        );
        return None;
    };

    let mut ids = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::String(id) = entry else {
            findings.push(
                Finding::error(
                    FindingKind::LegacyReferenceList,
                    format!(
                        "{LABEL} {} contains non-string entries; it is likely still in the \
                         legacy (pre-migration) format, per-entry checks skipped",
                        file.display()
                    ),
                )
                .at(file),
            );
            return None;
        };
        ids.push(id);
    }
    Some(ids)
}

/// Check one well-formed list. Returns its distinct ids in list order.
fn check_ids(
    category: &Category,
    expected_type: Option<&str>,
    file: &Path,
    ids: &[String],
    index: &ItemIndex,
    referenced: &mut ReferencedSet,
    findings: &mut Findings,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut repeated = HashSet::new();
    let mut distinct = Vec::new();

    for id in ids {
        let id = id.as_str();
        if !seen.insert(id) {
            if repeated.insert(id) {
                findings.push(
                    Finding::warning(
                        FindingKind::DuplicateReference,
                        format!(
                            "category '{}' references '{id}' more than once",
                            category.id
                        ),
                    )
                    .at(file),
                );
            }
            continue;
        }

        referenced.insert(id);
        distinct.push(id.to_owned());

        match index.get(id) {
            None => findings.push(
                Finding::error(
                    FindingKind::DanglingReference,
                    format!(
                        "category '{}' references '{id}', which exists in no media-type file",
                        category.id
                    ),
                )
                .at(file),
            ),
            Some(item) => {
                if let Some(expected) = expected_type
                    && item.media_type != expected
                {
                    findings.push(
                        Finding::error(
                            FindingKind::MediaTypeMismatch,
                            format!(
                                "category '{}' (media type '{expected}') references '{id}', \
                                 which belongs to media type '{}'",
                                category.id, item.media_type
                            ),
                        )
                        .at(file),
                    );
                }
            }
        }
    }

    distinct
}

//! Media-type item loader.
//!
//! Loads every media type's item collection and builds the global
//! identifier index. Identifiers are unique across *all* collections; the
//! first occurrence of an id stays canonical.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::finding::{Finding, FindingKind, Findings};
use crate::model::{MediaType, StringField};
use crate::source::fs::{confine, read_json};
use crate::source::json_kind;

/// Maximum length of a record snippet quoted in a finding.
const SNIPPET_CHARS: usize = 80;

const LABEL: &str = "media-type data file";

/// An indexed item: its id and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedItem {
    pub id: String,
    pub media_type: String,
    pub file: PathBuf,
    /// Position of the record in its collection.
    pub record: usize,
}

/// Global identifier -> owning media type index.
///
/// Iteration follows insertion order (media-type configuration order, then
/// file order), which keeps every derived finding list deterministic.
#[derive(Debug, Default)]
pub struct ItemIndex {
    items: Vec<IndexedItem>,
    positions: HashMap<String, usize>,
}

impl ItemIndex {
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&IndexedItem> {
        self.positions.get(id).map(|&pos| &self.items[pos])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedItem> {
        self.items.iter()
    }

    /// Insert an item unless its id is already indexed; on conflict returns
    /// the canonical entry.
    fn insert(&mut self, item: IndexedItem) -> Result<(), &IndexedItem> {
        if let Some(&pos) = self.positions.get(&item.id) {
            return Err(&self.items[pos]);
        }
        self.positions.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }
}

/// The item list loaded for one media type.
#[derive(Debug, Clone)]
pub struct MediaTypeItems {
    pub media_type: String,
    /// Normalized data-file path; `None` when `dataFile` was absent or unsafe.
    pub file: Option<PathBuf>,
    /// Records as read from the file. Empty when loading failed.
    pub items: Vec<Map<String, Value>>,
}

/// Per-collection counts for the report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollectionSummary {
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub items: usize,
}

impl From<&MediaTypeItems> for CollectionSummary {
    fn from(collection: &MediaTypeItems) -> Self {
        Self {
            media_type: collection.media_type.clone(),
            file: collection.file.clone(),
            items: collection.items.len(),
        }
    }
}

/// Everything the item loader produces.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    pub index: ItemIndex,
    pub collections: Vec<MediaTypeItems>,
}

impl ItemCatalog {
    /// The record an indexed item was read from.
    #[must_use]
    pub fn record(&self, item: &IndexedItem) -> Option<&Map<String, Value>> {
        self.collections
            .iter()
            .find(|c| c.media_type == item.media_type && c.file.as_ref() == Some(&item.file))
            .and_then(|c| c.items.get(item.record))
    }
}

/// Load all media-type item collections and build the global index.
///
/// Every data file that was looked at is added to `claimed`, so the
/// data-directory sweep does not report it as unused.
pub fn load_media_type_items(
    config: &ValidationConfig,
    media_types: &[MediaType],
    findings: &mut Findings,
    claimed: &mut BTreeSet<PathBuf>,
) -> ItemCatalog {
    let mut catalog = ItemCatalog::default();
    let mut seen_types = HashSet::new();

    for media_type in media_types {
        if !seen_types.insert(media_type.id.as_str()) {
            findings.push(Finding::error(
                FindingKind::DuplicateMediaType,
                format!(
                    "media type '{}' is defined more than once; only the first definition is used",
                    media_type.id
                ),
            ));
            continue;
        }

        let mut collection = MediaTypeItems {
            media_type: media_type.id.clone(),
            file: None,
            items: Vec::new(),
        };

        let raw_path = match &media_type.data_file {
            StringField::Text(raw_path) => raw_path.as_str(),
            StringField::Absent => {
                findings.push(Finding::error(
                    FindingKind::MissingDataFile,
                    format!("media type '{}' missing dataFile", media_type.id),
                ));
                catalog.collections.push(collection);
                continue;
            }
            StringField::WrongType(found) => {
                findings.push(Finding::error(
                    FindingKind::InvalidField,
                    format!(
                        "media type '{}' dataFile must be a string, found {found}",
                        media_type.id
                    ),
                ));
                catalog.collections.push(collection);
                continue;
            }
        };

        let Some(file) = confine(Path::new(raw_path)) else {
            findings.push(Finding::error(
                FindingKind::UnsafeDataFile,
                format!(
                    "media type '{}' dataFile escapes the project root: {raw_path}",
                    media_type.id
                ),
            ));
            catalog.collections.push(collection);
            continue;
        };
        claimed.insert(file.clone());

        if let Some(records) = load_records(config, &file, findings) {
            index_records(&media_type.id, &file, &records, &mut catalog.index, findings);
            collection.items = records;
        }
        tracing::info!(
            media_type = %media_type.id,
            file = %file.display(),
            items = collection.items.len(),
            "loaded media-type items"
        );
        collection.file = Some(file);
        catalog.collections.push(collection);
    }

    catalog
}

/// Read one item collection. `None` (with an error recorded) when the file
/// is missing, unparseable, or not an array of objects.
fn load_records(
    config: &ValidationConfig,
    file: &Path,
    findings: &mut Findings,
) -> Option<Vec<Map<String, Value>>> {
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
                    "{LABEL} {} must contain a JSON array, found {}",
                    file.display(),
                    json_kind(&value)
                ),
            )
            .at(file),
        );
        return None;
    };

    let mut records = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::Object(map) => records.push(map),
            other => {
                findings.push(
                    Finding::error(
                        FindingKind::InvalidShape,
                        format!(
                            "{LABEL} {} entry #{i} is {}, expected an object",
                            file.display(),
                            json_kind(&other)
                        ),
                    )
                    .at(file),
                );
                return None;
            }
        }
    }
    Some(records)
}

fn index_records(
    media_type: &str,
    file: &Path,
    records: &[Map<String, Value>],
    index: &mut ItemIndex,
    findings: &mut Findings,
) {
    for (i, record) in records.iter().enumerate() {
        let Some(id) = record
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
        else {
            findings.push(
                Finding::error(
                    FindingKind::MissingItemId,
                    format!(
                        "item #{i} in {} (media type '{media_type}') has no 'id': {}",
                        file.display(),
                        snippet(record)
                    ),
                )
                .at(file),
            );
            continue;
        };

        let item = IndexedItem {
            id: id.to_owned(),
            media_type: media_type.to_owned(),
            file: file.to_path_buf(),
            record: i,
        };
        if let Err(first) = index.insert(item) {
            findings.push(
                Finding::error(
                    FindingKind::DuplicateItemId,
                    format!(
                        "duplicate item id '{id}': found in media type '{media_type}' ({}), \
                         first defined in media type '{}' ({})",
                        file.display(),
                        first.media_type,
                        first.file.display()
                    ),
                )
                .at(file),
            );
        }
    }
}

/// Compact JSON rendering of a record, truncated to `SNIPPET_CHARS`.
fn snippet(record: &Map<String, Value>) -> String {
    let rendered = Value::Object(record.clone()).to_string();
    if rendered.chars().count() <= SNIPPET_CHARS {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(SNIPPET_CHARS).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn media_type(id: &str, data_file: Option<&str>) -> MediaType {
        MediaType {
            id: id.to_owned(),
            data_file: data_file.map_or(StringField::Absent, |f| StringField::Text(f.to_owned())),
            extra: Map::new(),
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn load(tmp: &TempDir, media_types: &[MediaType]) -> (ItemCatalog, Findings, BTreeSet<PathBuf>) {
        let config = ValidationConfig::for_root(tmp.path());
        let mut findings = Findings::default();
        let mut claimed = BTreeSet::new();
        let catalog = load_media_type_items(&config, media_types, &mut findings, &mut claimed);
        (catalog, findings, claimed)
    }

    #[test]
    fn test_loads_and_indexes_items() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data/image.json", r#"[{"id":"a","title":"A"},{"id":"b"}]"#);

        let (catalog, findings, claimed) =
            load(&tmp, &[media_type("image", Some("./data/image.json"))]);

        assert!(!findings.has_errors(), "{:?}", findings.errors());
        assert_eq!(catalog.index.len(), 2);
        assert_eq!(catalog.index.get("a").unwrap().media_type, "image");
        assert_eq!(catalog.collections[0].items.len(), 2);
        assert!(claimed.contains(Path::new("data/image.json")));

        let b = catalog.index.get("b").unwrap();
        assert_eq!(b.record, 1);
        assert_eq!(catalog.record(b).unwrap()["id"], "b");
    }

    #[test]
    fn test_badly_typed_data_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data/audio.json", r#"[{"id":"s1"}]"#);
        let mut image = media_type("image", None);
        image.data_file = StringField::WrongType("a number");

        let (catalog, findings, _) =
            load(&tmp, &[image, media_type("audio", Some("data/audio.json"))]);

        assert_eq!(findings.errors().len(), 1);
        assert_eq!(findings.errors()[0].kind, FindingKind::InvalidField);
        assert_eq!(
            findings.errors()[0].message,
            "media type 'image' dataFile must be a string, found a number"
        );
        assert_eq!(catalog.index.len(), 1);
    }

    #[test]
    fn test_missing_data_file_field() {
        let tmp = TempDir::new().unwrap();
        let (catalog, findings, _) = load(&tmp, &[media_type("image", None)]);

        assert_eq!(findings.errors().len(), 1);
        assert_eq!(findings.errors()[0].message, "media type 'image' missing dataFile");
        assert!(catalog.collections[0].items.is_empty());
    }

    #[test]
    fn test_missing_file_continues_with_next_type() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data/audio.json", r#"[{"id":"s1"}]"#);

        let (catalog, findings, _) = load(
            &tmp,
            &[
                media_type("image", Some("data/image.json")),
                media_type("audio", Some("data/audio.json")),
            ],
        );

        assert_eq!(findings.errors().len(), 1);
        assert_eq!(
            findings.errors()[0].message,
            "missing media-type data file: data/image.json"
        );
        assert_eq!(catalog.index.len(), 1);
        assert_eq!(catalog.collections.len(), 2);
    }

    #[test]
    fn test_non_array_and_non_object_entries() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data/image.json", r#"{"items": []}"#);
        write(tmp.path(), "data/audio.json", r#"[{"id":"s1"}, 7]"#);

        let (catalog, findings, _) = load(
            &tmp,
            &[
                media_type("image", Some("data/image.json")),
                media_type("audio", Some("data/audio.json")),
            ],
        );

        let errors = findings.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == FindingKind::InvalidShape));
        assert!(errors[0].message.contains("found an object"), "{}", errors[0].message);
        assert!(errors[1].message.contains("entry #1 is a number"), "{}", errors[1].message);
        assert!(catalog.index.is_empty());
    }

    #[test]
    fn test_item_without_id_is_skipped_with_snippet() {
        let tmp = TempDir::new().unwrap();
        let long_title = "x".repeat(200);
        write(
            tmp.path(),
            "data/image.json",
            &format!(r#"[{{"title":"{long_title}"}},{{"id":"a"}},{{"id":""}}]"#),
        );

        let (catalog, findings, _) = load(&tmp, &[media_type("image", Some("data/image.json"))]);

        let errors = findings.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == FindingKind::MissingItemId));
        assert!(errors[0].message.contains("item #0"));
        assert!(errors[0].message.ends_with("..."));
        assert!(!errors[0].message.contains(&long_title));
        assert_eq!(catalog.index.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_keep_first_occurrence() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data/image.json", r#"[{"id":"a"},{"id":"a"}]"#);
        write(tmp.path(), "data/audio.json", r#"[{"id":"a"}]"#);

        let (catalog, findings, _) = load(
            &tmp,
            &[
                media_type("image", Some("data/image.json")),
                media_type("audio", Some("data/audio.json")),
            ],
        );

        let errors = findings.errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == FindingKind::DuplicateItemId));
        assert!(errors[1].message.contains("'audio' (data/audio.json)"), "{}", errors[1].message);
        assert!(errors[1].message.contains("'image' (data/image.json)"), "{}", errors[1].message);
        assert_eq!(catalog.index.len(), 1);
        assert_eq!(catalog.index.get("a").unwrap().media_type, "image");
    }

    #[test]
    fn test_duplicate_media_type_and_unsafe_path() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "data/image.json", "[]");

        let (catalog, findings, claimed) = load(
            &tmp,
            &[
                media_type("image", Some("data/image.json")),
                media_type("image", Some("data/other.json")),
                media_type("video", Some("../outside.json")),
            ],
        );

        let kinds: Vec<_> = findings.errors().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            [FindingKind::DuplicateMediaType, FindingKind::UnsafeDataFile]
        );
        assert_eq!(catalog.collections.len(), 2);
        assert_eq!(claimed.len(), 1);
    }
}

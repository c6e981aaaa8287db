//! Configuration documents: categories and media types.
//!
//! Both documents are either a bare JSON array of records or an object that
//! wraps the array under a well-known key. Anything else is a fatal
//! [`ConfigError`]. A record only needs a string `id` to load; badly typed
//! optional fields are kept as [`StringField::WrongType`] and reported by the
//! checking passes.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::error::ConfigError;
use crate::source::fs::read_json;
use crate::source::json_kind;

/// Keys that may wrap the category array, in order of preference.
const CATEGORY_KEYS: &[&str] = &["contentTypes", "categories"];
/// Keys that may wrap the media-type array.
const MEDIA_TYPE_KEYS: &[&str] = &["mediaTypes"];

/// An optional string attribute of a configuration record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StringField {
    /// The key is not present.
    #[default]
    Absent,
    Text(String),
    /// The key holds something other than a string; carries its JSON kind.
    WrongType(&'static str),
}

impl StringField {
    /// The value if it is a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Absent | Self::WrongType(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for StringField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Self::Text(text),
            other => Self::WrongType(json_kind(&other)),
        })
    }
}

/// A user-facing content grouping mapped to one media type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct Category {
    pub id: String,
    /// Declared media type.
    #[serde(rename = "mediaType", default)]
    pub media_type: StringField,
    /// Optional override for the reference-list location, relative to the
    /// data directory.
    #[serde(rename = "dataFile", default)]
    pub data_file: StringField,
    /// Display and schema attributes (`name`, `icon`, `fields`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A storage/rendering family backed by one item collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct MediaType {
    pub id: String,
    /// Item collection path. `Absent` signals an un-migrated schema.
    #[serde(rename = "dataFile", default)]
    pub data_file: StringField,
    /// Display attributes (`name`, `icon`, `viewer`, `acceptedFormats`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Load the category configuration document.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the document is missing, unreadable, not
/// JSON, or not a list of category records.
pub fn load_categories(config: &ValidationConfig) -> Result<Vec<Category>, ConfigError> {
    load_record_list(config, &config.categories_path(), CATEGORY_KEYS)
}

/// Load the media-type configuration document.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the document is missing, unreadable, not
/// JSON, or not a list of media-type records.
pub fn load_media_types(config: &ValidationConfig) -> Result<Vec<MediaType>, ConfigError> {
    load_record_list(config, &config.media_types_path(), MEDIA_TYPE_KEYS)
}

fn load_record_list<T: DeserializeOwned>(
    config: &ValidationConfig,
    relative: &Path,
    keys: &[&str],
) -> Result<Vec<T>, ConfigError> {
    let value = read_json(config, relative)?;
    let shape_error = |message: String| ConfigError::Shape {
        path: relative.to_path_buf(),
        message,
    };

    let entries = unwrap_record_array(value, keys).map_err(|found| {
        shape_error(format!(
            "expected an array or an object with {}, found {found}",
            keys.iter()
                .map(|k| format!("'{k}'"))
                .collect::<Vec<_>>()
                .join(" or ")
        ))
    })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            serde_json::from_value(entry).map_err(|e| shape_error(format!("entry #{i}: {e}")))
        })
        .collect()
}

/// Extract the record array from a configuration document. On failure the
/// error carries a description of what was found instead.
fn unwrap_record_array(value: Value, keys: &[&str]) -> Result<Vec<Value>, &'static str> {
    match value {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => {
            for key in keys {
                match map.remove(*key) {
                    Some(Value::Array(entries)) => return Ok(entries),
                    Some(other) => return Err(json_kind(&other)),
                    None => {}
                }
            }
            Err("an object without a record array")
        }
        other => Err(json_kind(&other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(categories: &str, media_types: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let config_dir = tmp.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("categories.json"), categories).unwrap();
        fs::write(config_dir.join("media-types.json"), media_types).unwrap();
        tmp
    }

    #[test]
    fn test_bare_arrays() {
        let tmp = project(
            r#"[{"id":"painting","mediaType":"image","name":"Paintings"}]"#,
            r#"[{"id":"image","dataFile":"data/image.json","icon":"x"}]"#,
        );
        let config = ValidationConfig::for_root(tmp.path());
        let categories = load_categories(&config).unwrap();
        let media_types = load_media_types(&config).unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "painting");
        assert_eq!(categories[0].media_type.as_text(), Some("image"));
        assert_eq!(categories[0].data_file, StringField::Absent);
        assert_eq!(categories[0].extra["name"], "Paintings");
        assert_eq!(media_types[0].data_file.as_text(), Some("data/image.json"));
        assert!(media_types[0].extra.contains_key("icon"));
    }

    #[test]
    fn test_wrapped_documents() {
        let tmp = project(
            r#"{"categories":[{"id":"old"}],"contentTypes":[{"id":"new","mediaType":"image"}]}"#,
            r#"{"mediaTypes":[{"id":"image"}]}"#,
        );
        let config = ValidationConfig::for_root(tmp.path());
        let categories = load_categories(&config).unwrap();
        let media_types = load_media_types(&config).unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "new");
        assert_eq!(media_types[0].id, "image");
        assert_eq!(media_types[0].data_file, StringField::Absent);
    }

    #[test]
    fn test_badly_typed_fields_still_load() {
        let tmp = project(
            r#"[{"id":"music","mediaType":5,"dataFile":null}]"#,
            r#"[{"id":"audio","dataFile":["data/audio.json"]}]"#,
        );
        let config = ValidationConfig::for_root(tmp.path());
        let categories = load_categories(&config).unwrap();
        let media_types = load_media_types(&config).unwrap();

        assert_eq!(categories[0].media_type, StringField::WrongType("a number"));
        assert_eq!(categories[0].data_file, StringField::WrongType("null"));
        assert_eq!(categories[0].media_type.as_text(), None);
        assert_eq!(media_types[0].data_file, StringField::WrongType("an array"));
    }

    #[test]
    fn test_missing_document_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = ValidationConfig::for_root(tmp.path());
        let err = load_categories(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }), "got: {err}");
    }

    #[test]
    fn test_unparseable_document_is_fatal() {
        let tmp = project("[", "[]");
        let config = ValidationConfig::for_root(tmp.path());
        let err = load_categories(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    }

    #[test]
    fn test_wrong_shape_is_fatal() {
        let tmp = project(r#"{"other": []}"#, r#""image""#);
        let config = ValidationConfig::for_root(tmp.path());

        let err = load_categories(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Shape { .. }), "got: {err}");

        let msg = load_media_types(&config).unwrap_err().to_string();
        assert!(msg.contains("found a string"), "got: {msg}");
    }

    #[test]
    fn test_record_without_id_is_fatal() {
        let tmp = project(r#"[{"mediaType":"image"}]"#, "[]");
        let config = ValidationConfig::for_root(tmp.path());
        let msg = load_categories(&config).unwrap_err().to_string();
        assert!(msg.contains("entry #0"), "got: {msg}");
    }
}

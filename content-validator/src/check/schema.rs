//! Schema pass.
//!
//! Display attributes the site renderer relies on: required fields of media
//! types and categories, the `fields` block of a category, recommended
//! `app.json` fields, and the item fields each category requires of the
//! items it lists.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::check::items::ItemCatalog;
use crate::check::references::CheckedList;
use crate::config::ValidationConfig;
use crate::finding::{Finding, FindingKind, Findings};
use crate::model::{Category, MediaType};
use crate::source::fs::{confine, read_json};
use crate::source::json_kind;

const MEDIA_TYPE_REQUIRED: &[&str] = &["name", "icon", "viewer", "acceptedFormats"];
const CATEGORY_REQUIRED: &[&str] = &["name", "icon"];
const APP_RECOMMENDED: &[&str] = &["name", "author", "api", "github"];
/// Item fields required when a category has no `fields.required`.
const DEFAULT_ITEM_FIELDS: &[&str] = &["title", "url"];

/// Run every schema check. `lists` are the reference lists that loaded
/// cleanly in the reference pass.
pub fn check_schema(
    config: &ValidationConfig,
    categories: &[Category],
    media_types: &[MediaType],
    catalog: &ItemCatalog,
    lists: &[CheckedList],
    findings: &mut Findings,
    claimed: &mut BTreeSet<PathBuf>,
) {
    for media_type in media_types {
        check_media_type_fields(media_type, findings);
    }
    for category in categories {
        check_category_fields(category, findings);
    }
    check_app_config(config, findings, claimed);

    for list in lists {
        let Some(category) = categories.get(list.category) else {
            continue;
        };
        check_item_fields(category, &list.ids, catalog, findings);
    }
}

fn check_media_type_fields(media_type: &MediaType, findings: &mut Findings) {
    for field in MEDIA_TYPE_REQUIRED {
        if !media_type.extra.contains_key(*field) {
            findings.push(Finding::error(
                FindingKind::MissingField,
                format!("media type '{}' missing required field: {field}", media_type.id),
            ));
        }
    }
    if let Some(formats) = media_type.extra.get("acceptedFormats")
        && !formats.is_array()
    {
        findings.push(Finding::error(
            FindingKind::InvalidField,
            format!(
                "media type '{}' acceptedFormats must be an array, found {}",
                media_type.id,
                json_kind(formats)
            ),
        ));
    }
}

fn check_category_fields(category: &Category, findings: &mut Findings) {
    for field in CATEGORY_REQUIRED {
        if !category.extra.contains_key(*field) {
            findings.push(Finding::error(
                FindingKind::MissingField,
                format!("category '{}' missing required field: {field}", category.id),
            ));
        }
    }

    let fields = match category.extra.get("fields") {
        None => return,
        Some(Value::Object(fields)) => fields,
        Some(other) => {
            findings.push(Finding::error(
                FindingKind::InvalidField,
                format!(
                    "category '{}' fields must be an object, found {}",
                    category.id,
                    json_kind(other)
                ),
            ));
            return;
        }
    };

    for key in ["required", "optional"] {
        match fields.get(key) {
            None => findings.push(Finding::warning(
                FindingKind::MissingField,
                format!("category '{}' missing 'fields.{key}' array", category.id),
            )),
            Some(Value::Array(names)) if names.iter().all(Value::is_string) => {}
            Some(other) => findings.push(Finding::error(
                FindingKind::InvalidField,
                format!(
                    "category '{}' fields.{key} must be an array of strings, found {}",
                    category.id,
                    json_kind(other)
                ),
            )),
        }
    }
}

fn check_app_config(
    config: &ValidationConfig,
    findings: &mut Findings,
    claimed: &mut BTreeSet<PathBuf>,
) {
    let path = config.app_path();
    claimed.extend(confine(&path));

    let app = match read_json(config, &path) {
        Ok(Value::Object(app)) => app,
        Ok(other) => {
            findings.push(
                Finding::error(
                    FindingKind::InvalidShape,
                    format!(
                        "app configuration {} must contain a JSON object, found {}",
                        path.display(),
                        json_kind(&other)
                    ),
                )
                .at(&path),
            );
            return;
        }
        Err(err) => {
            findings.push(err.into_finding("app configuration"));
            return;
        }
    };

    for field in APP_RECOMMENDED {
        if !app.contains_key(*field) {
            findings.push(
                Finding::warning(
                    FindingKind::MissingField,
                    format!("{} missing recommended field: {field}", path.display()),
                )
                .at(&path),
            );
        }
    }
}

/// Names from `fields.required`, or the defaults when the category has none.
fn required_item_fields(category: &Category) -> Vec<&str> {
    category
        .extra
        .get("fields")
        .and_then(|fields| fields.get("required"))
        .and_then(Value::as_array)
        .map_or_else(
            || DEFAULT_ITEM_FIELDS.to_vec(),
            |names| names.iter().filter_map(Value::as_str).collect(),
        )
}

fn check_item_fields(
    category: &Category,
    ids: &[String],
    catalog: &ItemCatalog,
    findings: &mut Findings,
) {
    let required = required_item_fields(category);
    for id in ids {
        let Some(item) = catalog.index.get(id) else {
            continue;
        };
        let Some(record) = catalog.record(item) else {
            continue;
        };
        for field in missing_fields(record, &required) {
            findings.push(
                Finding::warning(
                    FindingKind::MissingItemField,
                    format!(
                        "item '{id}' (category '{}') missing required field '{field}'",
                        category.id
                    ),
                )
                .at(&item.file),
            );
        }
    }
}

fn missing_fields<'a>(record: &Map<String, Value>, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|field| !record.contains_key(*field))
        .collect()
}

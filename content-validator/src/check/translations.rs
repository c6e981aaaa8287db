//! Translation parity check.
//!
//! `config/languages.json` lists the supported languages; each has a flat
//! key -> string file at `lang/<code>.json`. Every language should carry the
//! same top-level keys.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::config::ValidationConfig;
use crate::finding::{Finding, FindingKind, Findings};
use crate::source::fs::{confine, read_json};
use crate::source::json_kind;

/// Missing keys listed by name in a finding; the rest are only counted.
const LISTED_KEYS: usize = 5;

#[derive(Debug, Deserialize)]
struct LanguagesConfig {
    #[serde(rename = "supportedLanguages")]
    supported_languages: Vec<Language>,
    #[serde(rename = "defaultLanguage", default)]
    default_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Language {
    code: String,
}

/// Check language configuration and translation key parity. Files that
/// were loaded are added to `claimed`.
pub fn check_translations(
    config: &ValidationConfig,
    findings: &mut Findings,
    claimed: &mut BTreeSet<PathBuf>,
) {
    let languages_path = config.languages_path();
    claimed.extend(confine(&languages_path));
    let languages = match read_json(config, &languages_path) {
        Ok(value) => match serde_json::from_value::<LanguagesConfig>(value) {
            Ok(languages) => languages,
            Err(e) => {
                findings.push(
                    Finding::error(
                        FindingKind::TranslationConfig,
                        format!("invalid language configuration {}: {e}", languages_path.display()),
                    )
                    .at(&languages_path),
                );
                return;
            }
        },
        Err(err) => {
            findings.push(retag(err.into_finding("language configuration")));
            return;
        }
    };

    if let Some(default) = languages.default_language.as_deref()
        && !languages.supported_languages.iter().any(|l| l.code == default)
    {
        findings.push(
            Finding::error(
                FindingKind::TranslationConfig,
                format!("default language '{default}' is not among the supported languages"),
            )
            .at(&languages_path),
        );
    }

    let mut loaded: Vec<(&str, BTreeSet<String>)> = Vec::new();
    for language in &languages.supported_languages {
        if let Some(keys) = load_keys(config, &language.code, findings, claimed) {
            loaded.push((language.code.as_str(), keys));
        }
    }

    if loaded.len() < 2 {
        return;
    }

    let all_keys: BTreeSet<&str> = loaded
        .iter()
        .flat_map(|(_, keys)| keys.iter().map(String::as_str))
        .collect();

    for (code, keys) in &loaded {
        let missing: Vec<&str> = all_keys
            .iter()
            .copied()
            .filter(|key| !keys.contains(*key))
            .collect();
        if missing.is_empty() {
            continue;
        }
        let mut message = format!(
            "language '{code}' is missing {} translation key(s): {}",
            missing.len(),
            missing[..missing.len().min(LISTED_KEYS)].join(", ")
        );
        if missing.len() > LISTED_KEYS {
            message.push_str(", ...");
        }
        let file = lang_file(config, code);
        let mut finding = Finding::warning(FindingKind::MissingTranslationKeys, message);
        if let Some(file) = file {
            finding = finding.at(&file);
        }
        findings.push(finding);
    }
}

fn lang_file(config: &ValidationConfig, code: &str) -> Option<PathBuf> {
    confine(&config.lang_dir.join(format!("{code}.json")))
}

/// Top-level keys of one translation file; `None` with an error recorded
/// when the file is unusable.
fn load_keys(
    config: &ValidationConfig,
    code: &str,
    findings: &mut Findings,
    claimed: &mut BTreeSet<PathBuf>,
) -> Option<BTreeSet<String>> {
    let Some(file) = lang_file(config, code) else {
        findings.push(Finding::error(
            FindingKind::TranslationConfig,
            format!("language code '{code}' does not map to a file inside the project"),
        ));
        return None;
    };
    claimed.insert(file.clone());

    match read_json(config, &file) {
        Ok(Value::Object(map)) => Some(map.into_iter().map(|(key, _)| key).collect()),
        Ok(other) => {
            findings.push(
                Finding::error(
                    FindingKind::TranslationConfig,
                    format!(
                        "translation file {} must contain a JSON object, found {}",
                        file.display(),
                        json_kind(&other)
                    ),
                )
                .at(&file),
            );
            None
        }
        Err(err) => {
            findings.push(retag(err.into_finding("translation file")));
            None
        }
    }
}

/// Translation problems are reported under their own kind.
fn retag(mut finding: Finding) -> Finding {
    finding.kind = FindingKind::TranslationConfig;
    finding
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn run(tmp: &TempDir) -> Findings {
        let config = ValidationConfig::for_root(tmp.path());
        let mut findings = Findings::default();
        let mut claimed = BTreeSet::new();
        check_translations(&config, &mut findings, &mut claimed);
        assert!(claimed.contains(Path::new("config/languages.json")));
        findings
    }

    #[test]
    fn test_matching_languages_pass() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "config/languages.json",
            r#"{"supportedLanguages":[{"code":"en","name":"English"},{"code":"fr","name":"Francais"}],"defaultLanguage":"en"}"#,
        );
        write(tmp.path(), "lang/en.json", r#"{"title":"Title","menu":"Menu"}"#);
        write(tmp.path(), "lang/fr.json", r#"{"menu":"Menu","title":"Titre"}"#);

        let findings = run(&tmp);
        assert!(!findings.has_errors(), "{:?}", findings.errors());
        assert!(findings.warnings().is_empty(), "{:?}", findings.warnings());
    }

    #[test]
    fn test_missing_keys_warn_with_names() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "config/languages.json",
            r#"{"supportedLanguages":[{"code":"en"},{"code":"fr"}],"defaultLanguage":"en"}"#,
        );
        write(
            tmp.path(),
            "lang/en.json",
            r#"{"a":"","b":"","c":"","d":"","e":"","f":"","g":""}"#,
        );
        write(tmp.path(), "lang/fr.json", r#"{"a":""}"#);

        let findings = run(&tmp);
        assert!(!findings.has_errors());
        assert_eq!(findings.warnings().len(), 1);
        let warning = &findings.warnings()[0];
        assert_eq!(warning.kind, FindingKind::MissingTranslationKeys);
        assert_eq!(
            warning.message,
            "language 'fr' is missing 6 translation key(s): b, c, d, e, f, ..."
        );
        assert_eq!(warning.file.as_deref(), Some(Path::new("lang/fr.json")));
    }

    #[test]
    fn test_broken_configuration_is_an_error() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "config/languages.json",
            r#"{"supportedLanguages":[{"code":"en"},{"code":"de"}],"defaultLanguage":"fr"}"#,
        );
        write(tmp.path(), "lang/en.json", "[]");

        let findings = run(&tmp);
        let messages: Vec<_> = findings.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages.len(), 3, "{messages:?}");
        assert!(messages[0].contains("default language 'fr'"));
        assert!(messages[1].contains("must contain a JSON object"));
        assert!(messages[2].contains("missing translation file: lang/de.json"));
        assert!(
            findings
                .errors()
                .iter()
                .all(|e| e.kind == FindingKind::TranslationConfig)
        );
    }

    #[test]
    fn test_missing_languages_file() {
        let tmp = TempDir::new().unwrap();
        let findings = run(&tmp);
        assert_eq!(findings.errors().len(), 1);
        assert_eq!(
            findings.errors()[0].message,
            "missing language configuration: config/languages.json"
        );
    }
}

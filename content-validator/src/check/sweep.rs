//! Project file sweep.
//!
//! Walks the configuration, data and translation directories. Every JSON
//! file that no earlier pass loaded is parsed once, so a syntax error in a
//! stray file still fails the run. Data files that neither a media type nor
//! a category claims are reported as unused; these are usually leftovers
//! from renamed categories or pre-migration backups.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::config::ValidationConfig;
use crate::finding::{Finding, FindingKind, Findings};
use crate::source::fs::{compile_excludes, find_json_files, read_json};

const LABEL: &str = "project file";

/// Sweep the project. `claimed` holds every file an earlier pass loaded.
/// Returns the number of JSON files walked.
pub fn sweep_project_files(
    config: &ValidationConfig,
    claimed: &BTreeSet<PathBuf>,
    findings: &mut Findings,
) -> usize {
    let (patterns, errors) = compile_excludes(config);
    for err in errors {
        findings.push(Finding::warning(
            FindingKind::SweepFailure,
            err.format_human_readable(),
        ));
    }

    let mut walked = 0;
    let mut swept_dirs: Vec<&Path> = Vec::new();
    for dir in [&config.config_dir, &config.data_dir, &config.lang_dir] {
        if swept_dirs.contains(&dir.as_path()) {
            continue;
        }
        swept_dirs.push(dir);
        walked += sweep_dir(config, dir, &patterns, claimed, findings);
    }
    walked
}

fn sweep_dir(
    config: &ValidationConfig,
    dir: &Path,
    patterns: &[Pattern],
    claimed: &BTreeSet<PathBuf>,
    findings: &mut Findings,
) -> usize {
    let (files, errors) = find_json_files(config, dir, patterns);

    for err in errors {
        findings.push(
            Finding::warning(
                FindingKind::SweepFailure,
                format!("sweep of {} incomplete: {}", dir.display(), err.format_human_readable()),
            )
            .at(&err.file),
        );
    }

    let is_data_dir = dir == config.data_dir.as_path();
    for file in files.iter().filter(|file| !claimed.contains(*file)) {
        if let Err(err) = read_json(config, file) {
            findings.push(err.into_finding(LABEL));
        }
        if is_data_dir {
            findings.push(
                Finding::warning(
                    FindingKind::UnusedDataFile,
                    format!("unused data file: {}", file.display()),
                )
                .at(file),
            );
        }
    }

    tracing::debug!(dir = %dir.display(), files = files.len(), "swept directory");
    files.len()
}

//! Orphan pass: items present in a collection but referenced by no category.

use crate::check::items::ItemIndex;
use crate::check::references::ReferencedSet;
use crate::finding::{Finding, FindingKind, Findings};

/// Warn about every indexed item missing from `referenced`, in index order.
/// Returns the number of orphans found.
pub fn report_orphans(index: &ItemIndex, referenced: &ReferencedSet, findings: &mut Findings) -> usize {
    if referenced.is_empty() && !index.is_empty() {
        tracing::warn!(items = index.len(), "no category references any item");
    }

    let mut orphans = 0;
    for item in index.iter().filter(|item| !referenced.contains(&item.id)) {
        findings.push(
            Finding::warning(
                FindingKind::OrphanItem,
                format!(
                    "item '{}' in media type '{}' is not referenced by any category",
                    item.id, item.media_type
                ),
            )
            .at(&item.file),
        );
        orphans += 1;
    }
    orphans
}

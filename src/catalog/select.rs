//! Picks the lectures the user asked for.

use super::record::LectureRecord;
use std::collections::HashSet;

/// Return the records whose title is in `wanted`, in catalog order.
///
/// Titles that match no record are dropped without error.
pub fn select(records: &[LectureRecord], wanted: &HashSet<String>) -> Vec<LectureRecord> {
    if wanted.is_empty() {
        return Vec::new();
    }

    records
        .iter()
        .filter(|r| wanted.contains(&r.title))
        .cloned()
        .collect()
}

//! Reconciliation engine.
//!
//! Turns two raw record lists into a deterministic, ordered comparison
//! table: per-side maps from normalized name to original names, a
//! match/missing status per distinct device, and summary counts.
//!
//! The engine never fails. Records whose name field is absent or empty are
//! data, not faults: they are silently excluded from matching and from the
//! counts.

use crate::normalize::{normalize_with, MAX_NAME_WIDTH};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Match classification for one normalized device key.
///
/// "Left" and "right" map to whichever concrete services are wired in;
/// presentation layers translate these to user-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// The key exists on both sides.
    Matched,
    /// Only the left side has the key.
    MissingOnRight,
    /// Only the right side has the key.
    MissingOnLeft,
}

/// Which status group sorts first in the final row order.
///
/// Both conventions exist in the wild; the choice is explicit rather than
/// silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Problems at the top, matches below (default).
    #[default]
    MismatchesFirst,
    /// Matches at the top, problems below.
    MatchesFirst,
}

/// Tuning knobs for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Row ordering convention.
    pub sort_order: SortOrder,
    /// Maximum width of the normalized comparison key, in characters.
    pub max_key_width: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            sort_order: SortOrder::default(),
            max_key_width: MAX_NAME_WIDTH,
        }
    }
}

/// One output line: the original names seen on each side for a normalized
/// key, and the match status. Display strings are the `"; "`-joined,
/// lexicographically sorted originals (empty when the side has no entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub left: String,
    pub right: String,
    pub status: MatchStatus,
}

/// Full ordered comparison output.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Ordered comparison rows.
    pub rows: Vec<ComparisonRow>,
    /// Distinct normalized keys present on the left side (duplicates by
    /// key count once).
    pub left_count: usize,
    /// Distinct normalized keys present on the right side.
    pub right_count: usize,
}

/// Map from normalized key to the set of trimmed original names that
/// produced it. The BTree types give lexicographic key iteration and
/// sorted display joins directly.
pub type SideMap = BTreeMap<String, BTreeSet<String>>;

/// Build one side's map from records via that side's name accessor.
///
/// Records whose accessor yields no name, or a name that normalizes to
/// nothing, are skipped. Duplicate raw names collapse (set semantics), and
/// different raw spellings of the same normalized key group under one entry.
pub fn build_side_map<T>(
    records: &[T],
    name_of: impl Fn(&T) -> Option<&str>,
    max_key_width: usize,
) -> SideMap {
    let mut map = SideMap::new();
    for record in records {
        let Some(raw) = name_of(record) else { continue };
        let Some(key) = normalize_with(raw, max_key_width) else {
            continue;
        };
        map.entry(key).or_default().insert(raw.trim().to_string());
    }
    map
}

/// Reconcile two raw record lists into a [`ComparisonResult`].
pub fn reconcile<L, R>(
    left: &[L],
    right: &[R],
    left_name: impl Fn(&L) -> Option<&str>,
    right_name: impl Fn(&R) -> Option<&str>,
    options: &ReconcileOptions,
) -> ComparisonResult {
    let left_map = build_side_map(left, left_name, options.max_key_width);
    let right_map = build_side_map(right, right_name, options.max_key_width);
    reconcile_maps(&left_map, &right_map, options)
}

/// Reconcile two pre-built side maps.
pub fn reconcile_maps(
    left_map: &SideMap,
    right_map: &SideMap,
    options: &ReconcileOptions,
) -> ComparisonResult {
    // Union of keys in lexicographic order; the final row order is imposed
    // by the sort below, this just makes row construction deterministic.
    let all_keys: BTreeSet<&String> = left_map.keys().chain(right_map.keys()).collect();

    let mut rows = Vec::with_capacity(all_keys.len());
    for key in all_keys {
        let left_names = left_map.get(key);
        let right_names = right_map.get(key);

        let status = match (left_names, right_names) {
            (Some(_), Some(_)) => MatchStatus::Matched,
            (Some(_), None) => MatchStatus::MissingOnRight,
            (None, Some(_)) => MatchStatus::MissingOnLeft,
            (None, None) => unreachable!("key came from the union of both maps"),
        };

        rows.push(ComparisonRow {
            left: join_names(left_names),
            right: join_names(right_names),
            status,
        });
    }

    let matched_group = match options.sort_order {
        SortOrder::MismatchesFirst => 1u8,
        SortOrder::MatchesFirst => 0u8,
    };
    rows.sort_by_cached_key(|row| {
        let group = if row.status == MatchStatus::Matched {
            matched_group
        } else {
            1 - matched_group
        };
        (group, row.left.to_lowercase(), row.right.to_lowercase())
    });

    ComparisonResult {
        rows,
        left_count: left_map.len(),
        right_count: right_map.len(),
    }
}

fn join_names(names: Option<&BTreeSet<String>>) -> String {
    match names {
        Some(set) => set.iter().cloned().collect::<Vec<_>>().join("; "),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rec {
        name: Option<String>,
    }

    fn rec(name: &str) -> Rec {
        Rec {
            name: Some(name.to_string()),
        }
    }

    fn name_of(r: &Rec) -> Option<&str> {
        r.name.as_deref()
    }

    fn run(left: &[Rec], right: &[Rec]) -> ComparisonResult {
        reconcile(left, right, name_of, name_of, &ReconcileOptions::default())
    }

    #[test]
    fn test_case_varied_names_match() {
        let result = run(&[rec("WORKSTATION-001")], &[rec("workstation-001")]);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].status, MatchStatus::Matched);
        assert_eq!(result.left_count, 1);
        assert_eq!(result.right_count, 1);
    }

    #[test]
    fn test_left_only_is_missing_on_right() {
        let result = run(&[rec("ORPHAN-PC")], &[]);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].status, MatchStatus::MissingOnRight);
        assert_eq!(result.rows[0].left, "ORPHAN-PC");
        assert_eq!(result.rows[0].right, "");
        assert_eq!(result.left_count, 1);
        assert_eq!(result.right_count, 0);
    }

    #[test]
    fn test_right_only_is_missing_on_left() {
        let result = run(&[], &[rec("GHOST-PC")]);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].status, MatchStatus::MissingOnLeft);
        assert_eq!(result.rows[0].left, "");
        assert_eq!(result.rows[0].right, "GHOST-PC");
    }

    #[test]
    fn test_duplicates_collapse_into_one_entry() {
        // Three raw spellings, one normalized key, duplicate literal name.
        let left = vec![rec("LAPTOP-9"), rec("laptop-9 "), rec("LAPTOP-9")];
        let result = run(&left, &[]);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.left_count, 1, "duplicates contribute one key");
        assert_eq!(result.rows[0].left, "LAPTOP-9; laptop-9");
    }

    #[test]
    fn test_display_join_is_sorted() {
        let left = vec![rec("srv-db Z"), rec("SRV-DB a")];
        let map = build_side_map(&left, name_of, 6);

        let names = map.get("srv-db").expect("key should exist");
        let joined: Vec<&String> = names.iter().collect();
        assert_eq!(joined, ["SRV-DB a", "srv-db Z"]);
    }

    #[test]
    fn test_truncated_names_group_under_one_key() {
        // Identical in the first 15 characters, so they are the same device
        // key even though the raw names differ beyond it.
        let left = vec![rec("WORKSTATION-00199"), rec("WORKSTATION-00188")];
        let result = run(&left, &[]);

        assert_eq!(result.left_count, 1);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_absent_and_empty_names_are_skipped() {
        let left = vec![Rec { name: None }, rec(""), rec("   "), rec("REAL-PC")];
        let result = run(&left, &[]);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.left_count, 1);
        assert_eq!(result.rows[0].left, "REAL-PC");
    }

    #[test]
    fn test_mismatches_sort_before_matches_by_default() {
        let left = vec![rec("AAA-MATCHED"), rec("ZZZ-ORPHAN")];
        let right = vec![rec("aaa-matched")];
        let result = run(&left, &right);

        assert_eq!(result.rows[0].status, MatchStatus::MissingOnRight);
        assert_eq!(result.rows[1].status, MatchStatus::Matched);
    }

    #[test]
    fn test_matches_first_mode_inverts_grouping() {
        let left = vec![rec("AAA-ORPHAN"), rec("ZZZ-MATCHED")];
        let right = vec![rec("zzz-matched")];
        let options = ReconcileOptions {
            sort_order: SortOrder::MatchesFirst,
            ..Default::default()
        };
        let result = reconcile(&left, &right, name_of, name_of, &options);

        assert_eq!(result.rows[0].status, MatchStatus::Matched);
        assert_eq!(result.rows[1].status, MatchStatus::MissingOnRight);
    }

    #[test]
    fn test_rows_ordered_case_insensitively_within_group() {
        let left = vec![rec("bravo"), rec("Alpha"), rec("charlie")];
        let result = run(&left, &[]);

        let names: Vec<&str> = result.rows.iter().map(|r| r.left.as_str()).collect();
        assert_eq!(names, ["Alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_ties_broken_by_right_display() {
        // Two missing-on-left rows with empty left displays; the right
        // display decides the order.
        let right = vec![rec("beta"), rec("alpha")];
        let result = run(&[], &right);

        assert_eq!(result.rows[0].right, "alpha");
        assert_eq!(result.rows[1].right, "beta");
    }

    #[test]
    fn test_counts_are_distinct_keys_not_records() {
        let left = vec![rec("PC-1"), rec("pc-1"), rec("PC-2")];
        let right = vec![rec("PC-2"), rec("PC-3"), rec("PC-3 ")];
        let result = run(&left, &right);

        assert_eq!(result.left_count, 2);
        assert_eq!(result.right_count, 2);
    }

    #[test]
    fn test_empty_inputs_produce_empty_result() {
        let result = run(&[], &[]);

        assert!(result.rows.is_empty());
        assert_eq!(result.left_count, 0);
        assert_eq!(result.right_count, 0);
    }

    #[test]
    fn test_mixed_scenario() {
        let left = vec![rec("BOTH-PC"), rec("LEFT-ONLY"), rec("  both-pc  ")];
        let right = vec![rec("both-pc"), rec("RIGHT-ONLY")];
        let result = run(&left, &right);

        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.left_count, 2);
        assert_eq!(result.right_count, 2);

        let matched: Vec<_> = result
            .rows
            .iter()
            .filter(|r| r.status == MatchStatus::Matched)
            .collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].left, "BOTH-PC; both-pc");
        assert_eq!(matched[0].right, "both-pc");
    }
}

//! Aggregate record store with per-column filtering and tri-state sorting
//!
//! The store only grows through [`RecordStore::ingest`] or is emptied
//! wholesale by [`RecordStore::clear`]. [`RecordStore::view`] derives the
//! filtered and sorted projection from the current state on every call.

use crate::record::{Column, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sort direction of the active sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    /// Next direction in the `none -> ascending -> descending -> none` cycle
    pub fn next(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
        }
    }
}

/// Sort configuration: at most one column is sorted at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<Column>,
    pub direction: SortDirection,
}

impl SortState {
    /// State after a sort request on `column`
    ///
    /// The same column advances through the cycle; a different column
    /// starts over at ascending.
    pub fn cycled(self, column: Column) -> Self {
        let direction = if self.column == Some(column) {
            self.direction.next()
        } else {
            SortDirection::Ascending
        };
        Self {
            column: Some(column),
            direction,
        }
    }

    /// True when a column is set and the direction is not `None`
    pub fn is_active(&self) -> bool {
        self.column.is_some() && self.direction != SortDirection::None
    }
}

/// Per-column substring patterns, AND-combined. Missing or empty = no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    patterns: BTreeMap<Column, String>,
}

impl FilterState {
    /// Returns true if no column carries a pattern.
    pub fn is_empty(&self) -> bool {
        self.patterns.values().all(|p| p.is_empty())
    }

    /// Replace the pattern for one column
    pub fn set(&mut self, column: Column, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if pattern.is_empty() {
            self.patterns.remove(&column);
        } else {
            self.patterns.insert(column, pattern);
        }
    }

    /// Current pattern for a column, empty if none
    pub fn get(&self, column: Column) -> &str {
        self.patterns.get(&column).map(String::as_str).unwrap_or("")
    }

    /// Case-insensitive substring match on every column
    pub fn matches(&self, record: &Record) -> bool {
        self.patterns.iter().all(|(column, pattern)| {
            column
                .value(record)
                .to_lowercase()
                .contains(&pattern.to_lowercase())
        })
    }
}

/// The aggregate collection plus its filter and sort configuration
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    filters: FilterState,
    sort: SortState,
    ingested: bool,
}

impl RecordStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records from one or more parsed documents
    pub fn ingest(&mut self, records: impl IntoIterator<Item = Record>) {
        let before = self.records.len();
        self.records.extend(records);
        self.ingested = true;
        tracing::debug!(
            added = self.records.len() - before,
            total = self.records.len(),
            "ingested records"
        );
    }

    /// Drop all records and reset filters and sort
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace the substring pattern for one column
    pub fn set_filter(&mut self, column: Column, pattern: impl Into<String>) {
        self.filters.set(column, pattern);
    }

    /// Advance the sort state for `column`
    pub fn cycle_sort(&mut self, column: Column) {
        self.sort = self.sort.cycled(column);
    }

    /// Replace the sort state wholesale
    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// All records in insertion order, unfiltered
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether anything has been ingested since creation or the last clear
    pub fn has_ingested(&self) -> bool {
        self.ingested
    }

    /// Filtered, then sorted, records
    pub fn view(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| self.filters.matches(r))
            .collect();

        if let Some(column) = self.sort.column.filter(|_| self.sort.is_active()) {
            // sort_by is stable, equal keys keep insertion order
            rows.sort_by(|a, b| {
                let ord = compare_values(column.value(a), column.value(b));
                match self.sort.direction {
                    SortDirection::Descending => ord.reverse(),
                    _ => ord,
                }
            });
        }

        rows
    }
}

/// Compare two cell values: numerically when both are finite numbers,
/// with a locale-style string collation when neither is. Numbers sort
/// before text so mixed columns still form a total order.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => collate(a, b),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Accent- and case-insensitive first, then accents, then lowercase before
/// uppercase, then raw code points.
fn collate(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> Vec<char> {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(fold_diacritic)
            .collect()
    };
    let secondary = |s: &str| -> Vec<char> { s.chars().flat_map(char::to_lowercase).collect() };
    // false (lowercase) sorts before true (uppercase)
    let tertiary = |s: &str| -> Vec<bool> { s.chars().map(char::is_uppercase).collect() };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| secondary(a).cmp(&secondary(b)))
        .then_with(|| tertiary(a).cmp(&tertiary(b)))
        .then_with(|| a.cmp(b))
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(code: &str, description: &str, quantity: &str) -> Record {
        Record {
            source_document: "test.txt".to_string(),
            entity_name: "Acme".to_string(),
            code: code.to_string(),
            description: description.to_string(),
            quantity: quantity.to_string(),
            discount: "0".to_string(),
        }
    }

    fn quantities(store: &RecordStore) -> Vec<&str> {
        store.view().iter().map(|r| r.quantity.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let mut store = RecordStore::new();
        store.ingest(vec![
            make_record("1234567890", "A", "1"),
            make_record("9999999999", "B", "2"),
        ]);
        assert_eq!(store.view().len(), 2);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let mut store = RecordStore::new();
        store.ingest(vec![
            make_record("1234567890", "Widget FAST", "1"),
            make_record("9999999999", "gadget", "2"),
        ]);
        store.set_filter(Column::Description, "fast");
        let view = store.view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].description, "Widget FAST");
    }

    #[test]
    fn test_filters_are_and_combined() {
        let mut store = RecordStore::new();
        store.ingest(vec![
            make_record("1230000000", "Widget", "1"),
            make_record("1239999999", "Gadget", "2"),
            make_record("4560000000", "Widget", "3"),
        ]);
        store.set_filter(Column::Code, "123");
        store.set_filter(Column::Description, "");
        assert_eq!(quantities(&store), vec!["1", "2"]);

        store.set_filter(Column::Description, "widget");
        assert_eq!(quantities(&store), vec!["1"]);
    }

    #[test]
    fn test_set_filter_replaces_previous_pattern() {
        let mut store = RecordStore::new();
        store.ingest(vec![make_record("1234567890", "Widget", "1")]);
        store.set_filter(Column::Description, "nomatch");
        assert!(store.view().is_empty());
        store.set_filter(Column::Description, "wid");
        assert_eq!(store.view().len(), 1);
        assert_eq!(store.filters().get(Column::Description), "wid");
    }

    #[test]
    fn test_numeric_sort_cycle() {
        let mut store = RecordStore::new();
        store.ingest(vec![
            make_record("1", "a", "9"),
            make_record("2", "b", "10"),
            make_record("3", "c", "2"),
        ]);

        store.cycle_sort(Column::Quantity);
        assert_eq!(quantities(&store), vec!["2", "9", "10"]);

        store.cycle_sort(Column::Quantity);
        assert_eq!(quantities(&store), vec!["10", "9", "2"]);

        store.cycle_sort(Column::Quantity);
        assert_eq!(store.sort().direction, SortDirection::None);
        assert_eq!(quantities(&store), vec!["9", "10", "2"]);
    }

    #[test]
    fn test_switching_column_resets_to_ascending() {
        let mut store = RecordStore::new();
        store.cycle_sort(Column::Quantity);
        store.cycle_sort(Column::Quantity);
        store.cycle_sort(Column::Code);
        assert_eq!(
            store.sort(),
            SortState {
                column: Some(Column::Code),
                direction: SortDirection::Ascending,
            }
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let mut store = RecordStore::new();
        store.ingest(vec![
            make_record("1", "first", "5"),
            make_record("2", "second", "1"),
            make_record("3", "third", "5"),
        ]);
        store.cycle_sort(Column::Quantity);
        let codes: Vec<&str> = store.view().iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_string_sort_is_locale_style() {
        let mut store = RecordStore::new();
        store.ingest(vec![
            make_record("1", "zeta", "1"),
            make_record("2", "Árbol", "1"),
            make_record("3", "banana", "1"),
            make_record("4", "Banana", "1"),
        ]);
        store.cycle_sort(Column::Description);
        let names: Vec<&str> = store.view().iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, vec!["Árbol", "banana", "Banana", "zeta"]);
    }

    #[test]
    fn test_mixed_values_fall_back_to_strings() {
        assert_eq!(compare_values("10", "9"), Ordering::Greater);
        assert_eq!(compare_values("12.50", "12.5"), Ordering::Equal);
        assert_eq!(compare_values("10", "abc"), Ordering::Less);
        assert_eq!(compare_values("inf", "9"), Ordering::Greater);
        assert_eq!(compare_values("1a", "9"), Ordering::Greater);
    }

    #[test]
    fn test_numbers_before_text_is_transitive() {
        assert_eq!(compare_values("9", "10"), Ordering::Less);
        assert_eq!(compare_values("10", "1a"), Ordering::Less);
        assert_eq!(compare_values("9", "1a"), Ordering::Less);
    }

    #[test]
    fn test_sort_mixed_column_is_consistent() {
        let values = ["10", "9", "1a", "100", "2b", "5", "x", "20", "3c", "7", "Árbol", "-1.5"];
        let records: Vec<Record> = (0..300)
            .map(|i| make_record(&i.to_string(), values[(i * 7) % values.len()], "1"))
            .collect();

        let mut store = RecordStore::new();
        store.ingest(records);

        store.cycle_sort(Column::Description);
        let ascending: Vec<&str> = store.view().iter().map(|r| r.description.as_str()).collect();
        assert_eq!(ascending.len(), 300);
        assert!(ascending
            .windows(2)
            .all(|w| compare_values(w[0], w[1]) != Ordering::Greater));
        assert_eq!(ascending[0], "-1.5");
        assert_eq!(ascending[299], "x");

        store.cycle_sort(Column::Description);
        let descending: Vec<&str> = store.view().iter().map(|r| r.description.as_str()).collect();
        assert!(descending
            .windows(2)
            .all(|w| compare_values(w[0], w[1]) != Ordering::Less));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut store = RecordStore::new();
        assert!(!store.has_ingested());
        store.ingest(vec![make_record("1", "a", "1")]);
        store.set_filter(Column::Code, "1");
        store.cycle_sort(Column::Code);

        store.clear();

        assert!(store.view().is_empty());
        assert!(store.filters().is_empty());
        assert_eq!(store.sort(), SortState::default());
        assert!(!store.has_ingested());
    }

    #[test]
    fn test_empty_ingest_marks_attempted() {
        let mut store = RecordStore::new();
        store.ingest(Vec::new());
        assert!(store.has_ingested());
        assert!(store.is_empty());
    }
}

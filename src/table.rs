//! Table pagination, search, filter and sort state.
//!
//! One `TableQuery` drives a table either client-side (`apply` over a
//! loaded slice) or server-side (`to_query_pairs` sent with the request
//! and `PageInfo::from_meta` read back from the response).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::models::PageMeta;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Column to sort by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Comparable value extracted from a row for sorting.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Missing,
}

impl SortKey {
    pub fn text(value: &str) -> Self {
        SortKey::Text(value.to_lowercase())
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            // Missing values sort last regardless of direction of the others.
            (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
            (SortKey::Missing, _) => Ordering::Greater,
            (_, SortKey::Missing) => Ordering::Less,
            _ => self.partial_cmp(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl<T: Into<SortKey>> From<Option<T>> for SortKey {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SortKey::Missing)
    }
}

impl From<NaiveDate> for SortKey {
    fn from(value: NaiveDate) -> Self {
        SortKey::Date(value)
    }
}

impl From<NaiveTime> for SortKey {
    fn from(value: NaiveTime) -> Self {
        SortKey::Time(value)
    }
}

impl From<i64> for SortKey {
    fn from(value: i64) -> Self {
        SortKey::Number(value as f64)
    }
}

/// Rows that can be searched, filtered and sorted client-side.
pub trait Tabular {
    /// Whether the row matches a lowercase search needle.
    fn matches_search(&self, needle: &str) -> bool;

    /// Value compared against a filter of the given key.
    fn filter_value(&self, key: &str) -> Option<String>;

    /// Sort key for a column.
    fn sort_key(&self, column: &str) -> SortKey;
}

/// Pagination state derived from a row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// 0-based page index.
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
}

impl PageInfo {
    /// Number of pages, at least 1 so an empty table still shows "page 1 of 1".
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        self.total_rows.div_ceil(self.page_size).max(1)
    }

    /// 1-based index of the first row on this page, 0 when empty.
    pub fn first_row(&self) -> usize {
        if self.total_rows == 0 {
            0
        } else {
            self.page * self.page_size + 1
        }
    }

    /// 1-based index of the last row on this page, 0 when empty.
    pub fn last_row(&self) -> usize {
        ((self.page + 1) * self.page_size).min(self.total_rows)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    /// Convert backend metadata (1-based page) to page info.
    pub fn from_meta(meta: &PageMeta) -> Self {
        Self {
            page: meta.page.saturating_sub(1),
            page_size: meta.per_page,
            total_rows: meta.total,
        }
    }

    /// "Showing 11-20 of 57"
    pub fn summary(&self) -> String {
        format!("Showing {}-{} of {}", self.first_row(), self.last_row(), self.total_rows)
    }
}

/// One page of filtered rows.
#[derive(Debug, Clone)]
pub struct PageView<'a, T> {
    pub rows: Vec<&'a T>,
    pub info: PageInfo,
    /// Rows before filtering.
    pub unfiltered: usize,
}

/// Search, filter, sort and pagination state of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub search: String,
    pub filters: BTreeMap<String, String>,
    pub sort: Option<SortSpec>,
    /// 0-based page index.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self::new(10)
    }
}

impl TableQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    /// Update the search text; returns to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
    }

    /// Set or clear (`None` / empty) a filter; returns to the first page.
    pub fn set_filter(&mut self, key: &str, value: Option<&str>) {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => {
                self.filters.insert(key.to_string(), v.to_string());
            }
            None => {
                self.filters.remove(key);
            }
        }
        self.page = 0;
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Drop search and filters; returns to the first page.
    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.filters.clear();
        self.page = 0;
    }

    pub fn has_filters(&self) -> bool {
        !self.search.trim().is_empty() || !self.filters.is_empty()
    }

    /// Toggle sorting on a column: ascending, then descending, then off.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.column == column => match spec.direction {
                SortDirection::Asc => Some(SortSpec {
                    column: spec.column,
                    direction: SortDirection::Desc,
                }),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec {
                column: column.to_string(),
                direction: SortDirection::Asc,
            }),
        };
    }

    /// Change the page size keeping the first visible row on screen.
    pub fn set_page_size(&mut self, page_size: usize) {
        let page_size = page_size.max(1);
        let first_row = self.page * self.page_size;
        self.page = first_row / page_size;
        self.page_size = page_size;
    }

    pub fn next_page(&mut self, info: &PageInfo) {
        if info.has_next() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn go_to(&mut self, page: usize, info: &PageInfo) {
        self.page = page.min(info.page_count() - 1);
    }

    /// Client-side: filter, sort and slice the current page.
    ///
    /// The stored page index is clamped when the filtered set shrinks.
    pub fn apply<'a, T: Tabular>(&mut self, rows: &'a [T]) -> PageView<'a, T> {
        let needle = self.search.trim().to_lowercase();

        let mut filtered: Vec<&T> = rows
            .iter()
            .filter(|row| needle.is_empty() || row.matches_search(&needle))
            .filter(|row| {
                self.filters.iter().all(|(key, expected)| {
                    row.filter_value(key)
                        .is_some_and(|actual| actual.eq_ignore_ascii_case(expected))
                })
            })
            .collect();

        if let Some(spec) = &self.sort {
            filtered.sort_by(|a, b| {
                let ka = a.sort_key(&spec.column);
                let kb = b.sort_key(&spec.column);
                match (spec.direction, &ka, &kb) {
                    (_, SortKey::Missing, _) | (_, _, SortKey::Missing) => ka.compare(&kb),
                    (SortDirection::Asc, _, _) => ka.compare(&kb),
                    (SortDirection::Desc, _, _) => kb.compare(&ka),
                }
            });
        }

        let mut info = PageInfo {
            page: self.page,
            page_size: self.page_size,
            total_rows: filtered.len(),
        };
        if info.page >= info.page_count() {
            info.page = info.page_count() - 1;
            self.page = info.page;
        }

        let start = (info.page * info.page_size).min(filtered.len());
        let end = (start + info.page_size).min(filtered.len());

        PageView {
            rows: filtered[start..end].to_vec(),
            info,
            unfiltered: rows.len(),
        }
    }

    /// Server-side: query parameters for a list endpoint.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), (self.page + 1).to_string()),
            ("per_page".to_string(), self.page_size.to_string()),
        ];

        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search".to_string(), search.to_string()));
        }

        if let Some(spec) = &self.sort {
            pairs.push(("sort".to_string(), spec.column.clone()));
            pairs.push(("order".to_string(), spec.direction.as_str().to_string()));
        }

        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }

        pairs
    }

    /// Server-side: adopt the page the backend actually returned.
    ///
    /// `rows` is the number of records that came back with `meta`.
    pub fn sync_from_meta(&mut self, meta: &PageMeta, rows: usize) -> PageSync {
        let mut info = PageInfo::from_meta(meta);
        let clamped = info.page >= info.page_count();
        if clamped {
            info.page = info.page_count() - 1;
        }
        self.page = info.page;
        PageSync {
            info,
            refetch: clamped && rows == 0 && info.total_rows > 0,
        }
    }
}

/// Outcome of [`TableQuery::sync_from_meta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSync {
    pub info: PageInfo,
    /// The requested page lay past the end and came back empty; the query
    /// now points at the last page, which still has to be fetched.
    pub refetch: bool,
}

/// Element of a pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// 0-based page index.
    Page(usize),
    Ellipsis,
}

/// Pagination bar items: first and last page always, `siblings` pages on
/// each side of `current`, and an ellipsis for every gap wider than one page.
pub fn page_items(current: usize, page_count: usize, siblings: usize) -> Vec<PageItem> {
    if page_count == 0 {
        return Vec::new();
    }
    let last = page_count - 1;
    let current = current.min(last);

    let lo = current.saturating_sub(siblings);
    let hi = (current + siblings).min(last);

    let mut pages: Vec<usize> = vec![0];
    pages.extend(lo..=hi);
    pages.push(last);
    pages.sort_unstable();
    pages.dedup();

    let mut items = Vec::with_capacity(pages.len() + 2);
    let mut prev: Option<usize> = None;
    for page in pages {
        if let Some(p) = prev {
            match page - p {
                1 => {}
                // A gap of exactly one page shows that page instead of "...".
                2 => items.push(PageItem::Page(p + 1)),
                _ => items.push(PageItem::Ellipsis),
            }
        }
        items.push(PageItem::Page(page));
        prev = Some(page);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Row {
        name: &'static str,
        dept: &'static str,
        joined: Option<NaiveDate>,
    }

    impl Tabular for Row {
        fn matches_search(&self, needle: &str) -> bool {
            self.name.to_lowercase().contains(needle)
        }

        fn filter_value(&self, key: &str) -> Option<String> {
            match key {
                "dept" => Some(self.dept.to_string()),
                _ => None,
            }
        }

        fn sort_key(&self, column: &str) -> SortKey {
            match column {
                "name" => SortKey::text(self.name),
                "joined" => self.joined.into(),
                _ => SortKey::Missing,
            }
        }
    }

    fn rows() -> Vec<Row> {
        let d = |m| NaiveDate::from_ymd_opt(2026, m, 1);
        vec![
            Row { name: "Andi", dept: "IT", joined: d(3) },
            Row { name: "budi", dept: "HR", joined: None },
            Row { name: "Citra", dept: "IT", joined: d(1) },
            Row { name: "Dewi", dept: "Finance", joined: d(2) },
            Row { name: "Eka", dept: "it", joined: d(5) },
        ]
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let data = rows();
        let mut query = TableQuery::new(10);
        query.set_search("  BUD ");
        let view = query.apply(&data);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "budi");
        assert_eq!(view.unfiltered, 5);
    }

    #[test]
    fn test_filter_matches_ignoring_case() {
        let data = rows();
        let mut query = TableQuery::new(10);
        query.set_filter("dept", Some("IT"));
        let names: Vec<_> = query.apply(&data).rows.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Andi", "Citra", "Eka"]);

        query.set_filter("dept", Some(""));
        assert_eq!(query.apply(&data).rows.len(), 5);
    }

    #[test]
    fn test_sort_desc_keeps_missing_last() {
        let data = rows();
        let mut query = TableQuery::new(10);
        query.toggle_sort("joined");
        query.toggle_sort("joined");
        let names: Vec<_> = query.apply(&data).rows.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Eka", "Andi", "Dewi", "Citra", "budi"]);

        query.toggle_sort("joined");
        assert!(query.sort.is_none());
    }

    #[test]
    fn test_page_clamped_after_filter_shrinks() {
        let data = rows();
        let mut query = TableQuery::new(2);
        query.page = 2;
        let view = query.apply(&data);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.info.first_row(), 5);

        query.filters.insert("dept".to_string(), "Finance".to_string());
        let view = query.apply(&data);
        assert_eq!(view.info.page, 0);
        assert_eq!(query.page, 0);
        assert_eq!(view.rows[0].name, "Dewi");
    }

    #[test]
    fn test_filters_reset_page() {
        let mut query = TableQuery::new(10);
        query.page = 4;
        query.set_search("x");
        assert_eq!(query.page, 0);

        query.page = 3;
        query.set_filter("status", Some("active"));
        assert_eq!(query.page, 0);

        query.page = 2;
        query.clear_filters();
        assert_eq!(query.page, 0);
        assert!(!query.has_filters());
    }

    #[test]
    fn test_page_size_change_keeps_first_row() {
        let mut query = TableQuery::new(10);
        query.page = 3; // rows 31..40
        query.set_page_size(20);
        assert_eq!(query.page, 1); // rows 21..40
        query.set_page_size(5);
        assert_eq!(query.page, 4); // rows 21..25
    }

    #[test]
    fn test_empty_page_info() {
        let info = PageInfo {
            page: 0,
            page_size: 10,
            total_rows: 0,
        };
        assert_eq!(info.page_count(), 1);
        assert_eq!(info.first_row(), 0);
        assert_eq!(info.last_row(), 0);
        assert!(!info.has_next());
        assert_eq!(info.summary(), "Showing 0-0 of 0");
    }

    #[test]
    fn test_query_pairs() {
        let mut query = TableQuery::new(20);
        query.page = 1;
        query.set_search("  siti ");
        query.page = 1;
        query.set_filter("status", Some("active"));
        query.page = 1;
        query.toggle_sort("join_date");

        let pairs = query.to_query_pairs();
        let expected: Vec<(String, String)> = [
            ("page", "2"),
            ("per_page", "20"),
            ("search", "siti"),
            ("sort", "join_date"),
            ("order", "asc"),
            ("status", "active"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_sync_from_meta_clamps_past_end() {
        let mut query = TableQuery::new(10);
        query.page = 9;
        let sync = query.sync_from_meta(
            &PageMeta {
                page: 10,
                per_page: 10,
                total: 25,
            },
            0,
        );
        assert_eq!(sync.info.page_count(), 3);
        assert_eq!(sync.info.page, 2);
        assert_eq!(query.page, 2);
        assert!(sync.refetch);
    }

    #[test]
    fn test_sync_from_meta_refetches_after_last_row_deleted() {
        // 11 rows at 10 per page, the only row on page 2 was deleted.
        let mut query = TableQuery::new(10);
        query.page = 1;
        let meta = PageMeta {
            page: 2,
            per_page: 10,
            total: 10,
        };

        let sync = query.sync_from_meta(&meta, 0);
        assert!(sync.refetch);
        assert_eq!(query.page, 0);
        assert_eq!(query.to_query_pairs()[0], ("page".to_string(), "1".to_string()));

        let sync = query.sync_from_meta(
            &PageMeta {
                page: 1,
                per_page: 10,
                total: 10,
            },
            10,
        );
        assert!(!sync.refetch);
        assert_eq!(sync.info.summary(), "Showing 1-10 of 10");
    }

    #[test]
    fn test_sync_from_meta_empty_table_does_not_refetch() {
        let mut query = TableQuery::new(10);
        query.page = 3;
        let sync = query.sync_from_meta(
            &PageMeta {
                page: 4,
                per_page: 10,
                total: 0,
            },
            0,
        );
        assert!(!sync.refetch);
        assert_eq!(query.page, 0);
    }

    #[test]
    fn test_page_items() {
        use PageItem::*;
        assert_eq!(page_items(0, 1, 1), vec![Page(0)]);
        assert_eq!(page_items(0, 3, 1), vec![Page(0), Page(1), Page(2)]);
        assert_eq!(
            page_items(5, 10, 1),
            vec![Page(0), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(9)]
        );
        assert_eq!(
            page_items(2, 10, 1),
            vec![Page(0), Page(1), Page(2), Page(3), Ellipsis, Page(9)]
        );
        assert!(page_items(0, 0, 1).is_empty());
    }
}

//! Search filter and client-side paging
//!
//! The visible rows are always derived from the store contents, the search
//! term and the page number; nothing here is cached.

use crate::core::record::Record;
use crate::schema::EntitySchema;

/// Rows per page
pub const PAGE_SIZE: usize = 10;

/// Records whose display field contains `search`, ignoring case.
/// An empty search keeps everything.
pub fn filter<'a>(schema: &EntitySchema, records: &'a [Record], search: &str) -> Vec<&'a Record> {
    let needle = search.to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || schema.display_value(r).to_lowercase().contains(&needle))
        .collect()
}

/// Number of pages needed for `count` rows; an empty list still has one page
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// One page of filtered rows
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub rows: Vec<&'a Record>,
    /// 1-based page number
    pub number: usize,
    pub total_pages: usize,
    /// Rows matching the filter across all pages
    pub total_matches: usize,
}

impl Page<'_> {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

/// Slice `[(number-1)*page_size, number*page_size)` out of the filtered rows.
/// A page past the end is empty.
pub fn paginate<'a>(filtered: Vec<&'a Record>, number: usize, page_size: usize) -> Page<'a> {
    let number = number.max(1);
    let total_matches = filtered.len();
    let start = (number - 1).saturating_mul(page_size);
    let rows = filtered.into_iter().skip(start).take(page_size).collect();
    Page {
        rows,
        number,
        total_pages: total_pages(total_matches, page_size),
        total_matches,
    }
}

/// Search term and current page of one list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search: String,
    page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at an explicit search and page, without clamping
    pub fn at(search: impl Into<String>, page: usize) -> Self {
        Self {
            search: search.into(),
            page: page.max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Change the search term. A different term starts over at page 1 so a
    /// narrower filter never strands the view on an empty page.
    pub fn set_search(&mut self, search: &str) {
        if self.search != search {
            self.search = search.to_string();
            self.page = 1;
        }
    }

    /// Next page; stays put on the last page
    pub fn next(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    /// Previous page; stays put on the first page
    pub fn prev(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Jump to a page, clamped into `1..=total_pages`
    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.page = page.clamp(1, total_pages.max(1));
    }

    /// Pull the page back after the collection shrank
    pub fn clamp(&mut self, total_pages: usize) {
        self.page = self.page.min(total_pages.max(1));
    }

    /// Derive the visible page
    pub fn derive<'a>(&self, schema: &EntitySchema, records: &'a [Record]) -> Page<'a> {
        paginate(filter(schema, records, &self.search), self.page, PAGE_SIZE)
    }

    /// Page count for the current search
    pub fn total_pages(&self, schema: &EntitySchema, records: &[Record]) -> usize {
        total_pages(filter(schema, records, &self.search).len(), PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::product::SCHEMA;

    fn product(id: i64, name: &str) -> Record {
        Record::new().with("ProductID", id).with("ProductName", name)
    }

    fn numbered(count: i64) -> Vec<Record> {
        (1..=count).map(|i| product(i, &format!("Item {}", i))).collect()
    }

    fn ids(page: &Page<'_>) -> Vec<i64> {
        page.rows
            .iter()
            .map(|r| match r.get("ProductID") {
                Some(crate::core::record::FieldValue::Integer(n)) => *n,
                _ => panic!("missing id"),
            })
            .collect()
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let records = vec![product(1, "Chai"), product(2, "Milk")];
        let visible = filter(&SCHEMA, &records, "ch");
        assert_eq!(visible, vec![&records[0]]);

        let visible = filter(&SCHEMA, &records, "ILK");
        assert_eq!(visible, vec![&records[1]]);
    }

    #[test]
    fn test_empty_search_keeps_everything() {
        let records = numbered(3);
        assert_eq!(filter(&SCHEMA, &records, "").len(), 3);
    }

    #[test]
    fn test_records_without_display_field_only_match_empty_search() {
        let records = vec![Record::new().with("ProductID", 1)];
        assert_eq!(filter(&SCHEMA, &records, "").len(), 1);
        assert!(filter(&SCHEMA, &records, "a").is_empty());
    }

    #[test]
    fn test_paginate_slices_by_page_size() {
        let records = numbered(23);
        let all = filter(&SCHEMA, &records, "");

        let first = paginate(all.clone(), 1, PAGE_SIZE);
        assert_eq!(ids(&first), (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let second = paginate(all.clone(), 2, PAGE_SIZE);
        assert_eq!(ids(&second), (11..=20).collect::<Vec<_>>());

        let last = paginate(all.clone(), 3, PAGE_SIZE);
        assert_eq!(ids(&last), vec![21, 22, 23]);
        assert!(!last.has_next());

        let beyond = paginate(all, 4, PAGE_SIZE);
        assert!(beyond.rows.is_empty());
        assert_eq!(beyond.total_matches, 23);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let page = paginate(Vec::new(), 1, PAGE_SIZE);
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut view = ViewState::new();
        view.prev();
        assert_eq!(view.page(), 1);

        view.next(2);
        view.next(2);
        assert_eq!(view.page(), 2);

        view.go_to(9, 2);
        assert_eq!(view.page(), 2);
        view.go_to(0, 2);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_new_search_resets_page() {
        let records = numbered(25);
        let mut view = ViewState::new();
        view.go_to(3, view.total_pages(&SCHEMA, &records));
        assert_eq!(view.page(), 3);

        view.set_search("item 2");
        assert_eq!(view.page(), 1);
        let page = view.derive(&SCHEMA, &records);
        // "Item 2" and "Item 20".."Item 25"
        assert_eq!(page.total_matches, 7);
        assert_eq!(page.rows.len(), 7);

        // Same term again keeps the page
        view.next(1);
        view.set_search("item 2");
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut view = ViewState::at("", 3);
        view.clamp(2);
        assert_eq!(view.page(), 2);
        view.clamp(0);
        assert_eq!(view.page(), 1);
    }
}

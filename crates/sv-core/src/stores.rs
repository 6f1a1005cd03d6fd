//! Local client state stores.
//!
//! Explicit, synchronous state containers for filter selection,
//! pagination, sort order, view mode, and bookmarks. Nothing here is
//! persisted; callers pass the container rather than relying on ambient
//! globals.
//!
//! Invariant: any mutation that changes the result set (filters, sort,
//! or page size) resets the page cursor to 1, because the previous
//! offset no longer points at meaningful data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::filters::{CveFilters, RuleFilters, SortSpec};
use crate::pagination::{PageRequest, DEFAULT_PAGE_SIZE};

/// Rule list presentation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

/// State container for the rule explorer.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    filters: RuleFilters,
    page: u32,
    page_size: u32,
    sort: Option<SortSpec>,
    view_mode: ViewMode,
}

impl FilterStore {
    pub fn new() -> Self {
        Self {
            filters: RuleFilters::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            view_mode: ViewMode::List,
        }
    }

    pub fn filters(&self) -> &RuleFilters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// The current pagination cursor.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page(),
            page_size: self.page_size,
        }
    }

    /// Replaces the filter selection; resets the page cursor.
    pub fn set_filters(&mut self, filters: RuleFilters) {
        self.filters = filters;
        self.page = 1;
    }

    /// Mutates the filter selection in place; resets the page cursor.
    pub fn update_filters(&mut self, apply: impl FnOnce(&mut RuleFilters)) {
        apply(&mut self.filters);
        self.page = 1;
    }

    /// Clears the filter selection; resets the page cursor.
    pub fn clear_filters(&mut self) {
        self.filters = RuleFilters::default();
        self.page = 1;
    }

    /// Changes the sort order; resets the page cursor.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Changes the page size; resets the page cursor because the previous
    /// offset is no longer aligned.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    /// Restores the store to its initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// State container for the CVE explorer; mirrors [`FilterStore`] but is
/// independently scoped, so clearing rule filters never touches it.
#[derive(Debug, Clone, Default)]
pub struct CveFilterStore {
    filters: CveFilters,
    page: u32,
    page_size: u32,
}

impl CveFilterStore {
    pub fn new() -> Self {
        Self {
            filters: CveFilters::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn filters(&self) -> &CveFilters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page(),
            page_size: self.page_size,
        }
    }

    pub fn set_filters(&mut self, filters: CveFilters) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn update_filters(&mut self, apply: impl FnOnce(&mut CveFilters)) {
        apply(&mut self.filters);
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters = CveFilters::default();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }
}

/// Bookmarked rule IDs; membership test and toggle are the only
/// operations.
#[derive(Debug, Clone, Default)]
pub struct BookmarkStore {
    ids: HashSet<String>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the ID if absent, removes it if present; returns whether the
    /// rule is bookmarked afterwards.
    pub fn toggle(&mut self, rule_id: impl Into<String>) -> bool {
        let rule_id = rule_id.into();
        if self.ids.remove(&rule_id) {
            false
        } else {
            self.ids.insert(rule_id);
            true
        }
    }

    pub fn is_bookmarked(&self, rule_id: &str) -> bool {
        self.ids.contains(rule_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Bookmarked IDs in sorted order, for stable display.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::SortDirection;

    #[test]
    fn test_filter_mutation_resets_page() {
        let mut store = FilterStore::new();
        store.set_page(5);
        assert_eq!(store.page(), 5);

        store.update_filters(|f| f.query = Some("powershell".into()));
        assert_eq!(store.page(), 1);
    }

    #[test]
    fn test_sort_mutation_resets_page() {
        let mut store = FilterStore::new();
        store.set_page(3);
        store.set_sort(Some(SortSpec::new("title", SortDirection::Asc)));
        assert_eq!(store.page(), 1);
        assert!(store.sort().is_some());
    }

    #[test]
    fn test_page_size_mutation_resets_page() {
        let mut store = FilterStore::new();
        store.set_page(4);
        store.set_page_size(100);
        assert_eq!(store.page(), 1);
        assert_eq!(store.page_size(), 100);
    }

    #[test]
    fn test_clear_filters_resets_page_only() {
        let mut store = FilterStore::new();
        store.set_view_mode(ViewMode::Grid);
        store.update_filters(|f| f.severities.push("high".into()));
        store.set_page(2);

        store.clear_filters();
        assert_eq!(store.page(), 1);
        assert_eq!(store.filters(), &RuleFilters::default());
        // View mode survives a filter clear.
        assert_eq!(store.view_mode(), ViewMode::Grid);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut store = FilterStore::new();
        store.set_page_size(50);
        store.set_view_mode(ViewMode::Grid);
        store.reset();
        assert_eq!(store.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(store.view_mode(), ViewMode::List);
    }

    #[test]
    fn test_stores_are_independently_scoped() {
        let mut rules = FilterStore::new();
        let mut cves = CveFilterStore::new();

        cves.update_filters(|f| f.query = Some("openssl".into()));
        rules.clear_filters();

        assert_eq!(cves.filters().query.as_deref(), Some("openssl"));
    }

    #[test]
    fn test_bookmark_toggle_and_membership() {
        let mut bookmarks = BookmarkStore::new();
        assert!(!bookmarks.is_bookmarked("R-1"));

        assert!(bookmarks.toggle("R-1"));
        assert!(bookmarks.is_bookmarked("R-1"));
        assert_eq!(bookmarks.len(), 1);

        assert!(!bookmarks.toggle("R-1"));
        assert!(!bookmarks.is_bookmarked("R-1"));
        assert!(bookmarks.is_empty());
    }

    #[test]
    fn test_bookmark_ids_sorted() {
        let mut bookmarks = BookmarkStore::new();
        bookmarks.toggle("R-9");
        bookmarks.toggle("R-1");
        assert_eq!(bookmarks.ids(), vec!["R-1", "R-9"]);
    }
}

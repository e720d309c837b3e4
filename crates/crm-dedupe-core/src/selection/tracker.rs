use super::IdSource;
use crate::audit::{AuditEvent, AuditEventKind, EventSink};
use crate::Error;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use serde_json::json;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Selection state of the current page, derived from item state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Empty,
    Partial,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionStats {
    pub selected_count: usize,
    pub selected_page_count: usize,
    pub total_pages: usize,
    pub current_page_fully_selected: bool,
    pub current_page_partially_selected: bool,
}

/// Tracks a selection of individual items across server-paginated pages
/// while holding only the current page's identifiers.
///
/// Pages are numbered from 1. The selected-id set survives navigation; the
/// status of a page is always computed from the ids it contains, never
/// stored on its own.
///
/// Each selected id remembers the page it was last seen on, so a page stays
/// in the selected-pages set exactly while one of its ids is selected. Ids
/// never seen on a shown page have no page until one is shown.
pub struct SelectionTracker {
    /// Selected id to the page it belongs to, if known.
    selected: AHashMap<String, Option<usize>>,
    /// Selected ids per known page; a page with no selected ids has no entry.
    page_counts: BTreeMap<usize, usize>,
    /// Selected ids with no known page.
    unplaced: usize,
    /// Page each id was last shown on.
    page_index: AHashMap<String, usize>,
    shown_pages: BTreeSet<usize>,
    /// Pages marked by `select_all_pages` that have not been shown yet.
    bulk_pages: BTreeSet<usize>,
    all_selected: bool,
    total_items: usize,
    page_size: usize,
    current_page: usize,
    current_page_ids: Vec<String>,
    events: Option<Arc<dyn EventSink>>,
}

impl SelectionTracker {
    pub fn new(total_items: usize, page_size: usize) -> Self {
        Self {
            selected: AHashMap::new(),
            page_counts: BTreeMap::new(),
            unplaced: 0,
            page_index: AHashMap::new(),
            shown_pages: BTreeSet::new(),
            bulk_pages: BTreeSet::new(),
            all_selected: false,
            total_items,
            page_size: page_size.max(1),
            current_page: 1,
            current_page_ids: Vec::new(),
            events: None,
        }
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn current_page_ids(&self) -> &[String] {
        &self.current_page_ids
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size)
    }

    /// Navigate to `page`, whose items are `ids`. Existing selections are
    /// kept; only the page bookkeeping is recomputed.
    pub fn show_page(&mut self, page: usize, ids: Vec<String>) {
        let page = page.max(1);
        for id in &ids {
            self.page_index.insert(id.clone(), page);
            let moved = match self.selected.get_mut(id) {
                Some(owner) if *owner != Some(page) => Some(std::mem::replace(owner, Some(page))),
                _ => None,
            };
            if let Some(previous) = moved {
                self.unplace(previous);
                self.place(Some(page));
            }
        }
        self.shown_pages.insert(page);
        self.current_page = page;
        self.current_page_ids = ids;
        debug!(
            "Showing page {} ({} items, {})",
            self.current_page,
            self.current_page_ids.len(),
            self.page_status_label()
        );
    }

    /// The remote collection changed size.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.refresh_all_selected();
    }

    /// Flip one id. Its page is the one it was last shown on, which need
    /// not be the current page.
    pub fn toggle_item(&mut self, id: &str) {
        if !self.deselect(id) {
            self.select(id);
        }
        self.refresh_all_selected();
    }

    /// Select every item on the current page, or deselect them all if the
    /// page is already fully selected.
    pub fn toggle_current_page(&mut self) {
        let deselect = self.page_status() == PageStatus::Full || self.current_page_ids.is_empty();
        let ids = std::mem::take(&mut self.current_page_ids);
        for id in &ids {
            if deselect {
                self.deselect(id);
            } else {
                self.select(id);
            }
        }
        self.current_page_ids = ids;
        self.refresh_all_selected();
    }

    /// Select every item of the whole collection through `source`.
    ///
    /// A failed, empty or short enumeration leaves the selection untouched
    /// and is returned as an error. Returns the number of selected items.
    pub fn select_all_pages(&mut self, source: &dyn IdSource) -> Result<usize, Error> {
        let ids = match source.fetch_all_ids() {
            Ok(ids) => ids,
            Err(e) => {
                let err = match e {
                    Error::Collaborator(_) => e,
                    other => Error::Collaborator(other.to_string()),
                };
                return Err(self.reject(err));
            }
        };

        let ids: AHashSet<String> = ids.into_iter().collect();
        if ids.is_empty() {
            return Err(self.reject(Error::EmptyEnumeration));
        }
        if ids.len() < self.total_items {
            return Err(self.reject(Error::PartialEnumeration {
                expected: self.total_items,
                received: ids.len(),
            }));
        }

        if ids.len() > self.total_items {
            debug!(
                "Collection grew from {} to {} items while selecting",
                self.total_items,
                ids.len()
            );
            self.total_items = ids.len();
        }

        self.selected.clear();
        self.page_counts.clear();
        self.unplaced = 0;
        for id in ids {
            let page = self.page_index.get(&id).copied();
            self.place(page);
            self.selected.insert(id, page);
        }
        self.bulk_pages = (1..=self.total_pages())
            .filter(|page| !self.shown_pages.contains(page))
            .collect();
        self.all_selected = true;

        let count = self.selected.len();
        self.emit(AuditEventKind::AllPagesSelected, json!({ "selected": count }));
        Ok(count)
    }

    pub fn clear_all(&mut self) {
        let cleared = self.selected.len();
        self.selected.clear();
        self.page_counts.clear();
        self.unplaced = 0;
        self.bulk_pages.clear();
        self.all_selected = false;
        self.emit(AuditEventKind::SelectionCleared, json!({ "cleared": cleared }));
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains_key(id)
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    pub fn is_partially_selected(&self) -> bool {
        !self.selected.is_empty() && !self.all_selected
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &str> {
        self.selected.keys().map(String::as_str)
    }

    /// Pages holding at least one selected id, plus the pages a bulk select
    /// marked and that are still unseen while ids without a page remain.
    pub fn selected_pages(&self) -> impl Iterator<Item = usize> {
        let mut pages: BTreeSet<usize> = self.page_counts.keys().copied().collect();
        if self.unplaced > 0 {
            pages.extend(
                self.bulk_pages
                    .iter()
                    .filter(|page| !self.shown_pages.contains(*page)),
            );
        }
        pages.into_iter()
    }

    pub fn page_status(&self) -> PageStatus {
        let on_page = self
            .current_page_ids
            .iter()
            .filter(|id| self.selected.contains_key(id.as_str()))
            .count();

        if on_page == 0 {
            PageStatus::Empty
        } else if on_page == self.current_page_ids.len() {
            PageStatus::Full
        } else {
            PageStatus::Partial
        }
    }

    pub fn stats(&self) -> SelectionStats {
        let status = self.page_status();
        SelectionStats {
            selected_count: self.selected.len(),
            selected_page_count: self.selected_pages().count(),
            total_pages: self.total_pages(),
            current_page_fully_selected: status == PageStatus::Full,
            current_page_partially_selected: status == PageStatus::Partial,
        }
    }

    fn select(&mut self, id: &str) -> bool {
        if self.selected.contains_key(id) {
            return false;
        }
        let page = self.page_index.get(id).copied();
        self.selected.insert(id.to_string(), page);
        self.place(page);
        true
    }

    fn deselect(&mut self, id: &str) -> bool {
        match self.selected.remove(id) {
            Some(page) => {
                self.unplace(page);
                true
            }
            None => false,
        }
    }

    fn place(&mut self, page: Option<usize>) {
        match page {
            Some(page) => *self.page_counts.entry(page).or_default() += 1,
            None => self.unplaced += 1,
        }
    }

    fn unplace(&mut self, page: Option<usize>) {
        match page {
            Some(page) => {
                if let Entry::Occupied(mut count) = self.page_counts.entry(page) {
                    *count.get_mut() -= 1;
                    if *count.get() == 0 {
                        count.remove();
                    }
                }
            }
            None => self.unplaced = self.unplaced.saturating_sub(1),
        }
    }

    fn refresh_all_selected(&mut self) {
        self.all_selected = self.total_items > 0 && self.selected.len() == self.total_items;
    }

    fn reject(&self, err: Error) -> Error {
        warn!("Select all pages rejected: {}", err);
        self.emit(
            AuditEventKind::SelectAllRejected,
            json!({ "reason": err.to_string() }),
        );
        err
    }

    fn emit(&self, kind: AuditEventKind, details: serde_json::Value) {
        if let Some(sink) = &self.events {
            sink.record(AuditEvent::new(kind, details));
        }
    }

    fn page_status_label(&self) -> &'static str {
        match self.page_status() {
            PageStatus::Empty => "nothing selected",
            PageStatus::Partial => "partially selected",
            PageStatus::Full => "fully selected",
        }
    }
}

//! List-view state: debounced search, fixed-size pages, bulk selection.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Debounces the search input: rapid keystrokes supersede each other and
/// only the latest one actually queries.
pub struct SearchDebouncer {
    delay: Duration,
    seq: AtomicU64,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            seq: AtomicU64::new(0),
        }
    }

    /// Wait out the quiet period. Returns `true` if no newer keystroke
    /// arrived while waiting.
    pub async fn settle(&self) -> bool {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.seq.load(Ordering::SeqCst) == ticket
    }
}

/// Pagination and selection state for the record list.
pub struct ListState {
    pub query: String,
    pub page: usize,
    pub selected: HashSet<String>,
    page_size: usize,
    pub debouncer: SearchDebouncer,
}

impl ListState {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: String::new(),
            page: 0,
            selected: HashSet::new(),
            page_size,
            debouncer: SearchDebouncer::new(Duration::from_millis(300)),
        }
    }

    pub fn with_debounce(page_size: usize, delay: Duration) -> Self {
        Self {
            debouncer: SearchDebouncer::new(delay),
            ..Self::new(page_size)
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// The slice of `items` visible on the current page, clamping the
    /// page index to the last page.
    pub fn page_items<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        let last = self.page_count(items.len()) - 1;
        self.page = self.page.min(last);
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Reset to the first page, dropping the selection. Used when the
    /// query changes.
    pub fn reset(&mut self) {
        self.page = 0;
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_of_twelve() {
        let mut list = ListState::new(12);
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(list.page_count(items.len()), 3);
        assert_eq!(list.page_items(&items).len(), 12);

        list.next_page(items.len());
        assert_eq!(list.page_items(&items), &items[12..24]);

        list.next_page(items.len());
        assert_eq!(list.page_items(&items).len(), 1);

        // no page past the last
        list.next_page(items.len());
        assert_eq!(list.page, 2);
    }

    #[test]
    fn page_clamps_when_results_shrink() {
        let mut list = ListState::new(12);
        let many: Vec<u32> = (0..30).collect();
        list.next_page(many.len());
        list.next_page(many.len());
        assert_eq!(list.page, 2);

        let few: Vec<u32> = (0..5).collect();
        assert_eq!(list.page_items(&few).len(), 5);
        assert_eq!(list.page, 0);
    }

    #[test]
    fn empty_list_is_one_page() {
        let mut list = ListState::new(12);
        let items: Vec<u32> = Vec::new();
        assert_eq!(list.page_count(0), 1);
        assert!(list.page_items(&items).is_empty());
    }

    #[test]
    fn selection_toggles() {
        let mut list = ListState::new(12);
        list.toggle_selected("a");
        list.toggle_selected("b");
        assert_eq!(list.selected.len(), 2);
        list.toggle_selected("a");
        assert!(!list.selected.contains("a"));
        list.clear_selection();
        assert!(list.selected.is_empty());
    }

    #[tokio::test]
    async fn only_last_keystroke_settles() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(20));
        let first = debouncer.settle();
        let second = debouncer.settle();
        let (first, second) = tokio::join!(first, second);
        assert!(!first, "superseded keystroke must not settle");
        assert!(second, "latest keystroke settles");
    }
}

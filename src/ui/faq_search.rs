//! Client-side filter over the FAQ accordion

use crate::page::{NodeId, Page};
use crate::state::Debouncer;
use crate::ui::Selectors;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct FaqSearch {
    input: NodeId,
    items: Vec<NodeId>,
    pending: Debouncer<String>,
}

impl FaqSearch {
    /// Returns `None` when the page has no search input
    pub fn init<P: Page + ?Sized>(page: &P, selectors: &Selectors, wait: Duration) -> Option<Self> {
        let input = page.element_by_id(&selectors.faq_search_id)?;
        Some(Self {
            input,
            items: page.query_all(&selectors.accordion_item),
            pending: Debouncer::new(wait),
        })
    }

    pub fn on_input<P: Page + ?Sized>(&mut self, page: &P, target: NodeId, now: Instant) -> bool {
        if target != self.input {
            return false;
        }
        self.pending.call(page.value(target), now);
        true
    }

    pub fn has_pending_work(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P, now: Instant) {
        if let Some(query) = self.pending.poll(now) {
            self.filter(page, &query);
        }
    }

    /// Show items whose text contains `query` (case-insensitive) and hide the
    /// rest. Returns the number of visible items.
    pub fn filter<P: Page + ?Sized>(&self, page: &mut P, query: &str) -> usize {
        let query = query.trim().to_lowercase();
        let mut visible = 0;
        for &item in &self.items {
            if query.is_empty() || page.text_content(item).to_lowercase().contains(&query) {
                page.set_style(item, "display", "");
                visible += 1;
            } else {
                page.set_style(item, "display", "none");
            }
        }
        tracing::debug!("FAQ filter {query:?} shows {visible}/{}", self.items.len());
        visible
    }
}

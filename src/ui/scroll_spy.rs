//! Highlights the in-page nav link of the section currently in view

use crate::page::{NodeId, Page};
use crate::state::Throttle;
use crate::ui::{header_height, Selectors};
use std::time::Duration;
use tokio::time::Instant;

/// Extra offset below the header before a section counts as current
const ACTIVATION_OFFSET: f64 = 50.0;

#[derive(Debug)]
pub struct ScrollSpy {
    sections: Vec<NodeId>,
    links: Vec<NodeId>,
    header_height: f64,
    throttle: Throttle,
}

impl ScrollSpy {
    pub fn init<P: Page + ?Sized>(
        page: &P,
        selectors: &Selectors,
        limit: Duration,
        header_fallback: f64,
    ) -> Option<Self> {
        let sections = page.query_all(&selectors.section);
        let links = page.query_all(&selectors.anchor_nav_link);
        if sections.is_empty() || links.is_empty() {
            return None;
        }
        Some(Self {
            sections,
            links,
            header_height: header_height(page, selectors, header_fallback),
            // Trailing run so the last scroll position is always reflected
            throttle: Throttle::with_trailing(limit),
        })
    }

    pub fn on_scroll<P: Page + ?Sized>(&mut self, page: &mut P, now: Instant) {
        if self.throttle.try_fire(now) {
            self.refresh(page);
        }
    }

    pub fn has_pending_work(&self) -> bool {
        self.throttle.has_trailing()
    }

    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P, now: Instant) {
        if self.throttle.poll_trailing(now) {
            self.refresh(page);
        }
    }

    /// Mark the link of the section under the activation line. Returns the
    /// active section's id, if any section contains the line.
    pub fn refresh<P: Page + ?Sized>(&self, page: &mut P) -> Option<String> {
        let position = page.scroll_y() + self.header_height + ACTIVATION_OFFSET;
        let current = self.sections.iter().rev().copied().find(|&section| {
            let top = page.offset_top(section);
            position >= top && position < top + page.offset_height(section)
        })?;
        let id = page.attribute(current, "id")?;
        let href = format!("#{id}");

        for &link in &self.links {
            page.remove_class(link, "is-active");
            page.remove_class(link, "active");
            page.remove_attribute(link, "aria-current");
            if page.attribute(link, "href").as_deref() == Some(href.as_str()) {
                page.add_class(link, "is-active");
                page.add_class(link, "active");
                page.set_attribute(link, "aria-current", "page");
            }
        }
        Some(id)
    }
}

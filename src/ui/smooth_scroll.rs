//! Animated scrolling to in-page anchors

use crate::page::{NodeId, Page};
use crate::ui::{header_height, Selectors};
use std::time::Duration;
use tokio::time::Instant;

/// A running scroll animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    pub from: f64,
    pub to: f64,
    pub started: Instant,
    pub duration: Duration,
}

impl ScrollAnimation {
    /// Scroll position at `now`, and whether the animation has finished
    pub fn position(&self, now: Instant) -> (f64, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        if elapsed >= self.duration {
            return (self.to, true);
        }
        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let eased = f64::from(simple_easing::cubic_out(progress));
        (self.from + (self.to - self.from) * eased, false)
    }
}

#[derive(Debug)]
pub struct SmoothScroll {
    duration: Duration,
    header_fallback: f64,
    animation: Option<ScrollAnimation>,
    /// Target named by the location hash at load, and when to scroll to it
    initial: Option<(NodeId, Instant)>,
}

impl SmoothScroll {
    pub fn init<P: Page + ?Sized>(
        page: &P,
        duration: Duration,
        initial_delay: Duration,
        header_fallback: f64,
        now: Instant,
    ) -> Self {
        let hash = page.location_hash();
        let initial = hash
            .strip_prefix('#')
            .filter(|id| !id.is_empty())
            .and_then(|id| page.element_by_id(id))
            .map(|target| (target, now + initial_delay));

        Self {
            duration,
            header_fallback,
            animation: None,
            initial,
        }
    }

    #[cfg(test)]
    pub fn animation(&self) -> Option<&ScrollAnimation> {
        self.animation.as_ref()
    }

    pub fn has_pending_work(&self) -> bool {
        self.animation.is_some() || self.initial.is_some()
    }

    fn scroll_to_target<P: Page + ?Sized>(
        &mut self,
        page: &P,
        selectors: &Selectors,
        target: NodeId,
        now: Instant,
    ) {
        let to = page.bounding_top(target) + page.scroll_y()
            - header_height(page, selectors, self.header_fallback);
        self.animation = Some(ScrollAnimation {
            from: page.scroll_y(),
            to: to.max(0.0),
            started: now,
            duration: self.duration,
        });
    }

    /// Handle a click anywhere; returns true if the default was prevented
    pub fn on_click<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        selectors: &Selectors,
        target: NodeId,
        now: Instant,
    ) -> bool {
        let Some(anchor) = page.closest(target, &selectors.in_page_anchor) else {
            return false;
        };
        let Some(href) = page.attribute(anchor, "href") else {
            return false;
        };
        if href == "#" || href == "#!" {
            return false;
        }
        let Some(destination) = href.strip_prefix('#').and_then(|id| page.element_by_id(id)) else {
            return false;
        };

        self.scroll_to_target(page, selectors, destination, now);
        page.push_history(&href);
        true
    }

    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P, selectors: &Selectors, now: Instant) {
        if let Some((target, at)) = self.initial {
            if now >= at {
                self.initial = None;
                if page.is_connected(target) {
                    self.scroll_to_target(page, selectors, target, now);
                }
            }
        }

        if let Some(animation) = self.animation {
            let (position, done) = animation.position(now);
            page.scroll_to(position);
            if done {
                self.animation = None;
            }
        }
    }
}

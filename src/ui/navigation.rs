//! Collapsible navigation ("burger") menu

use crate::page::{NodeId, Page};
use crate::state::Debouncer;
use crate::ui::Selectors;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct NavigationMenu {
    toggle: NodeId,
    collapse: NodeId,
    links: Vec<NodeId>,
    resize: Debouncer<()>,
    breakpoint: f64,
}

impl NavigationMenu {
    /// Returns `None` when the page has no toggle or no collapsible panel
    pub fn init<P: Page + ?Sized>(
        page: &P,
        selectors: &Selectors,
        resize_wait: Duration,
        breakpoint: f64,
    ) -> Option<Self> {
        let toggle = page.query(&selectors.nav_toggle)?;
        let collapse = page.query(&selectors.nav_collapse)?;
        Some(Self {
            toggle,
            collapse,
            links: page.query_all(&selectors.nav_link),
            resize: Debouncer::new(resize_wait),
            breakpoint,
        })
    }

    pub fn is_open<P: Page + ?Sized>(&self, page: &P) -> bool {
        page.has_class(self.collapse, "show")
    }

    fn open<P: Page + ?Sized>(&self, page: &mut P) {
        page.add_class(self.collapse, "show");
        page.set_attribute(self.toggle, "aria-expanded", "true");
        let body = page.body();
        page.add_class(body, "u-no-scroll");
    }

    fn close<P: Page + ?Sized>(&self, page: &mut P) {
        page.remove_class(self.collapse, "show");
        page.set_attribute(self.toggle, "aria-expanded", "false");
        let body = page.body();
        page.remove_class(body, "u-no-scroll");
    }

    /// Handle a click anywhere; returns true if the default was prevented
    pub fn on_click<P: Page + ?Sized>(&self, page: &mut P, target: NodeId) -> bool {
        if page.contains(self.toggle, target) {
            if self.is_open(page) {
                self.close(page);
            } else {
                self.open(page);
            }
            return true;
        }
        if !self.is_open(page) {
            return false;
        }

        let on_link = self.links.iter().any(|&link| page.contains(link, target));
        let outside = !page.contains(self.collapse, target);
        if on_link || outside {
            self.close(page);
        }
        false
    }

    pub fn on_keydown<P: Page + ?Sized>(&self, page: &mut P, key: &str) {
        if key == "Escape" && self.is_open(page) {
            self.close(page);
            page.focus(self.toggle);
        }
    }

    pub fn on_resize(&mut self, now: Instant) {
        self.resize.call((), now);
    }

    pub fn has_pending_work(&self) -> bool {
        self.resize.is_pending()
    }

    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P, now: Instant) {
        if self.resize.poll(now).is_some()
            && page.inner_width() >= self.breakpoint
            && self.is_open(page)
        {
            tracing::debug!("Viewport widened, closing navigation menu");
            self.close(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HeadlessPage;
    use crate::ui::default_selectors;

    struct Nav {
        page: HeadlessPage,
        toggle: NodeId,
        collapse: NodeId,
        link: NodeId,
        content: NodeId,
    }

    fn nav() -> Nav {
        let mut page = HeadlessPage::new();
        let header = page.add(page.body(), "header", &[("class", "l-header")]);
        let toggle = page.add(header, "button", &[("class", "navbar-toggler")]);
        let collapse = page.add(header, "div", &[("class", "navbar-collapse")]);
        let link = page.add(collapse, "a", &[("class", "nav-link"), ("href", "#diensten")]);
        let content = page.add(page.body(), "main", &[]);
        page.set_inner_width(375.0);
        Nav {
            page,
            toggle,
            collapse,
            link,
            content,
        }
    }

    fn menu(page: &HeadlessPage) -> NavigationMenu {
        NavigationMenu::init(page, &default_selectors(), Duration::from_millis(150), 768.0).unwrap()
    }

    #[test]
    fn test_missing_markup_yields_none() {
        let page = HeadlessPage::new();
        assert!(NavigationMenu::init(&page, &default_selectors(), Duration::ZERO, 768.0).is_none());
    }

    #[test]
    fn test_toggle_opens_and_closes() {
        let mut n = nav();
        let menu = menu(&n.page);

        assert!(menu.on_click(&mut n.page, n.toggle));
        assert!(n.page.has_class(n.collapse, "show"));
        assert_eq!(n.page.attribute(n.toggle, "aria-expanded").as_deref(), Some("true"));
        assert!(n.page.has_class(n.page.body(), "u-no-scroll"));

        menu.on_click(&mut n.page, n.toggle);
        assert!(!menu.is_open(&n.page));
        assert_eq!(n.page.attribute(n.toggle, "aria-expanded").as_deref(), Some("false"));
        assert!(!n.page.has_class(n.page.body(), "u-no-scroll"));
    }

    #[test]
    fn test_click_outside_closes() {
        let mut n = nav();
        let menu = menu(&n.page);
        menu.on_click(&mut n.page, n.toggle);
        assert!(!menu.on_click(&mut n.page, n.content));
        assert!(!menu.is_open(&n.page));
    }

    #[test]
    fn test_click_inside_panel_keeps_open() {
        let mut n = nav();
        let menu = menu(&n.page);
        menu.on_click(&mut n.page, n.toggle);
        menu.on_click(&mut n.page, n.collapse);
        assert!(menu.is_open(&n.page));
    }

    #[test]
    fn test_nav_link_click_closes() {
        let mut n = nav();
        let menu = menu(&n.page);
        menu.on_click(&mut n.page, n.toggle);
        menu.on_click(&mut n.page, n.link);
        assert!(!menu.is_open(&n.page));
    }

    #[test]
    fn test_escape_closes_and_focuses_toggle() {
        let mut n = nav();
        let menu = menu(&n.page);
        menu.on_click(&mut n.page, n.toggle);
        menu.on_keydown(&mut n.page, "Enter");
        assert!(menu.is_open(&n.page));
        menu.on_keydown(&mut n.page, "Escape");
        assert!(!menu.is_open(&n.page));
        assert_eq!(n.page.focused(), Some(n.toggle));
    }

    #[test]
    fn test_resize_to_desktop_closes_after_debounce() {
        let mut n = nav();
        let mut menu = menu(&n.page);
        let start = Instant::now();
        menu.on_click(&mut n.page, n.toggle);

        n.page.set_inner_width(1024.0);
        menu.on_resize(start);
        menu.on_resize(start + Duration::from_millis(100));
        menu.tick(&mut n.page, start + Duration::from_millis(200));
        assert!(menu.is_open(&n.page));
        menu.tick(&mut n.page, start + Duration::from_millis(250));
        assert!(!menu.is_open(&n.page));
    }

    #[test]
    fn test_resize_on_mobile_keeps_open() {
        let mut n = nav();
        let mut menu = menu(&n.page);
        let start = Instant::now();
        menu.on_click(&mut n.page, n.toggle);
        menu.on_resize(start);
        menu.tick(&mut n.page, start + Duration::from_millis(500));
        assert!(menu.is_open(&n.page));
    }
}

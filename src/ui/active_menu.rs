//! Marks the navigation entry for the current page

use crate::page::Page;
use crate::ui::Selectors;

fn is_home(path: &str) -> bool {
    path == "/" || path == "/index.html" || path.ends_with("/index.html")
}

fn links_home(href: &str) -> bool {
    matches!(href, "/" | "/index.html" | "index.html")
}

/// Whether a nav link's href points at the page at `current_path`.
///
/// Suffix matching means a link to `/` matches every path.
pub fn link_matches_path(href: &str, current_path: &str) -> bool {
    (is_home(current_path) && links_home(href))
        || href == current_path
        || current_path.ends_with(href)
}

/// Mark nav links that point at the current page. Returns how many were marked.
pub fn mark_active_links<P: Page + ?Sized>(page: &mut P, selectors: &Selectors) -> usize {
    let current = page.location_path();
    let mut marked = 0;

    for link in page.query_all(&selectors.nav_link) {
        let Some(href) = page.attribute(link, "href") else {
            continue;
        };
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        if link_matches_path(&href, &current) {
            page.add_class(link, "is-active");
            page.add_class(link, "active");
            page.set_attribute(link, "aria-current", "page");
            marked += 1;
        } else {
            page.remove_class(link, "is-active");
            page.remove_class(link, "active");
            page.remove_attribute(link, "aria-current");
        }
    }

    tracing::debug!("Marked {marked} active nav link(s) for {current}");
    marked
}

//! Responsive, lazy-loaded images with a broken-image placeholder

use crate::page::{NodeId, Page};
use crate::ui::Selectors;
use std::collections::HashSet;

/// Inline SVG shown in place of an image that failed to load
pub const PLACEHOLDER_SRC: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 400 300\"%3E%3Crect fill=\"%23e9ecef\" width=\"400\" height=\"300\"/%3E%3Ctext x=\"50%25\" y=\"50%25\" dominant-baseline=\"middle\" text-anchor=\"middle\" fill=\"%236c757d\" font-family=\"sans-serif\" font-size=\"18\"%3EAfbeelding niet beschikbaar%3C/text%3E%3C/svg%3E";

#[derive(Debug, Default)]
pub struct ImageFallback {
    images: HashSet<NodeId>,
    replaced: HashSet<NodeId>,
}

fn is_critical<P: Page + ?Sized>(page: &P, img: NodeId) -> bool {
    page.has_class(img, "c-logo__img") || page.has_attribute(img, "data-critical")
}

impl ImageFallback {
    pub fn init<P: Page + ?Sized>(page: &mut P, selectors: &Selectors) -> Self {
        let images: HashSet<NodeId> = page.query_all(&selectors.image).into_iter().collect();
        for &img in &images {
            page.add_class(img, "img-fluid");
            if !page.has_attribute(img, "loading") && !is_critical(page, img) {
                page.set_attribute(img, "loading", "lazy");
            }
        }
        tracing::debug!("Prepared {} image(s)", images.len());
        Self {
            images,
            replaced: HashSet::new(),
        }
    }

    /// Swap a broken image for the placeholder. Each image is swapped at most
    /// once so a failing placeholder cannot loop.
    pub fn on_error<P: Page + ?Sized>(&mut self, page: &mut P, img: NodeId) -> bool {
        if !self.images.contains(&img) || !self.replaced.insert(img) {
            return false;
        }
        tracing::warn!(
            "Image failed to load: {}",
            page.attribute(img, "src").unwrap_or_default()
        );
        page.set_attribute(img, "src", PLACEHOLDER_SRC);
        true
    }
}

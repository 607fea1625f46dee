//! Hover state for interactive elements

use crate::page::{NodeId, Page};
use crate::ui::Selectors;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct MicroInteractions {
    elements: HashSet<NodeId>,
}

impl MicroInteractions {
    pub fn init<P: Page + ?Sized>(page: &P, selectors: &Selectors) -> Self {
        Self {
            elements: page.query_all(&selectors.interactive).into_iter().collect(),
        }
    }

    pub fn on_mouse_enter<P: Page + ?Sized>(&self, page: &mut P, target: NodeId) {
        if self.elements.contains(&target) {
            page.add_class(target, "u-hover");
        }
    }

    pub fn on_mouse_leave<P: Page + ?Sized>(&self, page: &mut P, target: NodeId) {
        if self.elements.contains(&target) {
            page.remove_class(target, "u-hover");
        }
    }
}

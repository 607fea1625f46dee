//! Page behaviours
//!
//! Each behaviour is an explicit component built once by `App::init` and fed
//! the events it registered interest in.

mod active_menu;
mod faq_search;
mod forms;
mod images;
mod micro;
mod navigation;
mod notifications;
mod scroll_spy;
mod smooth_scroll;

pub use active_menu::mark_active_links;
pub use faq_search::FaqSearch;
pub use forms::{FormController, SubmitStep};
pub use images::ImageFallback;
pub use micro::MicroInteractions;
pub use navigation::NavigationMenu;
pub use notifications::NotificationSurface;
#[cfg(test)]
pub use notifications::CONTAINER_ID;
pub use scroll_spy::ScrollSpy;
pub use smooth_scroll::SmoothScroll;

use crate::config::DomContract;
use crate::page::{Page, Selector, SelectorError};

/// The DOM contract, compiled
#[derive(Debug, Clone)]
pub struct Selectors {
    pub nav_toggle: Selector,
    pub nav_collapse: Selector,
    pub nav_link: Selector,
    pub anchor_nav_link: Selector,
    pub section: Selector,
    pub header: Selector,
    pub in_page_anchor: Selector,
    pub image: Selector,
    pub form: Selector,
    pub form_field: Selector,
    pub submit_button: Selector,
    pub field_group: Selector,
    pub check_group: Selector,
    pub field_error: Selector,
    pub faq_search_id: String,
    pub accordion_item: Selector,
    pub interactive: Selector,
}

impl Selectors {
    pub fn compile(contract: &DomContract) -> Result<Self, SelectorError> {
        Ok(Self {
            nav_toggle: Selector::parse(&contract.nav_toggle)?,
            nav_collapse: Selector::parse(&contract.nav_collapse)?,
            nav_link: Selector::parse(&contract.nav_link)?,
            anchor_nav_link: Selector::parse(&contract.anchor_nav_link)?,
            section: Selector::parse(&contract.section)?,
            header: Selector::parse(&contract.header)?,
            in_page_anchor: Selector::parse(&contract.in_page_anchor)?,
            image: Selector::parse(&contract.image)?,
            form: Selector::parse(&contract.form)?,
            form_field: Selector::parse(&contract.form_field)?,
            submit_button: Selector::parse(&contract.submit_button)?,
            field_group: Selector::parse(&contract.field_group)?,
            check_group: Selector::parse(&contract.check_group)?,
            field_error: Selector::parse(&contract.field_error)?,
            faq_search_id: contract.faq_search_id.clone(),
            accordion_item: Selector::parse(&contract.accordion_item)?,
            interactive: Selector::parse(&contract.interactive)?,
        })
    }
}

/// Height of the sticky header, or `fallback` when there is none (or it has no height)
pub fn header_height<P: Page + ?Sized>(page: &P, selectors: &Selectors, fallback: f64) -> f64 {
    page.query(&selectors.header)
        .map(|h| page.offset_height(h))
        .filter(|&h| h > 0.0)
        .unwrap_or(fallback)
}

#[cfg(test)]
pub(crate) fn default_selectors() -> Selectors {
    Selectors::compile(&DomContract::default()).unwrap()
}

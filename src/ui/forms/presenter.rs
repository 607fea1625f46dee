//! Field error presentation

use crate::page::{NodeId, Page};
use crate::ui::Selectors;

/// The element that visually carries a field's error: the nearest form
/// group, else the nearest checkbox group, else the parent
pub fn field_group<P: Page + ?Sized>(page: &P, selectors: &Selectors, field: NodeId) -> Option<NodeId> {
    page.closest(field, &selectors.field_group)
        .or_else(|| page.closest(field, &selectors.check_group))
        .or_else(|| page.parent(field))
}

/// Mark `field` invalid and show `message` in its group
pub fn show_error<P: Page + ?Sized>(page: &mut P, selectors: &Selectors, field: NodeId, message: &str) {
    let Some(group) = field_group(page, selectors, field) else {
        return;
    };

    page.add_class(group, "has-error");
    page.add_class(field, "is-invalid");

    let error = match page.query_one_within(group, &selectors.field_error) {
        Some(existing) => existing,
        None => {
            let created = page.create_element("div");
            page.set_attribute(created, "class", "c-form__error invalid-feedback");
            page.append_child(group, created);
            created
        }
    };
    page.set_text_content(error, message);
    page.set_style(error, "display", "block");
}

/// Remove the error state from `field` and hide its message
pub fn clear_error<P: Page + ?Sized>(page: &mut P, selectors: &Selectors, field: NodeId) {
    let Some(group) = field_group(page, selectors, field) else {
        return;
    };

    page.remove_class(group, "has-error");
    page.remove_class(field, "is-invalid");

    if let Some(error) = page.query_one_within(group, &selectors.field_error) {
        page.set_style(error, "display", "none");
        page.set_text_content(error, "");
    }
}

//! Form field snapshots

use crate::page::{NodeId, Page};

/// Declared kind of a form control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Checkbox,
    Radio,
    TextArea,
    Select,
    Other(String),
}

impl FieldKind {
    /// Map a DOM `type` value (`text`, `email`, `textarea`, `select-one`, ...)
    pub fn from_type(type_name: &str) -> Self {
        match type_name.to_ascii_lowercase().as_str() {
            "" | "text" => FieldKind::Text,
            "email" => FieldKind::Email,
            "tel" => FieldKind::Tel,
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            "textarea" => FieldKind::TextArea,
            "select-one" | "select-multiple" => FieldKind::Select,
            other => FieldKind::Other(other.to_string()),
        }
    }

    pub fn is_checkable(&self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Radio)
    }
}

/// Current state of one field, read fresh from the page on every validation
#[derive(Debug, Clone)]
pub struct FieldState {
    pub name: String,
    pub kind: FieldKind,
    pub value: String,
    pub required: bool,
    pub checked: bool,
}

impl FieldState {
    /// Create a text-like field with the given value
    pub fn new(name: &str, kind: FieldKind, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value: value.to_string(),
            required: false,
            checked: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Snapshot a control from the page
    pub fn read<P: Page + ?Sized>(page: &P, node: NodeId) -> Self {
        let kind = match page.tag_name(node).as_str() {
            "textarea" => FieldKind::TextArea,
            "select" => FieldKind::Select,
            _ => FieldKind::from_type(&page.attribute(node, "type").unwrap_or_default()),
        };
        Self {
            name: page.attribute(node, "name").unwrap_or_default(),
            kind,
            value: page.value(node),
            required: page.has_attribute(node, "required"),
            checked: page.is_checked(node),
        }
    }

    pub fn trimmed(&self) -> &str {
        self.value.trim()
    }
}

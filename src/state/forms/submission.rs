//! Serialised form data handed to the submission transport

use super::field::FieldState;
use crate::page::{NodeId, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One name/value pair, as FormData would carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
    pub name: String,
    pub value: String,
}

/// Everything the transport needs to deliver one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub form_id: Option<String>,
    pub action: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub fields: Vec<FormEntry>,
}

impl FormSubmission {
    /// Collect the successful controls of `form`.
    ///
    /// Unnamed and disabled controls are skipped; checkboxes and radios only
    /// count when checked and default to the value `on`.
    pub fn collect<P: Page + ?Sized>(page: &P, form: NodeId, fields: &[NodeId]) -> Self {
        let entries = fields
            .iter()
            .filter(|&&node| !page.is_disabled(node))
            .filter_map(|&node| {
                let state = FieldState::read(page, node);
                if state.name.is_empty() {
                    return None;
                }
                if state.kind.is_checkable() {
                    if !state.checked {
                        return None;
                    }
                    let value = page.attribute(node, "value").unwrap_or_else(|| "on".to_string());
                    return Some(FormEntry {
                        name: state.name,
                        value,
                    });
                }
                Some(FormEntry {
                    name: state.name,
                    value: state.value,
                })
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            form_id: page.attribute(form, "id"),
            action: page.attribute(form, "action"),
            submitted_at: Utc::now(),
            fields: entries,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

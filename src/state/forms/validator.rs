//! Field validation rules

use super::field::{FieldKind, FieldState};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MSG_REQUIRED: &str = "Dit veld is verplicht.";
pub const MSG_EMAIL: &str = "Voer een geldig e-mailadres in.";
pub const MSG_PHONE: &str = "Voer een geldig telefoonnummer in.";
pub const MSG_NAME: &str = "Voer een geldige naam in (2-50 tekens).";
pub const MSG_MESSAGE: &str = "Bericht moet minimaal 10 tekens bevatten.";
pub const MSG_TERMS: &str = "U moet akkoord gaan met de voorwaarden.";

const MIN_MESSAGE_CHARS: usize = 10;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s+()\-]{10,20}$").expect("phone pattern"));
static NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-ZÀ-ÿ\s\-']{2,50}$").expect("name pattern"));

/// Outcome of validating one field. `message` is empty when valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub valid: bool,
    pub message: String,
}

impl Verdict {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
        }
    }
}

/// Validate a field. Rules run in order and the first failure wins.
pub fn validate(field: &FieldState) -> Verdict {
    let value = field.trimmed();

    if field.required && value.is_empty() {
        return Verdict::invalid(MSG_REQUIRED);
    }

    if field.kind == FieldKind::Email && !value.is_empty() && !EMAIL.is_match(value) {
        return Verdict::invalid(MSG_EMAIL);
    }

    if field.kind == FieldKind::Tel && !value.is_empty() && !PHONE.is_match(value) {
        return Verdict::invalid(MSG_PHONE);
    }

    let is_name = field.name == "firstName" || field.name == "lastName";
    if is_name && !value.is_empty() && !NAME.is_match(value) {
        return Verdict::invalid(MSG_NAME);
    }

    if field.name == "message" && !value.is_empty() && value.chars().count() < MIN_MESSAGE_CHARS {
        return Verdict::invalid(MSG_MESSAGE);
    }

    if field.kind == FieldKind::Checkbox && field.required && !field.checked {
        return Verdict::invalid(MSG_TERMS);
    }

    Verdict::ok()
}

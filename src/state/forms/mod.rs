//! Form domain layer
//!
//! Field snapshots, the validation rules and the submission payload. The
//! page wiring lives in `ui::forms`.

mod field;
mod submission;
mod validator;

pub use field::{FieldKind, FieldState};
pub use submission::{FormEntry, FormSubmission};
pub use validator::{validate, Verdict};

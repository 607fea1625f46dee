//! Form wiring
//!
//! - `presenter`: shows and clears per-field error state
//! - `controller`: field events and the submit lifecycle

mod controller;
mod presenter;

pub use controller::{FormController, SubmitStep};

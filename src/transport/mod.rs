//! Submission transport for form data

mod simulated;
mod traits;

pub use simulated::SimulatedTransport;
pub use traits::{SubmitError, SubmitTransport};

#[cfg(test)]
pub use traits::MockSubmitTransport;

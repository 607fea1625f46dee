//! Application state module

mod forms;
mod init_context;
mod notification;
mod timing;

pub use forms::*;
pub use init_context::*;
pub use notification::*;
pub use timing::*;

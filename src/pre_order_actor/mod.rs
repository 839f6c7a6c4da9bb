//! Pre-order documents: status transitions and the errors they raise.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

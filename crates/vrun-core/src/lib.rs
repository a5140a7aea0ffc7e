//! Shared vocabulary for the vrun configuration engine: error taxonomy,
//! diagnostics, and the enums the config tree is built from.

pub mod diagnostic;
pub mod error;
pub mod types;

pub use diagnostic::{Diagnostic, Severity};
pub use error::{ErrorKind, RunnerError};

//! Progress reporting

pub mod reporter;

pub use reporter::{DispatchProgress, SimpleProgress};

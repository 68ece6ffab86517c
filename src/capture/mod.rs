//! Capture adapters.
//!
//! Pure mappers from the host's raw event shapes to normalized
//! [`Record`](crate::models::Record)s. Each adapter applies the privacy
//! filter before the record exists, returns `None` for anything it cannot or
//! must not capture, and never panics — a capture failure must never surface
//! as a host-visible crash.

mod error;
mod file_edit;
mod tool;

pub use error::error_record;
pub use file_edit::file_edit_record;
pub use tool::tool_record;

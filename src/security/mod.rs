//! Privacy filtering.
//!
//! Everything here runs *before* a record reaches the buffer, so a flush
//! retry can never leak unredacted data. All functions are pure and
//! stateless; repeated calls on fresh strings behave identically regardless
//! of call order.

mod paths;
mod redactor;
mod secrets;

pub use paths::admits_path;
pub use redactor::{ContentRedactor, REDACTED_COMMAND, REDACTED_MARKER};
pub use secrets::{SecretMatch, detect as detect_secrets};

//! HTTP protocol layer module
//!
//! Response builders, decoupled from the delay logic.

pub mod response;

// Re-export commonly used types
pub use response::{build_501_response, build_empty_json_response, EMPTY_JSON_BODY};

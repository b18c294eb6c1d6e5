//! Shared utilities for disposal-lint.

mod position;

pub use position::{offset_to_position, offset_to_utf16_position};

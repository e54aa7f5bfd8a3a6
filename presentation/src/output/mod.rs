//! Output formatting for console and JSON

pub mod console;
pub mod formatter;
pub mod json;

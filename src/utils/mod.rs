// Form parsing utilities
pub mod parse_flag;
pub mod parse_int;

// JSON utilities
pub mod json_converter;

// Re-export all utilities for convenient access
pub use parse_flag::parse_flag;
pub use parse_int::parse_positive_int;
pub use json_converter::{is_truthy, value_to_string};

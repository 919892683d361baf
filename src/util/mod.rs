//! Shared utility helpers.

pub mod error;
mod strings;

pub use error::{ImageError, ImageResult};
pub use strings::{boolean_from_string, string_compare_case_insensitive};

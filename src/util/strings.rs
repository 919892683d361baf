//! Helpers for string-valued options.

use super::{ImageError, ImageResult};

/// Maps `input` to `true` or `false` by matching it against the two accepted spellings.
pub fn boolean_from_string(input: &str, true_string: &str, false_string: &str) -> ImageResult<bool> {
    if input == true_string {
        return Ok(true);
    }
    if input == false_string {
        return Ok(false);
    }
    Err(ImageError::InvalidFlag(input.to_owned()))
}

/// Compares two strings ignoring ASCII case.
pub fn string_compare_case_insensitive(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

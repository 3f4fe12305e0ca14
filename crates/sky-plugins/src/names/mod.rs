//! Plugin and marketplace name validation.
//!
//! Names double as file names under the plugins directory, so the grammar is
//! deliberately narrow: a lowercase ASCII letter followed by up to 62
//! lowercase letters, digits, or hyphens.

use crate::error::PluginError;

/// Maximum length of a valid name.
pub const MAX_NAME_LEN: usize = 63;

/// Checks `name` against the plugin name grammar.
///
/// # Errors
///
/// Returns [`PluginError::InvalidName`] when the name is empty, longer than
/// [`MAX_NAME_LEN`], does not start with a lowercase letter, or contains
/// anything other than lowercase letters, digits, and hyphens.
///
/// ```
/// use sky_plugins::names::validate_name;
///
/// assert!(validate_name("lint-extra").is_ok());
/// assert!(validate_name("Lint").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<(), PluginError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(PluginError::InvalidName {
            name: name.to_owned(),
        })
    }
}

/// Returns `true` when `name` matches the plugin name grammar.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };
    name.len() <= MAX_NAME_LEN
        && first.is_ascii_lowercase()
        && bytes.all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
}

#[cfg(test)]
mod tests;

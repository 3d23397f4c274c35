//! Input limits for query compilation and bulk operations

use crate::error::{Error, Result};

/// Placeholder alphabet; one letter per path token
pub const PLACEHOLDERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Maximum tokens in a navigation path (26)
pub const MAX_PATH_TOKENS: usize = 26;

/// Default maximum number of ids an `"start-end"` range may expand to (100000)
pub const DEFAULT_MAX_RANGE_SPAN: u64 = 100_000;

/// Default number of in-flight operations in parallel bulk mode (32)
pub const DEFAULT_MAX_CONCURRENCY: usize = 32;

/// Maximum length of an entity, relationship or index name (128 chars)
pub const MAX_NAME_LEN: usize = 128;

/// Validate a name that will be spliced into query text
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::compilation("empty identifier"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(Error::compilation(format!(
            "identifier too long: {} chars (max {})",
            name.len(),
            MAX_NAME_LEN
        )));
    }
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !first_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::compilation(format!("invalid identifier '{}'", name)));
    }
    Ok(())
}

/// Validate a path length against the placeholder alphabet
pub fn validate_path_len(len: usize) -> Result<()> {
    if len > MAX_PATH_TOKENS {
        return Err(Error::compilation(format!(
            "path has {} tokens, placeholder alphabet allows {}",
            len, MAX_PATH_TOKENS
        )));
    }
    Ok(())
}

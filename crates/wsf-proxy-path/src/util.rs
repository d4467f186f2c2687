//! Pointer-string helpers: component escaping and token classification.

use crate::Key;

/// Unescapes a pointer path component.
///
/// `~1` is replaced with `/` and `~0` is replaced with `~`.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a pointer path component.
///
/// `~` is replaced with `~0` and `/` is replaced with `~1`.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Check if a string represents a valid non-negative integer list index.
///
/// Leading zeros are rejected so that `"007"` stays a name.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Classify a raw (already unescaped) token as an index or a name.
pub fn token_to_key(token: String) -> Key {
    if is_valid_index(&token) {
        if let Ok(idx) = token.parse::<usize>() {
            return Key::Index(idx);
        }
    }
    Key::Name(token)
}

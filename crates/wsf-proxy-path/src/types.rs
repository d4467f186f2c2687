//! Type definitions for proxy paths.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::util::is_valid_index;

/// A step in a proxy path.
///
/// A name addresses either a struct attribute or an object-map entry; which
/// one is decided by the kind of the value the key is applied to. Struct
/// attributes are addressed by name rather than by slot offset, so a path
/// stays meaningful when a schema gains or reorders attributes.
///
/// Keys compare by their pointer token: a name spelled as a list index
/// (`"100"`) equals `Key::Index(100)`, so a path built with
/// [`Path::push_map_key`](crate::Path::push_map_key) and the same path
/// parsed from a pointer are one map key.
#[derive(Debug, Clone)]
pub enum Key {
    /// Struct attribute name or object-map key.
    Name(String),
    /// Dense list index.
    Index(usize),
}

impl Key {
    /// Returns `true` for a [`Key::Name`].
    pub fn is_name(&self) -> bool {
        matches!(self, Key::Name(_))
    }

    /// Returns `true` for a [`Key::Index`].
    pub fn is_index(&self) -> bool {
        matches!(self, Key::Index(_))
    }

    /// The name carried by this key, if any.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Index(_) => None,
        }
    }

    /// The list index carried by this key, if any.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(idx) => Some(*idx),
            Key::Name(_) => None,
        }
    }

    /// The index this key addresses in a list: an index key, or a name
    /// spelled as one.
    pub fn to_index(&self) -> Option<usize> {
        match self.token() {
            Token::Index(idx) => Some(idx),
            Token::Name(_) => None,
        }
    }

    fn token(&self) -> Token<'_> {
        match self {
            Key::Index(idx) => Token::Index(*idx),
            Key::Name(name) if is_valid_index(name) => name.parse().map_or(Token::Name(name), Token::Index),
            Key::Name(name) => Token::Name(name),
        }
    }

    /// Replace the name of a [`Key::Name`]. Index keys are left untouched.
    ///
    /// Returns `true` if the key was changed.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        match self {
            Key::Name(current) => {
                *current = name.into();
                true
            }
            Key::Index(_) => false,
        }
    }
}

/// Comparison form of a key. Names order before indices.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Token<'a> {
    Name(&'a str),
    Index(usize),
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.token() == other.token()
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.token().cmp(&other.token())
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token().hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}

impl From<usize> for Key {
    fn from(idx: usize) -> Self {
        Key::Index(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_accessors() {
        let name = Key::from("platform");
        assert!(name.is_name());
        assert_eq!(name.as_name(), Some("platform"));
        assert_eq!(name.as_index(), None);

        let idx = Key::from(3usize);
        assert!(idx.is_index());
        assert_eq!(idx.as_index(), Some(3));
        assert_eq!(idx.as_name(), None);
    }

    #[test]
    fn test_key_set_name() {
        let mut key = Key::from("P1");
        assert!(key.set_name("P2"));
        assert_eq!(key, Key::Name("P2".into()));

        let mut idx = Key::Index(0);
        assert!(!idx.set_name("nope"));
        assert_eq!(idx, Key::Index(0));
    }

    #[test]
    fn test_numeric_name_is_the_index_key() {
        assert_eq!(Key::from("100"), Key::Index(100));
        assert_eq!(Key::from("100").to_index(), Some(100));
        assert_ne!(Key::from("0100"), Key::Index(100));
        assert_eq!(Key::from("0100").to_index(), None);
        assert!(Key::from("99") < Key::Index(100));
        assert!(Key::from("zzz") < Key::from("7"));
    }

    #[test]
    fn test_names_order_before_indices() {
        assert!(Key::from("zzz") < Key::Index(0));
        assert!(Key::from("a") < Key::from("b"));
        assert!(Key::Index(2) < Key::Index(10));
    }
}

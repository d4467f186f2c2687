//! Proxy paths.
//!
//! A [`Path`] is an ordered sequence of [`Key`]s identifying a location in a
//! scenario proxy tree, independent of whatever value currently lives there.
//! Paths are plain data: they compare structurally, order lexicographically
//! (so every path under a given prefix forms one contiguous range of a
//! `BTreeMap`), and render as pointer strings.
//!
//! # Example
//!
//! ```
//! use wsf_proxy_path::{Key, Path};
//!
//! let mut path = Path::root();
//! path.push_attr("platform");
//! path.push_map_key("P1");
//! assert_eq!(path.to_string(), "/platform/P1");
//!
//! let mover = path.clone().with_attr("mover");
//! assert!(path.is_prefix_of(&mover));
//! assert_eq!(mover.back(), Some(&Key::Name("mover".into())));
//!
//! let parsed: Path = "/platform/P1/mover".parse().unwrap();
//! assert_eq!(parsed, mover);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod types;
pub use types::Key;

pub mod util;
pub use util::{escape_component, is_valid_index, unescape_component};

pub mod validate;
pub use validate::{validate_depth, validate_pointer, PathError, MAX_PATH_LENGTH};

// ── Path ──────────────────────────────────────────────────────────────────

/// An ordered, comparable sequence of keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    keys: Vec<Key>,
}

impl Path {
    /// The empty path, addressing the tree root.
    pub fn root() -> Self {
        Self { keys: Vec::new() }
    }

    /// Build a path from an iterator of keys.
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of keys in the path.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    /// The keys of this path, root first.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Iterate over the keys, root first.
    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.keys.iter()
    }

    /// Key at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&Key> {
        self.keys.get(idx)
    }

    /// Last key of the path.
    pub fn back(&self) -> Option<&Key> {
        self.keys.last()
    }

    /// Mutable access to the last key of the path.
    pub fn back_mut(&mut self) -> Option<&mut Key> {
        self.keys.last_mut()
    }

    // ── Building ──────────────────────────────────────────────────────────

    /// Append any key.
    pub fn push(&mut self, key: impl Into<Key>) {
        self.keys.push(key.into());
    }

    /// Append a struct attribute name.
    pub fn push_attr(&mut self, name: impl Into<String>) {
        self.keys.push(Key::Name(name.into()));
    }

    /// Append an object-map key.
    pub fn push_map_key(&mut self, name: impl Into<String>) {
        self.keys.push(Key::Name(name.into()));
    }

    /// Append a list index.
    pub fn push_index(&mut self, idx: usize) {
        self.keys.push(Key::Index(idx));
    }

    /// Builder form of [`Path::push_attr`].
    pub fn with_attr(mut self, name: impl Into<String>) -> Self {
        self.push_attr(name);
        self
    }

    /// Builder form of [`Path::push_map_key`].
    pub fn with_map_key(mut self, name: impl Into<String>) -> Self {
        self.push_map_key(name);
        self
    }

    /// Builder form of [`Path::push_index`].
    pub fn with_index(mut self, idx: usize) -> Self {
        self.push_index(idx);
        self
    }

    /// Remove and return the last key.
    pub fn pop(&mut self) -> Option<Key> {
        self.keys.pop()
    }

    /// Keep only the first `len` keys.
    pub fn truncate(&mut self, len: usize) {
        self.keys.truncate(len);
    }

    /// Append every key of `suffix`.
    pub fn extend_from(&mut self, suffix: &Path) {
        self.keys.extend(suffix.keys.iter().cloned());
    }

    /// Concatenate `self` and `suffix` into a new path.
    pub fn join(&self, suffix: &Path) -> Path {
        let mut out = self.clone();
        out.extend_from(suffix);
        out
    }

    /// The path with its last key removed, or `None` for the root.
    pub fn parent(&self) -> Option<Path> {
        if self.keys.is_empty() {
            return None;
        }
        Some(Path {
            keys: self.keys[..self.keys.len() - 1].to_vec(),
        })
    }

    // ── Prefix tests ──────────────────────────────────────────────────────

    /// Returns `true` if `self` is a prefix of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.keys.starts_with(&self.keys)
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.keys.len() < other.keys.len() && self.is_prefix_of(other)
    }

    /// Returns `true` if `self` is the immediate parent of `other`.
    pub fn is_parent_of(&self, other: &Path) -> bool {
        self.keys.len() + 1 == other.keys.len() && self.is_prefix_of(other)
    }

    /// The remainder of `self` after `prefix`, or `None` if `prefix` does
    /// not prefix `self`.
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if !prefix.is_prefix_of(self) {
            return None;
        }
        Some(Path {
            keys: self.keys[prefix.keys.len()..].to_vec(),
        })
    }

    /// Swap the prefix `old` for `new`. Returns `None` if `old` does not
    /// prefix `self`.
    pub fn replace_prefix(&self, old: &Path, new: &Path) -> Option<Path> {
        let suffix = self.strip_prefix(old)?;
        Some(new.join(&suffix))
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    /// Render as a pointer string (`""` for the root).
    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for key in &self.keys {
            out.push('/');
            match key {
                Key::Name(name) => out.push_str(&escape_component(name)),
                Key::Index(idx) => out.push_str(&idx.to_string()),
            }
        }
        out
    }

    /// Parse a pointer string.
    ///
    /// Tokens that look like list indices become [`Key::Index`]; everything
    /// else becomes a [`Key::Name`].
    pub fn parse_pointer(pointer: &str) -> Result<Path, PathError> {
        validate_pointer(pointer)?;
        if pointer.is_empty() {
            return Ok(Path::root());
        }
        let keys: Vec<Key> = pointer[1..]
            .split('/')
            .map(|component| util::token_to_key(unescape_component(component)))
            .collect();
        validate_depth(keys.len())?;
        Ok(Path { keys })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse_pointer(s)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        Path {
            keys: iter.into_iter().collect(),
        }
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Key;

    fn index(&self, idx: usize) -> &Key {
        &self.keys[idx]
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pointer())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Path::parse_pointer(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(pointer: &str) -> Path {
        pointer.parse().unwrap()
    }

    #[test]
    fn test_root_renders_empty() {
        assert_eq!(Path::root().to_string(), "");
        assert!(Path::root().is_root());
        assert_eq!(p(""), Path::root());
    }

    #[test]
    fn test_push_pop() {
        let mut path = Path::root();
        path.push_attr("platform");
        path.push_map_key("P1");
        path.push_index(0);
        assert_eq!(path.len(), 3);
        assert_eq!(path.pop(), Some(Key::Index(0)));
        assert_eq!(path.pop(), Some(Key::Name("P1".into())));
        assert_eq!(path.to_string(), "/platform");
    }

    #[test]
    fn test_parse_numeric_tokens_as_indices() {
        let path = p("/route/R1/waypoints/2");
        assert_eq!(path[3], Key::Index(2));
        assert_eq!(path[1], Key::Name("R1".into()));
    }

    #[test]
    fn test_escaped_names_roundtrip() {
        let path = Path::root().with_attr("zone").with_map_key("a/b~c");
        let rendered = path.to_string();
        assert_eq!(rendered, "/zone/a~1b~0c");
        assert_eq!(p(&rendered), path);
    }

    #[test]
    fn test_prefix_relations() {
        let platform = p("/platform/P1");
        let mover = p("/platform/P1/mover");
        assert!(platform.is_prefix_of(&mover));
        assert!(platform.is_prefix_of(&platform));
        assert!(platform.is_ancestor_of(&mover));
        assert!(!platform.is_ancestor_of(&platform));
        assert!(platform.is_parent_of(&mover));
        assert!(!mover.is_prefix_of(&platform));
        assert!(!p("/platform/P").is_prefix_of(&mover));
    }

    #[test]
    fn test_replace_prefix() {
        let mover = p("/platform/P1/mover/defaultRoute");
        let moved = mover
            .replace_prefix(&p("/platform/P1"), &p("/platform/P2"))
            .unwrap();
        assert_eq!(moved, p("/platform/P2/mover/defaultRoute"));
        assert!(mover.replace_prefix(&p("/zone"), &p("/x")).is_none());
    }

    #[test]
    fn test_parent() {
        assert_eq!(p("/platform/P1").parent(), Some(p("/platform")));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn test_relative_pointer_rejected() {
        assert!("platform/P1".parse::<Path>().is_err());
    }

    #[test]
    fn test_prefix_range_is_contiguous_in_ordering() {
        let mut paths = vec![
            p("/platform/P2"),
            p("/platform/P1/mover"),
            p("/platform/P1"),
            p("/platformType/AIR"),
            p("/platform/P10"),
            p("/platform/P1/zone/Z"),
        ];
        paths.sort();
        let prefix = p("/platform/P1");
        let start = paths.iter().position(|x| *x == prefix).unwrap();
        let under: Vec<_> = paths[start..]
            .iter()
            .take_while(|x| prefix.is_prefix_of(x))
            .collect();
        assert_eq!(under.len(), 3);
    }
}

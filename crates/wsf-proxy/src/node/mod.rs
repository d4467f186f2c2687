//! Cursors into a [`Proxy`].
//!
//! # Overview
//!
//! A [`Node`] is a path plus a weak proxy handle. It resolves lazily: the
//! tree its path was found in is cached together with the proxy's sequence
//! number, and any structural change (add, remove, rename, tree swap) bumps
//! that number so the next access re-resolves. A node whose path no longer
//! resolves, or whose proxy was dropped, is *null*; operations on a null
//! node return `None` / `false` rather than failing.
//!
//! Descent always succeeds at the path level:
//!
//! ```
//! use wsf_proxy::Proxy;
//!
//! let proxy = Proxy::with_defaults();
//! let side = proxy.root() + "platform" + "P1" + "side";
//! assert_eq!(side.path_string(), "/platform/P1/side");
//! assert!(side.is_null());
//! ```

use std::cell::Cell;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::rc::{Rc, Weak};

use wsf_proxy_path::{Key, Path};

use crate::proxy::{Proxy, ProxyInner, TreeKind};
use crate::value::{BasicKind, Value, ValueKind};

mod assign;
mod json;
mod navigate;
mod rename;

pub use json::{value_to_json, JsonOptions};

#[derive(Debug, Clone, Copy)]
struct Resolution {
    sequence: u64,
    tree: Option<TreeKind>,
}

/// A cursor at a path in a proxy.
#[derive(Clone)]
pub struct Node {
    proxy: Weak<ProxyInner>,
    path: Path,
    basic_view: bool,
    cache: Cell<Option<Resolution>>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path.to_pointer())
            .field("basic_view", &self.basic_view)
            .finish()
    }
}

/// Nodes are equal when they address the same path in the same proxy.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.proxy.ptr_eq(&other.proxy) && self.path == other.path
    }
}

impl Node {
    pub(crate) fn new(proxy: &Proxy, path: Path) -> Self {
        Self {
            proxy: proxy.downgrade(),
            path,
            basic_view: false,
            cache: Cell::new(None),
        }
    }

    /// A node bound to no proxy. Always null.
    pub fn null() -> Self {
        Self {
            proxy: Weak::new(),
            path: Path::root(),
            basic_view: false,
            cache: Cell::new(None),
        }
    }

    fn with_path(&self, path: Path) -> Self {
        Self {
            proxy: self.proxy.clone(),
            path,
            basic_view: self.basic_view,
            cache: Cell::new(None),
        }
    }

    // ── Resolution ────────────────────────────────────────────────────────

    pub(crate) fn upgrade(&self) -> Option<Rc<ProxyInner>> {
        self.proxy.upgrade()
    }

    /// Owning handle to the proxy, if it is still alive.
    pub fn proxy(&self) -> Option<Proxy> {
        self.upgrade().map(Proxy::from_inner)
    }

    /// Resolve the path, reusing the cached tree while the sequence number
    /// is unchanged.
    pub(crate) fn resolve(&self) -> Option<(Rc<ProxyInner>, TreeKind)> {
        let inner = self.upgrade()?;
        let tree = {
            let state = inner.state.borrow();
            match self.cache.get() {
                Some(res) if res.sequence == state.sequence => res.tree,
                _ => {
                    let tree = state.locate(&self.path, self.basic_view);
                    self.cache.set(Some(Resolution {
                        sequence: state.sequence,
                        tree,
                    }));
                    tree
                }
            }
        };
        tree.map(|t| (inner, t))
    }

    /// Returns `true` if the path currently resolves, re-locating it when
    /// the cached resolution is stale.
    pub fn is_valid(&self) -> bool {
        self.resolve().is_some()
    }

    /// Returns `true` if the cached resolution matches the current sequence
    /// number.
    #[cfg(test)]
    fn is_cache_current(&self) -> bool {
        let Some(inner) = self.upgrade() else {
            return false;
        };
        let sequence = inner.state.borrow().sequence;
        matches!(self.cache.get(), Some(res) if res.sequence == sequence)
    }

    /// Drop the cached resolution.
    pub fn invalidate(&self) {
        self.cache.set(None);
    }

    /// Returns `true` if the path resolves to nothing.
    pub fn is_null(&self) -> bool {
        self.resolve().is_none()
    }

    /// Run `f` on the resolved value.
    pub fn with_value<R>(&self, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let (inner, tree) = self.resolve()?;
        let state = inner.state.borrow();
        state.tree(tree).lookup(&self.path).map(f)
    }

    /// Deep copy of the resolved value, without inheritance fallback.
    pub fn value(&self) -> Option<Value> {
        self.with_value(Value::clone)
    }

    pub fn value_kind(&self) -> Option<ValueKind> {
        self.with_value(Value::kind)
    }

    // ── Navigation ────────────────────────────────────────────────────────

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_string(&self) -> String {
        self.path.to_pointer()
    }

    /// Child at a struct attribute or object-map entry.
    pub fn at_key(&self, name: &str) -> Node {
        self.with_path(self.path.clone().with_attr(name))
    }

    /// Child at a list index.
    pub fn at_index(&self, index: usize) -> Node {
        self.with_path(self.path.clone().with_index(index))
    }

    /// Descendant at a relative path.
    pub fn at_path(&self, relative: &Path) -> Node {
        self.with_path(self.path.join(relative))
    }

    /// Node at an absolute path in the same proxy and view.
    pub fn at_absolute(&self, path: Path) -> Node {
        self.with_path(path)
    }

    pub fn parent(&self) -> Option<Node> {
        self.path.parent().map(|p| self.with_path(p))
    }

    pub fn root(&self) -> Node {
        self.with_path(Path::root())
    }

    /// Last path key rendered as text; empty at the root.
    pub fn name(&self) -> String {
        self.path.back().map(Key::to_string).unwrap_or_default()
    }

    /// Last path key if it names a struct attribute (parent is a struct).
    pub fn attr_name(&self) -> Option<String> {
        let parent = self.parent()?;
        let is_struct = parent.value_kind()? == ValueKind::Struct;
        is_struct.then(|| self.name())
    }

    /// Direct child keys of the resolved value.
    pub fn child_keys(&self) -> Vec<Key> {
        self.with_value(Value::child_keys).unwrap_or_default()
    }

    pub fn children(&self) -> Vec<Node> {
        self.child_keys()
            .into_iter()
            .map(|k| {
                let mut path = self.path.clone();
                path.push(k);
                self.with_path(path)
            })
            .collect()
    }

    // ── Views ─────────────────────────────────────────────────────────────

    /// Restrict lookups to the basic-type tree. Returns `true` if the view
    /// changed and the path resolves in it.
    pub fn switch_to_basic_types(&mut self) -> bool {
        self.switch_view(true)
    }

    /// Look up in the user tree first, then the basic-type tree. Returns
    /// `true` if the view changed and the path resolves in it.
    pub fn switch_to_user_types(&mut self) -> bool {
        self.switch_view(false)
    }

    fn switch_view(&mut self, basic: bool) -> bool {
        let changed = self.basic_view != basic;
        self.basic_view = basic;
        self.invalidate();
        changed && self.is_valid()
    }

    pub fn is_basic_view(&self) -> bool {
        self.basic_view
    }

    /// Returns `true` if the path resolved in the basic-type tree.
    pub fn is_of_basic_tree(&self) -> bool {
        matches!(self.resolve(), Some((_, TreeKind::Basic)))
    }

    // ── Type introspection ────────────────────────────────────────────────

    pub fn is_a_basic_type(&self) -> bool {
        self.value_kind() == Some(ValueKind::Basic)
    }

    pub fn is_a_struct_type(&self) -> bool {
        self.value_kind() == Some(ValueKind::Struct)
    }

    pub fn is_a_list_type(&self) -> bool {
        self.value_kind() == Some(ValueKind::List)
    }

    pub fn is_a_map_type(&self) -> bool {
        self.value_kind() == Some(ValueKind::ObjectMap)
    }

    /// Returns `true` if the value is a basic value of kind `name`
    /// (`"string"`, `"Length"`, ...).
    pub fn is_of_basic_type(&self, name: &str) -> bool {
        let Some(expected) = BasicKind::from_name(name) else {
            return false;
        };
        self.with_value(|v| v.as_basic().is_some_and(|b| b.kind() == expected))
            .unwrap_or(false)
    }

    /// Returns `true` if the value is a struct whose predefined type is
    /// `name` or derives from it.
    pub fn is_a_predefined_struct_type_of(&self, name: &str) -> bool {
        self.with_value(|v| v.as_struct().is_some_and(|s| s.struct_type().is_a(name)))
            .unwrap_or(false)
    }

    /// Returns `true` if the value is a struct whose type name, or one of
    /// its user type names (its inheritance chain), is `name`.
    pub fn is_a_struct_type_of(&self, name: &str) -> bool {
        self.is_a_predefined_struct_type_of(name) || self.is_of_user_type(name)
    }

    /// Returns `true` if `name` appears among the user types this value
    /// inherits from.
    pub fn is_of_user_type(&self, name: &str) -> bool {
        self.inherited_type_names().iter().any(|n| n == name)
    }

    pub fn is_a_list_type_of(&self, element: &str) -> bool {
        self.with_value(|v| v.as_list().is_some_and(|l| l.element_type().name() == element))
            .unwrap_or(false)
    }

    pub fn is_a_map_type_of(&self, element: &str) -> bool {
        self.with_value(|v| {
            v.as_object_map()
                .is_some_and(|m| m.element_type().name() == element)
        })
        .unwrap_or(false)
    }

    /// Returns `true` if the declared type name is exactly `name`.
    pub fn is_of_type(&self, name: &str) -> bool {
        self.with_value(|v| v.type_desc().name() == name).unwrap_or(false)
    }
}

// ── Operators ─────────────────────────────────────────────────────────────

impl Add<&str> for Node {
    type Output = Node;

    fn add(mut self, name: &str) -> Node {
        self += name;
        self
    }
}

impl Add<usize> for Node {
    type Output = Node;

    fn add(mut self, index: usize) -> Node {
        self += index;
        self
    }
}

impl Add<&Path> for Node {
    type Output = Node;

    fn add(mut self, relative: &Path) -> Node {
        self.path.extend_from(relative);
        self.invalidate();
        self
    }
}

impl AddAssign<&str> for Node {
    fn add_assign(&mut self, name: &str) {
        self.path.push_attr(name);
        self.invalidate();
    }
}

impl AddAssign<usize> for Node {
    fn add_assign(&mut self, index: usize) {
        self.path.push_index(index);
        self.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descent_always_builds_paths() {
        let proxy = Proxy::with_defaults();
        let node = proxy.root() + "routes" + "R" + "waypoints" + 2usize;
        assert_eq!(node.path_string(), "/routes/R/waypoints/2");
        assert!(node.is_null());
        assert_eq!(node.name(), "2");
    }

    #[test]
    fn test_resolution_is_cached_per_sequence() {
        let proxy = Proxy::with_defaults();
        let zones = proxy.root().at_key("zone");
        assert!(!zones.is_cache_current());
        assert!(!zones.is_null());
        assert!(zones.is_cache_current());
        proxy.increment_sequence_number();
        assert!(!zones.is_cache_current());
        assert!(zones.is_valid());
        assert!(zones.is_cache_current());
    }

    #[test]
    fn test_validity_follows_the_tree() {
        let proxy = Proxy::with_defaults();
        let zone = proxy.root() + "zone" + "Z1";
        assert!(!zone.is_valid());

        let def = proxy.registry().default_value("ZoneDefinition").unwrap();
        assert!(proxy.root().at_key("zone").add_child("Z1", def));
        assert!(zone.is_valid());

        zone.invalidate();
        assert!(zone.is_valid());

        assert!(proxy.root().at_key("zone").remove_child("Z1"));
        zone.invalidate();
        assert!(!zone.is_valid());
    }

    #[test]
    fn test_switching_views_reports_resolution() {
        let proxy = Proxy::with_defaults();
        let mut air = proxy.root() + "moverType" + "WSF_AIR_MOVER";
        assert!(!air.switch_to_user_types());
        assert!(air.switch_to_basic_types());
        assert!(!air.switch_to_basic_types());
        assert!(air.is_basic_view());
        assert!(air.switch_to_user_types());

        let mut missing = proxy.root() + "platform" + "P9";
        assert!(!missing.switch_to_basic_types());
        assert!(missing.is_basic_view());
    }

    #[test]
    fn test_node_of_dropped_proxy_is_null() {
        let node = {
            let proxy = Proxy::with_defaults();
            proxy.root().at_key("platform")
        };
        assert!(node.is_null());
        assert!(node.proxy().is_none());
    }

    #[test]
    fn test_user_view_falls_back_to_basic_tree() {
        let proxy = Proxy::with_defaults();
        let mut air = proxy.root() + "moverType" + "WSF_AIR_MOVER";
        assert!(air.is_of_basic_tree());
        assert!(air.is_a_predefined_struct_type_of("WSF_ROUTE_MOVER"));
        air.switch_to_basic_types();
        assert!(!air.is_null());

        let mut platforms = proxy.root().at_key("platform");
        assert!(!platforms.is_of_basic_tree());
        platforms.switch_to_basic_types();
        assert!(platforms.is_of_basic_tree());
    }

    #[test]
    fn test_type_introspection() {
        let proxy = Proxy::with_defaults();
        let side = proxy.root() + "platformType" + "WSF_PLATFORM" + "side";
        assert!(side.is_a_basic_type());
        assert!(side.is_of_basic_type("string"));
        assert!(!side.is_of_basic_type("Length"));
        let sensors = proxy.root() + "platformType" + "WSF_PLATFORM" + "sensors";
        assert!(sensors.is_a_map_type());
        assert!(sensors.is_a_map_type_of("Sensor"));
        assert!(sensors.is_of_type("ObjectMap<Sensor>"));
        assert_eq!(side.attr_name().as_deref(), Some("side"));
        assert_eq!(side.with_value(Value::is_unset), Some(true));
    }
}

//! The value tree.
//!
//! # Overview
//!
//! [`Value`] is a closed sum of four kinds:
//!
//! - [`BasicValue`]: a leaf scalar carrying `unset` / `inherited` flags,
//! - [`StructValue`]: schema-ordered named attributes plus an optional base path,
//! - [`ListValue`]: a dense homogeneous sequence,
//! - [`ObjectMapValue`]: a named homogeneous map.
//!
//! Lookups never panic: a key applied to the wrong kind, or a missing
//! attribute, index or entry, yields `None`.

use wsf_proxy_path::{Key, Path};

pub mod basic;
mod list;
mod object_map;
mod struct_value;
pub mod types;

pub use basic::{
    AltitudeReference, BasicData, BasicKind, BasicValue, Color, FromBasic, LatLon, Length2,
};
pub use list::ListValue;
pub use object_map::ObjectMapValue;
pub use struct_value::StructValue;
pub use types::{AttributeDef, StructType, TypeDesc, TypeRegistry};

/// Which of the four kinds a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Basic,
    Struct,
    List,
    ObjectMap,
}

/// How [`Value::copy`] treats markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Preserve `unset` / `inherited` markers as they are.
    Exact,
    /// Mark every value in the copy inherited. Used to instantiate a new
    /// entity from a type.
    AsInherited,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Basic(BasicValue),
    Struct(StructValue),
    List(ListValue),
    ObjectMap(ObjectMapValue),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Basic(_) => ValueKind::Basic,
            Value::Struct(_) => ValueKind::Struct,
            Value::List(_) => ValueKind::List,
            Value::ObjectMap(_) => ValueKind::ObjectMap,
        }
    }

    pub fn type_desc(&self) -> TypeDesc {
        match self {
            Value::Basic(v) => TypeDesc::Basic(v.kind()),
            Value::Struct(v) => v.type_desc(),
            Value::List(v) => v.type_desc(),
            Value::ObjectMap(v) => v.type_desc(),
        }
    }

    // ── Kind accessors ────────────────────────────────────────────────────

    pub fn as_basic(&self) -> Option<&BasicValue> {
        match self {
            Value::Basic(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_basic_mut(&mut self) -> Option<&mut BasicValue> {
        match self {
            Value::Basic(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut ListValue> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_map(&self) -> Option<&ObjectMapValue> {
        match self {
            Value::ObjectMap(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_map_mut(&mut self) -> Option<&mut ObjectMapValue> {
        match self {
            Value::ObjectMap(v) => Some(v),
            _ => None,
        }
    }

    // ── Navigation ────────────────────────────────────────────────────────

    /// Struct attribute `name`.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.as_struct()?.attr(name)
    }

    /// List element `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_list()?.get(index)
    }

    /// Object-map entry `name`.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.as_object_map()?.find(name)
    }

    /// Apply one key. A name selects a struct attribute or a map entry; an
    /// index selects a list element, or a map entry named by the digits. A
    /// name spelled as an index also selects a list element.
    pub fn child(&self, key: &Key) -> Option<&Value> {
        match (self, key) {
            (Value::Struct(s), Key::Name(name)) => s.attr(name),
            (Value::ObjectMap(m), Key::Name(name)) => m.find(name),
            (Value::ObjectMap(m), Key::Index(idx)) => m.find(&idx.to_string()),
            (Value::List(l), key) => key.to_index().and_then(|idx| l.get(idx)),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, key: &Key) -> Option<&mut Value> {
        match (self, key) {
            (Value::Struct(s), Key::Name(name)) => s.attr_mut(name),
            (Value::ObjectMap(m), Key::Name(name)) => m.find_mut(name),
            (Value::ObjectMap(m), Key::Index(idx)) => m.find_mut(&idx.to_string()),
            (Value::List(l), key) => match key.to_index() {
                Some(idx) => l.get_mut(idx),
                None => None,
            },
            _ => None,
        }
    }

    /// Resolve a path relative to this value.
    pub fn lookup(&self, path: &Path) -> Option<&Value> {
        let mut cur = self;
        for key in path {
            cur = cur.child(key)?;
        }
        Some(cur)
    }

    pub fn lookup_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut cur = self;
        for key in path {
            cur = cur.child_mut(key)?;
        }
        Some(cur)
    }

    /// Names or indices of the direct children, in order.
    pub fn child_keys(&self) -> Vec<Key> {
        match self {
            Value::Basic(_) => Vec::new(),
            Value::Struct(s) => s.attr_names().map(Key::from).collect(),
            Value::List(l) => (0..l.len()).map(Key::Index).collect(),
            Value::ObjectMap(m) => m.names().map(Key::from).collect(),
        }
    }

    // ── Flags ─────────────────────────────────────────────────────────────

    /// Unset flag of a basic value; containers are never unset.
    pub fn is_unset(&self) -> bool {
        matches!(self, Value::Basic(b) if b.is_unset())
    }

    pub fn is_inherited(&self) -> bool {
        match self {
            Value::Basic(v) => v.is_inherited(),
            Value::Struct(v) => v.is_inherited(),
            Value::List(v) => v.is_inherited(),
            Value::ObjectMap(v) => v.is_inherited(),
        }
    }

    /// Set the inherited flag on this value only.
    pub fn set_inherited(&mut self, inherited: bool) {
        match self {
            Value::Basic(v) => v.set_inherited(inherited),
            Value::Struct(v) => v.set_inherited(inherited),
            Value::List(v) => v.set_inherited(inherited),
            Value::ObjectMap(v) => v.set_inherited(inherited),
        }
    }

    /// Set the inherited flag on this value and everything below it.
    pub fn mark_inherited_deep(&mut self, inherited: bool) {
        self.set_inherited(inherited);
        match self {
            Value::Basic(_) => {}
            Value::Struct(s) => s.attrs_mut().for_each(|(_, v)| v.mark_inherited_deep(inherited)),
            Value::List(l) => l.iter_mut().for_each(|v| v.mark_inherited_deep(inherited)),
            Value::ObjectMap(m) => m.iter_mut().for_each(|(_, v)| v.mark_inherited_deep(inherited)),
        }
    }

    /// Unset every basic leaf; lists and maps are emptied.
    pub fn set_unset(&mut self) {
        match self {
            Value::Basic(v) => v.set_unset(),
            Value::Struct(s) => s.attrs_mut().for_each(|(_, v)| v.set_unset()),
            Value::List(l) => l.clear(),
            Value::ObjectMap(m) => {
                let names: Vec<String> = m.names().map(str::to_string).collect();
                for name in names {
                    m.erase(&name);
                }
            }
        }
    }

    /// Deep copy.
    pub fn copy(&self, mode: CopyMode) -> Value {
        let mut out = self.clone();
        if mode == CopyMode::AsInherited {
            out.mark_inherited_deep(true);
        }
        out
    }

    /// Display form of a basic value; empty for unset values and containers.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Basic(b) => b.to_display_string(),
            _ => String::new(),
        }
    }

    /// Visit every struct with a base in this subtree, with its path
    /// relative to `prefix`.
    pub fn for_each_base(&self, prefix: &Path, f: &mut dyn FnMut(&Path, &Path)) {
        match self {
            Value::Basic(_) => {}
            Value::Struct(s) => {
                if let Some(base) = s.base() {
                    f(prefix, base);
                }
                for (name, child) in s.attrs() {
                    child.for_each_base(&prefix.clone().with_attr(name), f);
                }
            }
            Value::List(l) => {
                for (idx, child) in l.iter().enumerate() {
                    child.for_each_base(&prefix.clone().with_index(idx), f);
                }
            }
            Value::ObjectMap(m) => {
                for (name, child) in m.iter() {
                    child.for_each_base(&prefix.clone().with_map_key(name), f);
                }
            }
        }
    }
}

impl From<BasicValue> for Value {
    fn from(v: BasicValue) -> Self {
        Value::Basic(v)
    }
}

impl From<BasicData> for Value {
    fn from(v: BasicData) -> Self {
        Value::Basic(BasicValue::new(v))
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Value::Struct(v)
    }
}

impl From<ListValue> for Value {
    fn from(v: ListValue) -> Self {
        Value::List(v)
    }
}

impl From<ObjectMapValue> for Value {
    fn from(v: ObjectMapValue) -> Self {
        Value::ObjectMap(v)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::units::UnitKind;

    fn sample() -> Value {
        let point = Arc::new(
            StructType::new("Waypoint")
                .attr("altitude", TypeDesc::unit(UnitKind::Length))
                .attr("label", TypeDesc::string()),
        );
        let route = Arc::new(
            StructType::new("Route").attr("waypoints", TypeDesc::list_of(TypeDesc::of_struct(&point))),
        );
        let root = Arc::new(StructType::new("Root").attr("routes", TypeDesc::map_of(TypeDesc::of_struct(&route))));

        let mut wp = StructValue::new(&point);
        wp.set_attr("label", BasicData::from("start").into());
        let mut r = StructValue::new(&route);
        r.attr_mut("waypoints")
            .and_then(Value::as_list_mut)
            .unwrap()
            .push(wp.into());
        let mut v = Value::Struct(StructValue::new(&root));
        v.as_struct_mut()
            .and_then(|s| s.attr_mut("routes"))
            .and_then(Value::as_object_map_mut)
            .unwrap()
            .insert("R1", r.into());
        v
    }

    #[test]
    fn test_lookup_through_every_kind() {
        let v = sample();
        let path: Path = "/routes/R1/waypoints/0/label".parse().unwrap();
        let label = v.lookup(&path).unwrap();
        assert_eq!(label.to_display_string(), "start");
    }

    #[test]
    fn test_lookup_wrong_kind_is_none() {
        let v = sample();
        assert!(v.lookup(&"/routes/0".parse().unwrap()).is_none());
        assert!(v.lookup(&"/routes/R1/waypoints/label".parse().unwrap()).is_none());
        assert!(v.lookup(&"/routes/R1/waypoints/3".parse().unwrap()).is_none());
        assert!(v.attr("missing").is_none());
        assert!(v.get(0).is_none());
    }

    #[test]
    fn test_copy_as_inherited_marks_every_level() {
        let v = sample();
        let copy = v.copy(CopyMode::AsInherited);
        let label = copy.lookup(&"/routes/R1/waypoints/0/label".parse().unwrap()).unwrap();
        assert!(label.is_inherited());
        assert!(copy.is_inherited());
        let exact = v.copy(CopyMode::Exact);
        assert!(!exact.is_inherited());
        assert_eq!(exact, v);
    }

    #[test]
    fn test_set_unset_clears_leaves() {
        let mut v = sample();
        let wp_path: Path = "/routes/R1/waypoints/0".parse().unwrap();
        v.lookup_mut(&wp_path).unwrap().set_unset();
        assert!(v.lookup(&wp_path.clone().with_attr("label")).unwrap().is_unset());
    }
}

//! Object-map and list wrappers.

use std::marker::PhantomData;

use wsf_proxy_path::Key;

use super::{typed, PmNode};
use crate::node::Node;
use crate::schema::catalog;
use crate::value::{BasicData, Value};

/// Type catalog holding the types of elements declared as `element`.
fn type_catalog(element: &str) -> Option<&'static str> {
    Some(match element {
        "Platform" => catalog::PLATFORM_TYPE,
        "Mover" => catalog::MOVER_TYPE,
        "Sensor" => catalog::SENSOR_TYPE,
        "Comm" => catalog::COMM_TYPE,
        "Router" => catalog::ROUTER_TYPE,
        "Weapon" => catalog::WEAPON_TYPE,
        "Processor" => catalog::PROCESSOR_TYPE,
        _ => return None,
    })
}

fn key_names(keys: Vec<Key>) -> Vec<String> {
    keys.iter().filter_map(Key::as_name).map(str::to_string).collect()
}

// ── Object maps ───────────────────────────────────────────────────────────

/// An object map of named entries.
#[derive(Debug, Clone, PartialEq)]
pub struct PmObjectMap {
    node: Node,
}

impl std::ops::Deref for PmObjectMap {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl PmObjectMap {
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Entry names of the map this node resolves to.
    pub fn names(&self) -> Vec<String> {
        key_names(self.node.child_keys())
    }

    /// Entry names declared in the user tree.
    pub fn user_names(&self) -> Vec<String> {
        if self.node.is_null() || self.node.is_of_basic_tree() {
            return Vec::new();
        }
        self.names()
    }

    /// Entry names of the predefined (basic-type) map.
    pub fn basic_names(&self) -> Vec<String> {
        let mut basic = self.node.clone();
        basic.switch_to_basic_types();
        key_names(basic.child_keys())
    }

    /// User entries followed by predefined entries not shadowed by one.
    pub fn all_names(&self) -> Vec<String> {
        let mut names = self.user_names();
        for name in self.basic_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.node.at_key(name).is_null()
    }

    /// Entry `name`, checked against `T`.
    pub fn find<T: PmNode>(&self, name: &str) -> Option<T> {
        typed(self.node.at_key(name))
    }

    pub fn find_node(&self, name: &str) -> Option<Node> {
        let node = self.node.at_key(name);
        (!node.is_null()).then_some(node)
    }

    /// Insert `value` as entry `name`.
    pub fn add(&self, name: &str, value: Value) -> Option<Node> {
        self.node.add_child(name, value).then(|| self.node.at_key(name))
    }

    /// Add entry `name` as an instance of `type_name`, looked up in the
    /// type catalog matching this map's element type (or in this map itself
    /// for maps that are not typed from a catalog).
    pub fn add_instance<T: PmNode>(&self, name: &str, type_name: &str) -> Option<T> {
        let element = self
            .node
            .with_value(|v| v.as_object_map().map(|m| m.element_type().name()))
            .flatten()?;
        let type_path = match type_catalog(&element) {
            Some(catalog_name) => super::PmRoot::type_path(catalog_name, type_name),
            None => self.node.path().clone().with_map_key(type_name),
        };
        if !self.node.instantiate(name, &type_path) {
            return None;
        }
        typed(self.node.at_key(name))
    }

    /// Add entry `name` as a fresh value of the predefined struct type
    /// `struct_type`.
    pub fn add_default<T: PmNode>(&self, name: &str, struct_type: &str) -> Option<T> {
        let proxy = self.node.proxy()?;
        let value = proxy.registry().default_value(struct_type)?;
        typed(self.add(name, value)?)
    }

    pub fn remove(&self, name: &str) -> bool {
        self.node.remove_child(name)
    }

    /// Rename entry `old` to `new`.
    pub fn move_entry(&self, old: &str, new: &str) -> bool {
        self.node.at_key(old).rename(new)
    }

    pub fn len(&self) -> usize {
        self.node.child_keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of the resolved map, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (String, Node)> + '_ {
        self.names().into_iter().map(|name| {
            let node = self.node.at_key(&name);
            (name, node)
        })
    }
}

/// An object map whose entries are read as `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct PmObjectMapT<T> {
    map: PmObjectMap,
    _marker: PhantomData<T>,
}

impl<T> std::ops::Deref for PmObjectMapT<T> {
    type Target = PmObjectMap;

    fn deref(&self) -> &PmObjectMap {
        &self.map
    }
}

impl<T: PmNode> PmObjectMapT<T> {
    pub fn new(node: Node) -> Self {
        Self {
            map: PmObjectMap::new(node),
            _marker: PhantomData,
        }
    }

    pub fn find(&self, name: &str) -> Option<T> {
        self.map.find(name)
    }

    pub fn add_instance(&self, name: &str, type_name: &str) -> Option<T> {
        self.map.add_instance(name, type_name)
    }

    /// Add a default-constructed `struct_type` entry. The wrapper type is
    /// chosen by the caller, so a map of `PmZone` can hand back a
    /// `PmZoneDefinition`.
    pub fn add_default<U: PmNode>(&self, name: &str, struct_type: &str) -> Option<U> {
        self.map.add_default(name, struct_type)
    }

    /// Entries of the resolved map that convert to `T`.
    pub fn values(&self) -> Vec<T> {
        self.map.names().iter().filter_map(|n| self.find(n)).collect()
    }

    /// User and predefined entries that convert to `T`.
    pub fn all_values(&self) -> Vec<T> {
        self.map.all_names().iter().filter_map(|n| self.find(n)).collect()
    }
}

// ── Lists ─────────────────────────────────────────────────────────────────

/// A list of values.
#[derive(Debug, Clone, PartialEq)]
pub struct PmList {
    node: Node,
}

impl std::ops::Deref for PmList {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl PmList {
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn len(&self) -> usize {
        self.node
            .with_value(|v| v.as_list().map_or(0, |l| l.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Node> {
        (index < self.len()).then(|| self.node.at_index(index))
    }

    pub fn push(&self, value: Value) -> bool {
        self.node.push_child(value)
    }

    /// Append a fresh value of the list's element type.
    pub fn push_default(&self) -> Option<Node> {
        let element = self
            .node
            .with_value(|v| v.as_list().map(|l| l.element_type().default_value()))
            .flatten()?;
        let index = self.len();
        self.push(element).then(|| self.node.at_index(index))
    }

    pub fn remove(&self, index: usize) -> bool {
        self.node.remove_index(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = Node> + '_ {
        (0..self.len()).map(|i| self.node.at_index(i))
    }

    /// Display form of every element.
    pub fn strings(&self) -> Vec<String> {
        self.node
            .effective_value()
            .and_then(|v| {
                v.as_list()
                    .map(|l| l.iter().map(Value::to_display_string).collect())
            })
            .unwrap_or_default()
    }

    /// Append a string element.
    pub fn push_str(&self, text: &str) -> bool {
        self.push(Value::from(BasicData::from(text)))
    }
}

/// A list whose elements are read as `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct PmListT<T> {
    list: PmList,
    _marker: PhantomData<T>,
}

impl<T> std::ops::Deref for PmListT<T> {
    type Target = PmList;

    fn deref(&self) -> &PmList {
        &self.list
    }
}

impl<T: PmNode> PmListT<T> {
    pub fn new(node: Node) -> Self {
        Self {
            list: PmList::new(node),
            _marker: PhantomData,
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        typed(self.list.get(index)?)
    }

    /// Append a fresh element and return it as `T`.
    pub fn push_default(&self) -> Option<T> {
        typed(self.list.push_default()?)
    }

    pub fn values(&self) -> Vec<T> {
        self.list.iter().filter_map(typed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pm::{PmMover, PmPlatform, PmRoot, PmSensor, PmZoneDefinition};
    use crate::proxy::Proxy;

    #[test]
    fn test_names_split_by_tree() {
        let proxy = Proxy::with_defaults();
        let movers = PmRoot::new(&proxy).mover_types();
        assert!(movers.user_names().is_empty());
        assert!(movers.basic_names().contains(&"WSF_GROUND_MOVER".to_string()));
        let jet: PmMover = movers.add_instance("JET", "WSF_AIR_MOVER").unwrap();
        assert_eq!(jet.name(), "JET");
        assert_eq!(movers.user_names(), vec!["JET".to_string()]);
        assert_eq!(movers.all_names().first().map(String::as_str), Some("JET"));
        assert!(movers.all_values().len() > 1);
    }

    #[test]
    fn test_add_instance_uses_element_catalog() {
        let proxy = Proxy::with_defaults();
        let root = PmRoot::new(&proxy);
        let p1 = root.platforms().add_instance("P1", "WSF_PLATFORM").unwrap();
        let sensors = p1.sensors();
        let radar: PmSensor = sensors.add_instance("radar", "WSF_RADAR_SENSOR").unwrap();
        assert_eq!(radar.base_path().unwrap().to_pointer(), "/sensorType/WSF_RADAR_SENSOR");
        assert!(sensors.add_instance("eye", "NO_SUCH_SENSOR").is_none());
        assert!(root.platforms().find("P1").is_some());
    }

    #[test]
    fn test_remove_and_move_entries() {
        let proxy = Proxy::with_defaults();
        let zones = PmRoot::new(&proxy).zones();
        let _: PmZoneDefinition = zones.add_default("Z1", "ZoneDefinition").unwrap();
        assert!(zones.move_entry("Z1", "Z2"));
        assert!(!zones.contains("Z1"));
        assert!(zones.contains("Z2"));
        assert!(zones.remove("Z2"));
        assert!(zones.is_empty());
    }

    #[test]
    fn test_string_list() {
        let proxy = Proxy::with_defaults();
        let p1: PmPlatform = PmRoot::new(&proxy).platforms().add_instance("P1", "WSF_PLATFORM").unwrap();
        let categories = p1.categories();
        assert!(categories.push_str("fighter"));
        assert!(categories.push_str("blue"));
        assert_eq!(categories.strings(), vec!["fighter", "blue"]);
        assert!(categories.remove(0));
        assert_eq!(categories.len(), 1);
        assert!(categories.get(1).is_none());
    }
}

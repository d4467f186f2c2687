use indexmap::IndexMap;

use super::types::TypeDesc;
use super::Value;

/// A named, homogeneous map. Entries keep insertion order.
///
/// A map only ever holds one partition: the user and basic partitions of a
/// catalog are the maps found at the same path in the two proxy trees.
#[derive(Debug, Clone)]
pub struct ObjectMapValue {
    elem: TypeDesc,
    entries: IndexMap<String, Value>,
    inherited: bool,
}

impl ObjectMapValue {
    pub fn new(elem: TypeDesc) -> Self {
        Self {
            elem,
            entries: IndexMap::new(),
            inherited: false,
        }
    }

    pub fn element_type(&self) -> &TypeDesc {
        &self.elem
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn find(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries.get_mut(name)
    }

    /// Add a new entry. Fails if `name` exists or `value` has the wrong type.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if self.entries.contains_key(&name) || !self.elem.accepts(&value.type_desc()) {
            return false;
        }
        self.entries.insert(name, value);
        true
    }

    /// Add or overwrite an entry. Fails only on a type mismatch.
    pub fn upsert(&mut self, name: impl Into<String>, value: Value) -> bool {
        if !self.elem.accepts(&value.type_desc()) {
            return false;
        }
        self.entries.insert(name.into(), value);
        true
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn erase(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    /// Returns `true` if `old` exists and `new` does not.
    pub fn can_rename(&self, old: &str, new: &str) -> bool {
        old != new && self.entries.contains_key(old) && !self.entries.contains_key(new)
    }

    /// Move the stored value from `old` to `new`, keeping its position.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if !self.can_rename(old, new) {
            return false;
        }
        let Some((index, _, value)) = self.entries.shift_remove_full(old) else {
            return false;
        };
        self.entries.shift_insert(index, new.to_string(), value);
        true
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn set_inherited(&mut self, inherited: bool) {
        self.inherited = inherited;
    }

    pub fn type_desc(&self) -> TypeDesc {
        TypeDesc::ObjectMap(Box::new(self.elem.clone()))
    }
}

impl PartialEq for ObjectMapValue {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem && self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{BasicData, BasicValue};

    fn int(v: i64) -> Value {
        Value::Basic(BasicValue::new(BasicData::Int(v)))
    }

    #[test]
    fn test_insert_rejects_duplicates_and_mismatches() {
        let mut map = ObjectMapValue::new(TypeDesc::int());
        assert!(map.insert("a", int(1)));
        assert!(!map.insert("a", int(2)));
        assert!(!map.insert("b", Value::Basic(BasicValue::new(BasicData::Bool(true)))));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_rename_keeps_position_and_value() {
        let mut map = ObjectMapValue::new(TypeDesc::int());
        map.insert("a", int(1));
        map.insert("b", int(2));
        map.insert("c", int(3));
        assert!(map.rename("b", "z"));
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "z", "c"]);
        assert_eq!(map.find("z"), Some(&int(2)));
        assert!(map.find("b").is_none());
    }

    #[test]
    fn test_rename_to_existing_name_is_rejected() {
        let mut map = ObjectMapValue::new(TypeDesc::int());
        map.insert("a", int(1));
        map.insert("b", int(2));
        let before = map.clone();
        assert!(!map.rename("a", "b"));
        assert!(!map.rename("a", "a"));
        assert!(!map.rename("missing", "q"));
        assert_eq!(map, before);
    }
}

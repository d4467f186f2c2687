use super::types::TypeDesc;
use super::Value;

/// A dense, homogeneous sequence.
#[derive(Debug, Clone)]
pub struct ListValue {
    elem: TypeDesc,
    items: Vec<Value>,
    inherited: bool,
}

impl ListValue {
    pub fn new(elem: TypeDesc) -> Self {
        Self {
            elem,
            items: Vec::new(),
            inherited: false,
        }
    }

    pub fn element_type(&self) -> &TypeDesc {
        &self.elem
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    /// Append `value`. Fails on an element type mismatch.
    pub fn push(&mut self, value: Value) -> bool {
        if !self.elem.accepts(&value.type_desc()) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Insert `value` at `index` (clamped to the length).
    pub fn insert(&mut self, index: usize, value: Value) -> bool {
        if !self.elem.accepts(&value.type_desc()) {
            return false;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, value);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.items.pop()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.items.iter_mut()
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    pub fn set_inherited(&mut self, inherited: bool) {
        self.inherited = inherited;
    }

    pub fn type_desc(&self) -> TypeDesc {
        TypeDesc::List(Box::new(self.elem.clone()))
    }
}

impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem && self.items == other.items
    }
}

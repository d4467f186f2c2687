//! Writes through a node.
//!
//! Every mutation follows the same protocol: resolve, reject (returning
//! `false`) if the write is impossible or changes nothing, notify
//! `Before`, write, notify `After`. Writes into a type are then pushed to
//! the values derived from it that still carry an inherited copy.

use std::collections::BTreeSet;

use wsf_proxy_path::Path;

use super::navigate::{effective_in, inherited_path_in};
use super::Node;
use crate::proxy::{ChangeKind, Proxy, ProxyState, TreeKind};
use crate::value::{BasicData, CopyMode, Value};

/// Whether `new` may overwrite `existing` in place.
fn compatible(existing: &Value, new: &Value) -> bool {
    let (a, b) = (existing.type_desc(), new.type_desc());
    a.accepts(&b) || b.accepts(&a)
}

/// Copy every still-inherited part of `base` into `own`.
fn refresh_inherited(own: &mut Value, base: &Value) {
    match (own, base) {
        (Value::Basic(o), Value::Basic(b)) => {
            if (o.is_inherited() || o.is_unset()) && o.kind() == b.kind() {
                *o = b.clone();
                o.set_inherited(true);
            }
        }
        (Value::Struct(o), Value::Struct(b)) => {
            for (name, child) in o.attrs_mut() {
                if let Some(from) = b.attr(name) {
                    refresh_inherited(child, from);
                }
            }
        }
        (own @ (Value::List(_) | Value::ObjectMap(_)), base) => {
            let replaceable = own.is_inherited() || own.child_keys().is_empty();
            if replaceable && own.kind() == base.kind() {
                *own = base.copy(CopyMode::AsInherited);
            }
        }
        _ => {}
    }
}

/// Drop the bases of every struct nested below the top of `value`.
fn clear_nested_bases(value: &mut Value) {
    match value {
        Value::Basic(_) => {}
        Value::Struct(s) => s.attrs_mut().for_each(|(_, v)| {
            if let Value::Struct(inner) = v {
                inner.set_base(None);
            }
            clear_nested_bases(v);
        }),
        Value::List(l) => l.iter_mut().for_each(|v| {
            if let Value::Struct(inner) = v {
                inner.set_base(None);
            }
            clear_nested_bases(v);
        }),
        Value::ObjectMap(m) => m.iter_mut().for_each(|(_, v)| {
            if let Value::Struct(inner) = v {
                inner.set_base(None);
            }
            clear_nested_bases(v);
        }),
    }
}

/// Paths derived from `source` through any ancestor-or-self base.
fn derived_targets(state: &ProxyState, source: &Path) -> Vec<Path> {
    let mut out = Vec::new();
    let mut prefix = source.clone();
    loop {
        if let Some(suffix) = source.strip_prefix(&prefix) {
            for derived in state.inheritance.derived_of(&prefix) {
                out.push(derived.join(&suffix));
            }
        }
        if prefix.pop().is_none() {
            break;
        }
    }
    out
}

impl Node {
    fn live_proxy(&self) -> Option<(Proxy, TreeKind)> {
        let (inner, tree) = self.resolve()?;
        Some((Proxy::from_inner(inner), tree))
    }

    fn write(proxy: &Proxy, tree: TreeKind, path: &Path, value: Value) -> bool {
        let mut state = proxy.inner().state.borrow_mut();
        match state.tree_mut(tree).lookup_mut(path) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Push the value at `source` to derived values still holding an
    /// inherited copy, notifying each write.
    fn propagate(proxy: &Proxy, source: &Path, visited: &mut BTreeSet<Path>) {
        let targets = derived_targets(&proxy.inner().state.borrow(), source);
        for target in targets {
            if !visited.insert(target.clone()) {
                continue;
            }
            let update = {
                let state = proxy.inner().state.borrow();
                let takes_copy = state
                    .lookup(&target)
                    .is_some_and(|v| v.is_inherited() || v.is_unset());
                let inherits_here = inherited_path_in(&state, &target).as_ref() == Some(source);
                if takes_copy && inherits_here {
                    let tree = state.locate(&target, false);
                    let value = effective_in(&state, source, &mut BTreeSet::new());
                    tree.zip(value)
                } else {
                    None
                }
            };
            let Some((tree, value)) = update else {
                continue;
            };
            proxy.notify_before_modified(ChangeKind::AttributeChanged, &target, None);
            Self::write(proxy, tree, &target, value.copy(CopyMode::AsInherited));
            proxy.notify_modified(ChangeKind::AttributeChanged, &target, None);
            Self::propagate(proxy, &target, visited);
        }
    }

    /// Notify, write `value` at this path, notify, propagate.
    fn commit(&self, proxy: &Proxy, tree: TreeKind, value: Value, structural: bool) -> bool {
        proxy.notify_before_modified(ChangeKind::AttributeChanged, &self.path, None);
        let written = Self::write(proxy, tree, &self.path, value);
        if written && structural {
            proxy.inner().state.borrow_mut().reindex_subtree(tree, &self.path);
            proxy.increment_sequence_number();
        }
        proxy.notify_modified(ChangeKind::AttributeChanged, &self.path, None);
        if written {
            Self::propagate(proxy, &self.path, &mut BTreeSet::new());
        }
        written
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// Assign a value here. Fails on a null node or a type mismatch; an
    /// assignment that changes nothing returns `false` without notifying.
    pub fn assign(&self, value: impl Into<Value>) -> bool {
        let mut value = value.into();
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        let structural = {
            let state = proxy.inner().state.borrow();
            let Some(existing) = state.tree(tree).lookup(&self.path) else {
                return false;
            };
            if !compatible(existing, &value) {
                return false;
            }
            if existing == &value && !existing.is_inherited() {
                return false;
            }
            existing.as_basic().is_none()
        };
        value.mark_inherited_deep(false);
        self.commit(&proxy, tree, value, structural)
    }

    /// Assign attribute `name` of this struct.
    pub fn assign_attribute(&self, name: &str, value: impl Into<Value>) -> bool {
        self.at_key(name).assign(value)
    }

    /// Parse `text` as this basic value's kind and assign it.
    pub fn assign_str(&self, text: &str) -> bool {
        let Some(kind) = self.with_value(|v| v.as_basic().map(|b| b.kind())).flatten() else {
            return false;
        };
        match BasicData::parse(kind, text) {
            Some(data) => self.assign(data),
            None => false,
        }
    }

    /// Replace a whole struct, list or map with a value of a compatible
    /// type, re-indexing any bases it carries.
    pub fn replace(&self, value: Value) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        {
            let state = proxy.inner().state.borrow();
            let Some(existing) = state.tree(tree).lookup(&self.path) else {
                return false;
            };
            if !compatible(existing, &value) || existing == &value {
                return false;
            }
        }
        self.commit(&proxy, tree, value, true)
    }

    // ── Unset ─────────────────────────────────────────────────────────────

    /// Mark this value (every leaf, for containers) unset.
    pub fn unset(&self) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        let Some(mut value) = self.value() else {
            return false;
        };
        let before = value.clone();
        value.set_unset();
        value.mark_inherited_deep(false);
        if value == before && !before.is_inherited() {
            return false;
        }
        let structural = value.as_basic().is_none();
        self.commit(&proxy, tree, value, structural)
    }

    pub fn unset_attribute(&self, name: &str) -> bool {
        self.at_key(name).unset()
    }

    /// Make an unset basic value set again, keeping its stored payload.
    pub fn clear_unset(&self) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        let Some(Value::Basic(mut basic)) = self.value() else {
            return false;
        };
        if !basic.is_unset() {
            return false;
        }
        basic.clear_unset();
        basic.set_inherited(false);
        self.commit(&proxy, tree, Value::Basic(basic), false)
    }

    /// Drop any local value in favour of the inherited one (or unset, when
    /// nothing is inherited).
    pub fn reset_to_inherited_value(&self) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        let (current, inherited) = {
            let state = proxy.inner().state.borrow();
            let Some(current) = state.tree(tree).lookup(&self.path).cloned() else {
                return false;
            };
            let inherited = inherited_path_in(&state, &self.path)
                .and_then(|base| effective_in(&state, &base, &mut BTreeSet::new()));
            (current, inherited)
        };
        let next = match inherited {
            Some(v) => v.copy(CopyMode::AsInherited),
            None => {
                let mut v = current.clone();
                v.set_unset();
                v.mark_inherited_deep(true);
                v
            }
        };
        if next == current && current.is_inherited() {
            return false;
        }
        let structural = next.as_basic().is_none();
        self.commit(&proxy, tree, next, structural)
    }

    // ── Bases ─────────────────────────────────────────────────────────────

    /// Set or clear this struct's base. Refuses cycles.
    pub fn set_base_path(&self, base: Option<Path>) -> bool {
        let Some(proxy) = self.proxy() else {
            return false;
        };
        if self.base_path() == base || !proxy.accepts_base(&self.path, base.as_ref()) {
            return false;
        }
        proxy.notify_before_modified(ChangeKind::AttributeChanged, &self.path, None);
        let changed = proxy.set_base(&self.path, base);
        proxy.notify_modified(ChangeKind::AttributeChanged, &self.path, None);
        changed
    }

    /// Rebase this struct on `base` and re-copy every value still marked
    /// inherited from it. Local overrides are kept.
    pub fn update_parent_path(&self, base: Path) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        if !proxy.set_base(&self.path, Some(base.clone())) {
            return false;
        }
        let base_value = {
            let state = proxy.inner().state.borrow();
            effective_in(&state, &base, &mut BTreeSet::new())
        };
        let (Some(base_value), Some(mut own)) = (base_value, self.value()) else {
            return true;
        };
        refresh_inherited(&mut own, &base_value);
        proxy.notify_before_modified(ChangeKind::AttributeChanged, &self.path, None);
        Self::write(&proxy, tree, &self.path, own);
        proxy.notify_modified(ChangeKind::AttributeChanged, &self.path, None);
        Self::propagate(&proxy, &self.path, &mut BTreeSet::new());
        true
    }

    // ── Children ──────────────────────────────────────────────────────────

    /// Add entry `name` to this object map.
    pub fn add_child(&self, name: &str, value: Value) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        let accepted = self
            .with_value(|v| {
                v.as_object_map()
                    .is_some_and(|m| !m.contains(name) && m.element_type().accepts(&value.type_desc()))
            })
            .unwrap_or(false);
        if !accepted {
            return false;
        }
        let child = self.path.clone().with_map_key(name);
        proxy.notify_before_modified(ChangeKind::ChildAdded, &child, None);
        {
            let mut guard = proxy.inner().state.borrow_mut();
            let state = &mut *guard;
            state.inheritance.insert_subtree(&child, &value);
            if let Some(map) = state.tree_mut(tree).lookup_mut(&self.path).and_then(Value::as_object_map_mut) {
                map.insert(name, value);
                map.set_inherited(false);
            }
        }
        proxy.increment_sequence_number();
        proxy.notify_modified(ChangeKind::ChildAdded, &child, None);
        true
    }

    /// Append to this list.
    pub fn push_child(&self, value: Value) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        let Some(index) = self
            .with_value(|v| {
                v.as_list()
                    .filter(|l| l.element_type().accepts(&value.type_desc()))
                    .map(|l| l.len())
            })
            .flatten()
        else {
            return false;
        };
        let child = self.path.clone().with_index(index);
        proxy.notify_before_modified(ChangeKind::ChildAdded, &child, None);
        {
            let mut guard = proxy.inner().state.borrow_mut();
            let state = &mut *guard;
            state.inheritance.insert_subtree(&child, &value);
            if let Some(list) = state.tree_mut(tree).lookup_mut(&self.path).and_then(Value::as_list_mut) {
                list.push(value);
                list.set_inherited(false);
            }
        }
        proxy.increment_sequence_number();
        proxy.notify_modified(ChangeKind::ChildAdded, &child, None);
        true
    }

    /// Remove entry `name` from this object map.
    pub fn remove_child(&self, name: &str) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        if !self
            .with_value(|v| v.as_object_map().is_some_and(|m| m.contains(name)))
            .unwrap_or(false)
        {
            return false;
        }
        let child = self.path.clone().with_map_key(name);
        proxy.notify_before_modified(ChangeKind::ChildRemoved, &child, None);
        {
            let mut guard = proxy.inner().state.borrow_mut();
            let state = &mut *guard;
            state.inheritance.remove_subtree(&child);
            if let Some(map) = state.tree_mut(tree).lookup_mut(&self.path).and_then(Value::as_object_map_mut) {
                map.erase(name);
            }
        }
        proxy.increment_sequence_number();
        proxy.notify_modified(ChangeKind::ChildRemoved, &child, None);
        true
    }

    /// Remove element `index` from this list. Later elements shift down.
    pub fn remove_index(&self, index: usize) -> bool {
        let Some((proxy, tree)) = self.live_proxy() else {
            return false;
        };
        if !self
            .with_value(|v| v.as_list().is_some_and(|l| index < l.len()))
            .unwrap_or(false)
        {
            return false;
        }
        let child = self.path.clone().with_index(index);
        proxy.notify_before_modified(ChangeKind::ChildRemoved, &child, None);
        {
            let mut guard = proxy.inner().state.borrow_mut();
            let state = &mut *guard;
            if let Some(list) = state.tree_mut(tree).lookup_mut(&self.path).and_then(Value::as_list_mut) {
                list.remove(index);
                list.set_inherited(false);
            }
            state.reindex_subtree(tree, &self.path);
        }
        proxy.increment_sequence_number();
        proxy.notify_modified(ChangeKind::ChildRemoved, &child, None);
        true
    }

    /// A new instance of the struct type at `type_path`: an inherited copy
    /// of the type's effective value, with its base set to `type_path`.
    fn instance_of(&self, type_path: &Path) -> Option<Value> {
        let proxy = self.proxy()?;
        let template = {
            let state = proxy.inner().state.borrow();
            effective_in(&state, type_path, &mut BTreeSet::new())
        };
        let mut value = template.filter(|v| v.as_struct().is_some())?.copy(CopyMode::AsInherited);
        clear_nested_bases(&mut value);
        value.set_inherited(false);
        if let Some(s) = value.as_struct_mut() {
            s.set_base(Some(type_path.clone()));
        }
        Some(value)
    }

    /// Add entry `name` to this object map as a new instance of the struct
    /// type at `type_path`.
    pub fn instantiate(&self, name: &str, type_path: &Path) -> bool {
        match self.instance_of(type_path) {
            Some(value) => self.add_child(name, value),
            None => false,
        }
    }

    /// Replace this struct with a new instance of the type at `type_path`.
    pub fn replace_with_instance(&self, type_path: &Path) -> bool {
        match self.instance_of(type_path) {
            Some(value) => self.replace(value),
            None => false,
        }
    }
}

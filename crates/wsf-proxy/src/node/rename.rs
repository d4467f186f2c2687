//! Renaming object-map entries.

use wsf_proxy_path::{Key, Path};

use super::Node;
use crate::proxy::{ChangeKind, TreeKind};
use crate::schema::catalog;
use crate::value::{BasicData, Value};

const RENAMABLE_CATALOGS: &[&str] = &[
    catalog::PLATFORM,
    catalog::PLATFORM_TYPE,
    catalog::ZONE,
    catalog::ROUTE,
    catalog::MOVER_TYPE,
    catalog::SENSOR_TYPE,
    catalog::COMM_TYPE,
    catalog::ROUTER_TYPE,
    catalog::WEAPON_TYPE,
    catalog::PROCESSOR_TYPE,
];

/// Returns `true` for a root catalog map or a platform-local zone map.
fn is_renamable_container(path: &Path) -> bool {
    let name = |i: usize| path.get(i).and_then(Key::as_name);
    match path.len() {
        1 => name(0).is_some_and(|n| RENAMABLE_CATALOGS.contains(&n)),
        3 => {
            matches!(name(0), Some(catalog::PLATFORM | catalog::PLATFORM_TYPE))
                && name(2) == Some(catalog::ZONE)
        }
        _ => false,
    }
}

/// Paths of every command-chain commander naming `platform`, across
/// platforms and platform types.
fn commanders_naming(user: &Value, platform: &str) -> Vec<Path> {
    let mut out = Vec::new();
    for catalog_name in [catalog::PLATFORM, catalog::PLATFORM_TYPE] {
        let Some(entities) = user.attr(catalog_name).and_then(Value::as_object_map) else {
            continue;
        };
        for (entity, value) in entities.iter() {
            let Some(chains) = value.attr("commandChain").and_then(Value::as_object_map) else {
                continue;
            };
            for (chain, link) in chains.iter() {
                let commander = link
                    .attr("commander")
                    .and_then(Value::as_basic)
                    .and_then(|b| b.get::<String>());
                if commander.as_deref() == Some(platform) {
                    out.push(
                        Path::root()
                            .with_attr(catalog_name)
                            .with_map_key(entity)
                            .with_attr("commandChain")
                            .with_map_key(chain)
                            .with_attr("commander"),
                    );
                }
            }
        }
    }
    out
}

impl Node {
    /// Returns `true` if this node is an entry of a map whose entries may
    /// be renamed.
    pub fn is_renamable(&self) -> bool {
        self.path.parent().is_some_and(|p| is_renamable_container(&p))
    }

    /// Rename this object-map entry in place.
    ///
    /// Derived values have their bases repointed, command chains naming a
    /// renamed platform follow it, and the entry keeps its position and
    /// stored value. Fails without side effects if the entry is not in a
    /// renamable map, lives in the basic-type tree, or `new_name` is taken.
    /// On success this node follows the entry to its new path.
    pub fn rename(&mut self, new_name: &str) -> bool {
        let Some(parent_path) = self.path.parent() else {
            return false;
        };
        if !is_renamable_container(&parent_path) || new_name.is_empty() {
            return false;
        }
        let Some((inner, tree)) = self.resolve() else {
            return false;
        };
        if tree != TreeKind::User {
            return false;
        }
        let old_name = self.name();
        let old_path = self.path.clone();
        let new_path = parent_path.clone().with_map_key(new_name);
        let proxy = crate::proxy::Proxy::from_inner(inner);
        {
            let state = proxy.inner().state.borrow();
            if state.user.lookup(&new_path).is_some() || state.basic.lookup(&new_path).is_some() {
                return false;
            }
        }

        proxy.notify_before_modified(ChangeKind::ChildMoved, &old_path, Some(new_name));

        {
            let mut guard = proxy.inner().state.borrow_mut();
            let state = &mut *guard;
            for (base, derived) in state.inheritance.derived_under(&old_path) {
                let Some(moved) = base.replace_prefix(&old_path, &new_path) else {
                    continue;
                };
                for root in [&mut state.user, &mut state.basic] {
                    if let Some(s) = root.lookup_mut(&derived).and_then(Value::as_struct_mut) {
                        if s.base() == Some(&base) {
                            s.set_base(Some(moved.clone()));
                        }
                    }
                }
            }
        }

        if parent_path.len() == 1 && parent_path.get(0).and_then(Key::as_name) == Some(catalog::PLATFORM) {
            let commanders = commanders_naming(&proxy.inner().state.borrow().user, &old_name);
            for path in commanders {
                proxy.notify_before_modified(ChangeKind::AttributeChanged, &path, None);
                if let Some(b) = proxy
                    .inner()
                    .state
                    .borrow_mut()
                    .user
                    .lookup_mut(&path)
                    .and_then(Value::as_basic_mut)
                {
                    b.set_data(BasicData::from(new_name));
                }
                proxy.notify_modified(ChangeKind::AttributeChanged, &path, None);
            }
        }

        {
            let mut state = proxy.inner().state.borrow_mut();
            if let Some(map) = state.user.lookup_mut(&parent_path).and_then(Value::as_object_map_mut) {
                map.rename(&old_name, new_name);
            }
        }
        proxy.record_object_rename(&old_path, &new_path);
        tracing::debug!(old = %old_path, new = %new_path, "entry renamed");

        proxy.notify_modified(ChangeKind::ChildMoved, &old_path, Some(new_name));

        self.path = new_path;
        self.invalidate();
        true
    }
}

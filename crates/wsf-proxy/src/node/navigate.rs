//! Inheritance-aware reads.

use std::collections::BTreeSet;

use wsf_proxy_path::{Key, Path};

use super::Node;
use crate::proxy::{DocumentRange, ProxyState};
use crate::value::{FromBasic, StructValue, Value};

/// Whether a value found by inheritance may stand in for `own`.
fn same_shape(own: &Value, found: &Value) -> bool {
    match (own, found) {
        (Value::Basic(a), Value::Basic(b)) => a.kind() == b.kind(),
        (Value::Struct(a), Value::Struct(b)) => {
            a.struct_type().is_a(b.type_name()) || b.struct_type().is_a(a.type_name())
        }
        (Value::List(a), Value::List(b)) => a.element_type() == b.element_type(),
        (Value::ObjectMap(a), Value::ObjectMap(b)) => a.element_type() == b.element_type(),
        _ => false,
    }
}

/// Walk up from `path` to the nearest ancestor-or-self with a base, and
/// return the ancestor's length together with the base-relative path.
fn nearest_base(state: &ProxyState, path: &Path) -> Option<(usize, Path)> {
    let mut prefix = path.clone();
    loop {
        let base = state
            .lookup(&prefix)
            .and_then(Value::as_struct)
            .and_then(StructValue::base);
        if let Some(base) = base {
            return Some((prefix.len(), base.join(&path.strip_prefix(&prefix)?)));
        }
        prefix.pop()?;
    }
}

pub(crate) fn inherited_path_in(state: &ProxyState, path: &Path) -> Option<Path> {
    let own = state.lookup(path)?;
    let (_, candidate) = nearest_base(state, path)?;
    let found = state.lookup(&candidate)?;
    same_shape(own, found).then_some(candidate)
}

/// Value at `path` with unset parts filled from the inheritance chain.
///
/// `chain` holds the paths currently being resolved; meeting one again
/// means a cyclic base chain, which resolves to nothing.
pub(crate) fn effective_in(state: &ProxyState, path: &Path, chain: &mut BTreeSet<Path>) -> Option<Value> {
    let own = state.lookup(path)?;
    if !chain.insert(path.clone()) {
        tracing::debug!(path = %path, "inheritance cycle cut");
        return None;
    }
    let from_base = |state: &ProxyState, chain: &mut BTreeSet<Path>| {
        inherited_path_in(state, path)
            .and_then(|base| effective_in(state, &base, chain))
            .map(|mut v| {
                v.set_inherited(true);
                v
            })
    };
    let result = match own {
        Value::Basic(b) if b.is_unset() => from_base(state, chain)
            .filter(|v| !v.is_unset())
            .unwrap_or_else(|| own.clone()),
        Value::Basic(_) => own.clone(),
        Value::Struct(s) => {
            let mut out = own.clone();
            let names: Vec<&str> = s.attr_names().collect();
            if let Some(target) = out.as_struct_mut() {
                for name in names {
                    let child = path.clone().with_attr(name);
                    if let (Some(v), Some(slot)) = (effective_in(state, &child, chain), target.attr_mut(name)) {
                        *slot = v;
                    }
                }
            }
            out
        }
        Value::List(l) if l.is_empty() => from_base(state, chain)
            .filter(|v| v.as_list().is_some_and(|l| !l.is_empty()))
            .unwrap_or_else(|| own.clone()),
        Value::ObjectMap(m) if m.is_empty() => from_base(state, chain)
            .filter(|v| v.as_object_map().is_some_and(|m| !m.is_empty()))
            .unwrap_or_else(|| own.clone()),
        Value::List(_) | Value::ObjectMap(_) => {
            let mut out = own.clone();
            for key in own.child_keys() {
                let mut child = path.clone();
                child.push(key.clone());
                if let (Some(v), Some(slot)) = (effective_in(state, &child, chain), out.child_mut(&key)) {
                    *slot = v;
                }
            }
            out
        }
    };
    chain.remove(path);
    Some(result)
}

impl Node {
    // ── Inheritance ───────────────────────────────────────────────────────

    /// The node this one inherits from: the base of the nearest
    /// ancestor-or-self with one, extended by the remaining path, provided
    /// it exists with a matching type.
    pub fn inherited(&self) -> Option<Node> {
        self.inherited_path().map(|p| self.at_absolute(p))
    }

    pub fn inherited_path(&self) -> Option<Path> {
        let (inner, _) = self.resolve()?;
        let state = inner.state.borrow();
        inherited_path_in(&state, &self.path)
    }

    /// Base of this struct, if it has one of its own.
    pub fn base_path(&self) -> Option<Path> {
        self.with_value(|v| v.as_struct().and_then(StructValue::base).cloned())
            .flatten()
    }

    /// Paths this node inherits from, nearest first. Stops at a cycle.
    pub fn inheritance_chain(&self) -> Vec<Path> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::from([self.path.clone()]);
        let mut cur = self.inherited();
        while let Some(node) = cur {
            if !seen.insert(node.path.clone()) {
                tracing::debug!(path = %self.path, "inheritance cycle cut");
                break;
            }
            out.push(node.path.clone());
            cur = node.inherited();
        }
        out
    }

    /// Path of the outermost type in the inheritance chain.
    pub fn type_path(&self) -> Option<Path> {
        self.inheritance_chain().pop()
    }

    /// Name of the type this value is declared as: the last key of its
    /// base, or the predefined type name.
    pub fn type_name(&self) -> Option<String> {
        if let Some(base) = self.base_path() {
            return base.back().map(Key::to_string);
        }
        self.with_value(|v| match v {
            Value::Struct(s) => s.type_name().to_string(),
            other => other.type_desc().name(),
        })
    }

    /// Last key of [`Node::inherited_path`].
    pub fn inherited_name(&self) -> Option<String> {
        self.inherited_path()?.back().map(Key::to_string)
    }

    /// Names of the entries of the inheritance chain, nearest first, with
    /// the predefined type name last.
    pub fn inherited_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inheritance_chain()
            .iter()
            .filter_map(|p| p.back().map(Key::to_string))
            .collect();
        if let Some(predefined) = self.with_value(|v| v.as_struct().map(|s| s.type_name().to_string())).flatten() {
            if names.last() != Some(&predefined) {
                names.push(predefined);
            }
        }
        names
    }

    /// Returns `true` if the value is marked inherited, or is unset and
    /// takes a value from the inheritance chain.
    pub fn is_inherited(&self) -> bool {
        match self.with_value(|v| (v.is_inherited(), v.is_unset())) {
            Some((true, _)) => true,
            Some((false, true)) => self.effective_value().is_some_and(|v| v.is_inherited()),
            _ => false,
        }
    }

    /// Returns `true` if the value is inherited through an enclosing
    /// entity's base rather than a base of its own.
    pub fn is_inherited_from_parent(&self) -> bool {
        let Some((inner, _)) = self.resolve() else {
            return false;
        };
        let state = inner.state.borrow();
        matches!(nearest_base(&state, &self.path), Some((len, _)) if len < self.path.len())
            && inherited_path_in(&state, &self.path).is_some()
    }

    // ── Effective reads ───────────────────────────────────────────────────

    /// The value with inheritance fallback applied; values taken from the
    /// chain are marked inherited.
    pub fn effective_value(&self) -> Option<Value> {
        let (inner, _) = self.resolve()?;
        let state = inner.state.borrow();
        effective_in(&state, &self.path, &mut BTreeSet::new())
    }

    pub fn effective_attr(&self, name: &str) -> Option<Value> {
        self.at_key(name).effective_value()
    }

    /// Typed read with inheritance fallback. `None` when unset everywhere.
    pub fn get<T: FromBasic>(&self) -> Option<T> {
        self.effective_value()?.as_basic()?.get()
    }

    /// Typed read of this value alone.
    pub fn get_own<T: FromBasic>(&self) -> Option<T> {
        self.with_value(|v| v.as_basic().and_then(|b| b.get())).flatten()
    }

    /// Typed read of attribute `name` with inheritance fallback.
    pub fn get_attr<T: FromBasic>(&self, name: &str) -> Option<T> {
        self.at_key(name).get()
    }

    /// Display form of the effective value.
    pub fn to_display_string(&self) -> String {
        self.effective_value()
            .map(|v| v.to_display_string())
            .unwrap_or_default()
    }

    /// Returns `true` if the effective value is an unset basic value.
    pub fn is_unset(&self) -> bool {
        self.effective_value().is_some_and(|v| v.is_unset())
    }

    // ── Document ranges ───────────────────────────────────────────────────

    /// Ranges recorded for this path.
    pub fn document_ranges(&self) -> Vec<DocumentRange> {
        match self.proxy() {
            Some(proxy) => proxy.document_ranges(&self.path),
            None => Vec::new(),
        }
    }

    /// First range recorded here, else the first found along the
    /// inheritance chain.
    pub fn first_document_range(&self) -> Option<DocumentRange> {
        let proxy = self.proxy()?;
        std::iter::once(self.path.clone())
            .chain(self.inheritance_chain())
            .find_map(|p| proxy.document_ranges(&p).into_iter().next())
    }

    /// Last range recorded here, else the last found along the inheritance
    /// chain.
    pub fn last_document_range(&self) -> Option<DocumentRange> {
        let proxy = self.proxy()?;
        std::iter::once(self.path.clone())
            .chain(self.inheritance_chain())
            .find_map(|p| proxy.document_ranges(&p).pop())
    }

    /// Offset of the last declaration, used to order sibling declarations;
    /// `0` when no range is recorded.
    pub fn declaration_position(&self) -> usize {
        self.last_document_range().map_or(0, |r| r.begin)
    }

    /// Source text of the first document range.
    pub fn source_text(&self) -> Option<String> {
        let range = self.first_document_range()?;
        self.proxy()?.source_text(&range)
    }
}

#[cfg(test)]
mod tests {
    use crate::proxy::Proxy;
    use crate::units::{Quantity, UnitKind};
    use crate::value::BasicData;
    use wsf_proxy_path::Path;

    fn p(s: &str) -> Path {
        s.parse().unwrap()
    }

    fn platform_with_type() -> Proxy {
        let proxy = Proxy::with_defaults();
        let types = proxy.root().at_key("platformType");
        assert!(types.instantiate("FIGHTER", &p("/platformType/WSF_PLATFORM")));
        let fighter = types.at_key("FIGHTER");
        assert!(fighter.assign_attribute("side", BasicData::from("blue")));
        let platforms = proxy.root().at_key("platform");
        assert!(platforms.instantiate("P1", &p("/platformType/FIGHTER")));
        proxy
    }

    #[test]
    fn test_inherited_follows_nearest_base() {
        let proxy = platform_with_type();
        let side = proxy.root() + "platform" + "P1" + "side";
        assert_eq!(side.inherited_path(), Some(p("/platformType/FIGHTER/side")));
        assert_eq!(side.get::<String>().as_deref(), Some("blue"));
        assert!(side.is_inherited());
        assert!(side.is_inherited_from_parent());
    }

    #[test]
    fn test_type_names_follow_chain() {
        let proxy = platform_with_type();
        let p1 = proxy.root() + "platform" + "P1";
        assert_eq!(p1.type_name().as_deref(), Some("FIGHTER"));
        assert_eq!(p1.type_path(), Some(p("/platformType/WSF_PLATFORM")));
        assert_eq!(p1.inherited_type_names(), vec!["FIGHTER", "WSF_PLATFORM", "Platform"]);
        assert!(p1.is_of_user_type("FIGHTER"));
        assert!(p1.is_a_struct_type_of("Platform"));
    }

    #[test]
    fn test_local_value_wins() {
        let proxy = platform_with_type();
        let side = proxy.root() + "platform" + "P1" + "side";
        assert!(side.assign(BasicData::from("red")));
        assert_eq!(side.get::<String>().as_deref(), Some("red"));
        assert!(!side.is_inherited());
    }

    #[test]
    fn test_effective_struct_fills_unset_attributes() {
        let proxy = platform_with_type();
        let fighter = proxy.root() + "platformType" + "FIGHTER";
        let alt = Quantity::new(UnitKind::Length, 1000.0, "ft").unwrap();
        assert!(fighter.assign_attribute("altitude", BasicData::from(alt.clone())));
        let p1 = proxy.root() + "platform" + "P1";
        let eff = p1.effective_value().unwrap();
        let got = eff.attr("altitude").and_then(|v| v.as_basic()).and_then(|b| b.get::<Quantity>());
        assert_eq!(got, Some(alt));
    }
}

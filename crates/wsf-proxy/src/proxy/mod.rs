//! The proxy root.
//!
//! # Overview
//!
//! A [`Proxy`] owns everything a scenario's semantic model needs:
//!
//! - the user tree and the basic-type tree (same root type, same paths),
//! - the inheritance index ([`InheritanceIndex`]),
//! - a monotonic sequence number stamping every [`Node`] resolution,
//! - document ranges attached by the parser, and the rename log,
//! - the before/after change observers.
//!
//! `Proxy` is a cheap, cloneable, single-threaded handle. Nodes hold a weak
//! reference to it; once every `Proxy` clone is dropped, nodes are null.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use wsf_proxy_path::Path;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::node::Node;
use crate::schema;
use crate::value::{TypeRegistry, Value, ValueKind};

mod events;
mod inheritance;

pub use events::{ChangeEvent, ChangeKind, ChangePhase};
pub use inheritance::InheritanceIndex;

use events::{Listener, Observers};

/// Where a value was declared in the scenario source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentRange {
    pub source: String,
    pub begin: usize,
    pub end: usize,
}

impl DocumentRange {
    pub fn new(source: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            source: source.into(),
            begin,
            end,
        }
    }
}

/// Which of the two trees a path resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    User,
    Basic,
}

pub(crate) struct ProxyState {
    pub(crate) user: Value,
    pub(crate) basic: Value,
    pub(crate) sequence: u64,
    pub(crate) inheritance: InheritanceIndex,
    pub(crate) ranges: BTreeMap<Path, Vec<DocumentRange>>,
    pub(crate) sources: BTreeMap<String, String>,
    pub(crate) renames: Vec<(Path, Path)>,
}

impl ProxyState {
    pub(crate) fn tree(&self, kind: TreeKind) -> &Value {
        match kind {
            TreeKind::User => &self.user,
            TreeKind::Basic => &self.basic,
        }
    }

    pub(crate) fn tree_mut(&mut self, kind: TreeKind) -> &mut Value {
        match kind {
            TreeKind::User => &mut self.user,
            TreeKind::Basic => &mut self.basic,
        }
    }

    /// Find the tree `path` resolves in: the user tree first, then (unless
    /// `basic_only`) the basic-type tree.
    pub(crate) fn locate(&self, path: &Path, basic_only: bool) -> Option<TreeKind> {
        if !basic_only && self.user.lookup(path).is_some() {
            return Some(TreeKind::User);
        }
        self.basic.lookup(path).map(|_| TreeKind::Basic)
    }

    /// Value at `path`, user tree first.
    pub(crate) fn lookup(&self, path: &Path) -> Option<&Value> {
        self.user.lookup(path).or_else(|| self.basic.lookup(path))
    }

    /// Re-index the bases at or below `path` in `tree`.
    pub(crate) fn reindex_subtree(&mut self, tree: TreeKind, path: &Path) {
        self.inheritance.remove_subtree(path);
        let root = match tree {
            TreeKind::User => &self.user,
            TreeKind::Basic => &self.basic,
        };
        if let Some(v) = root.lookup(path) {
            self.inheritance.insert_subtree(path, v);
        }
    }

    fn rebuild_inheritance(&mut self) {
        let mut index = InheritanceIndex::new();
        index.rebuild([&self.basic, &self.user]);
        self.inheritance = index;
    }
}

pub(crate) struct ProxyInner {
    pub(crate) state: RefCell<ProxyState>,
    observers: RefCell<Observers>,
    registry: Arc<TypeRegistry>,
    config: ProxyConfig,
}

impl ProxyInner {
    fn emit(&self, phase: ChangePhase, kind: ChangeKind, path: &Path, aux: Option<&str>) {
        let event = ChangeEvent {
            kind,
            phase,
            path: path.clone(),
            aux: aux.map(str::to_string),
        };
        tracing::trace!(?kind, ?phase, path = %path, "proxy notification");
        let listeners = self.observers.borrow().snapshot(phase);
        for (id, listener) in listeners {
            if !self.observers.borrow().is_live(id) {
                continue;
            }
            let Ok(mut running) = listener.try_borrow_mut() else {
                tracing::trace!(listener = id, path = %path, "listener busy, skipping nested notification");
                continue;
            };
            let call: &mut Listener = &mut running;
            call(&event);
        }
    }

    pub(crate) fn bump_sequence(&self) {
        let mut state = self.state.borrow_mut();
        state.sequence = state.sequence.wrapping_add(1);
    }
}

/// Shared handle to a scenario's semantic model.
#[derive(Clone)]
pub struct Proxy {
    inner: Rc<ProxyInner>,
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("sequence", &self.sequence_number())
            .field("observers", &self.inner.observers.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Default for Proxy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Proxy {
    /// An empty model over `registry`. Both trees start as fresh roots.
    pub fn new(registry: TypeRegistry, config: ProxyConfig) -> Self {
        let user = registry.default_root();
        let basic = registry.default_root();
        Self::from_parts(Arc::new(registry), config, user, basic)
    }

    /// An empty model over the builtin scenario schema, with the predefined
    /// basic types installed.
    pub fn with_config(config: ProxyConfig) -> Self {
        let registry = schema::builtin_registry();
        let user = registry.default_root();
        let basic = schema::builtin_basic_root(&registry);
        Self::from_parts(Arc::new(registry), config, user, basic)
    }

    pub fn with_defaults() -> Self {
        Self::with_config(ProxyConfig::default())
    }

    fn from_parts(registry: Arc<TypeRegistry>, config: ProxyConfig, user: Value, basic: Value) -> Self {
        let mut state = ProxyState {
            user,
            basic,
            sequence: 0,
            inheritance: InheritanceIndex::new(),
            ranges: BTreeMap::new(),
            sources: BTreeMap::new(),
            renames: Vec::new(),
        };
        state.rebuild_inheritance();
        Self {
            inner: Rc::new(ProxyInner {
                state: RefCell::new(state),
                observers: RefCell::new(Observers::default()),
                registry,
                config,
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<ProxyInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ProxyInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn inner(&self) -> &ProxyInner {
        &self.inner
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.inner.config
    }

    // ── Trees ─────────────────────────────────────────────────────────────

    /// Node at the root of the user view.
    pub fn root(&self) -> Node {
        Node::new(self, Path::root())
    }

    /// Node at `path` in the user view.
    pub fn node(&self, path: Path) -> Node {
        Node::new(self, path)
    }

    /// Node at a pointer string such as `/platform/P1/side`.
    pub fn node_at(&self, pointer: &str) -> Result<Node, ProxyError> {
        Ok(self.node(Path::parse_pointer(pointer)?))
    }

    /// Node at the root of the basic-type view.
    pub fn basic_root(&self) -> Node {
        let mut node = self.root();
        node.switch_to_basic_types();
        node
    }

    /// Replace the user tree and rebuild the inheritance index.
    pub fn set_user_root(&self, value: Value) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.user = value;
            state.rebuild_inheritance();
        }
        self.increment_sequence_number();
    }

    /// Replace the basic-type tree and rebuild the inheritance index.
    pub fn set_basic_root(&self, value: Value) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.basic = value;
            state.rebuild_inheritance();
        }
        self.increment_sequence_number();
    }

    /// Deep copy of the user tree.
    pub fn user_root_value(&self) -> Value {
        self.inner.state.borrow().user.clone()
    }

    // ── Sequence number ───────────────────────────────────────────────────

    pub fn sequence_number(&self) -> u64 {
        self.inner.state.borrow().sequence
    }

    /// Invalidate every cached node resolution.
    pub fn increment_sequence_number(&self) {
        self.inner.bump_sequence();
    }

    // ── Notifications ─────────────────────────────────────────────────────

    /// Register a listener called before every structural change.
    pub fn on_before_modified<F>(&self, listener: F) -> u64
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.inner
            .observers
            .borrow_mut()
            .insert(ChangePhase::Before, Box::new(listener))
    }

    /// Register a listener called after every structural change.
    pub fn on_modified<F>(&self, listener: F) -> u64
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.inner
            .observers
            .borrow_mut()
            .insert(ChangePhase::After, Box::new(listener))
    }

    /// Register an after-change listener for changes at or below `prefix`.
    pub fn on_modified_at<F>(&self, prefix: Path, mut listener: F) -> u64
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.on_modified(move |ev| {
            if prefix.is_prefix_of(&ev.path) {
                listener(ev);
            }
        })
    }

    /// Remove a listener. Returns `false` for unknown ids.
    pub fn off(&self, listener_id: u64) -> bool {
        self.inner.observers.borrow_mut().remove(listener_id)
    }

    pub fn notify_before_modified(&self, kind: ChangeKind, path: &Path, aux: Option<&str>) {
        self.inner.emit(ChangePhase::Before, kind, path, aux);
    }

    pub fn notify_modified(&self, kind: ChangeKind, path: &Path, aux: Option<&str>) {
        self.inner.emit(ChangePhase::After, kind, path, aux);
    }

    // ── Inheritance index ─────────────────────────────────────────────────

    /// Record that `derived` inherits from `base` without touching the trees.
    /// Refuses cycle-forming pairs.
    pub fn register_inheritance(&self, derived: &Path, base: &Path) -> bool {
        let mut state = self.inner.state.borrow_mut();
        if state.inheritance.would_cycle(derived, base) {
            tracing::debug!(derived = %derived, base = %base, "refused cyclic inheritance");
            return false;
        }
        tracing::debug!(derived = %derived, base = %base, "inheritance registered");
        state.inheritance.insert(derived.clone(), base.clone());
        true
    }

    pub fn unregister_subtree(&self, prefix: &Path) {
        self.inner.state.borrow_mut().inheritance.remove_subtree(prefix);
    }

    /// Paths directly derived from `base`.
    pub fn derived_paths(&self, base: &Path) -> Vec<Path> {
        self.inner.state.borrow().inheritance.derived_of(base)
    }

    /// Base registered for `derived`.
    pub fn base_of(&self, derived: &Path) -> Option<Path> {
        self.inner.state.borrow().inheritance.base_of(derived).cloned()
    }

    /// Rescan both trees for struct bases.
    pub fn rebuild_inheritance(&self) {
        self.inner.state.borrow_mut().rebuild_inheritance();
    }

    /// Set (or clear) the base of the struct at `derived`, keeping the index
    /// in step. Refuses non-structs and cycle-forming bases.
    pub fn set_base(&self, derived: &Path, base: Option<Path>) -> bool {
        if !self.accepts_base(derived, base.as_ref()) {
            return false;
        }
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;
        let Some(tree) = state.locate(derived, false) else {
            return false;
        };
        let Some(target) = state
            .tree_mut(tree)
            .lookup_mut(derived)
            .and_then(Value::as_struct_mut)
        else {
            return false;
        };
        target.set_base(base.clone());
        match base {
            Some(base) => state.inheritance.insert(derived.clone(), base),
            None => {
                state.inheritance.remove(derived);
            }
        }
        true
    }

    /// Returns `true` if [`Proxy::set_base`] would accept `base` for the
    /// struct at `derived`.
    pub(crate) fn accepts_base(&self, derived: &Path, base: Option<&Path>) -> bool {
        let state = self.inner.state.borrow();
        if let Some(base) = base {
            if state.inheritance.would_cycle(derived, base) {
                tracing::debug!(derived = %derived, base = %base, "refused cyclic base");
                return false;
            }
        }
        state
            .locate(derived, false)
            .and_then(|tree| state.tree(tree).lookup(derived))
            .is_some_and(|v| v.kind() == ValueKind::Struct)
    }

    // ── Renames ───────────────────────────────────────────────────────────

    /// Re-key everything indexed by path after an entry moved from `old` to
    /// `new`, log the rename, and invalidate cached resolutions.
    pub fn record_object_rename(&self, old: &Path, new: &Path) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.inheritance.rename_prefix(old, new);
            let moved: Vec<Path> = state
                .ranges
                .range(old.clone()..)
                .take_while(|(p, _)| old.is_prefix_of(p))
                .map(|(p, _)| p.clone())
                .collect();
            for path in moved {
                if let (Some(ranges), Some(to)) = (state.ranges.remove(&path), path.replace_prefix(old, new)) {
                    state.ranges.insert(to, ranges);
                }
            }
            state.renames.push((old.clone(), new.clone()));
        }
        tracing::debug!(old = %old, new = %new, "object renamed");
        self.increment_sequence_number();
    }

    /// Every rename recorded so far, oldest first.
    pub fn renames(&self) -> Vec<(Path, Path)> {
        self.inner.state.borrow().renames.clone()
    }

    // ── Document ranges ───────────────────────────────────────────────────

    pub fn set_document_ranges(&self, path: &Path, ranges: Vec<DocumentRange>) {
        let mut state = self.inner.state.borrow_mut();
        if ranges.is_empty() {
            state.ranges.remove(path);
        } else {
            state.ranges.insert(path.clone(), ranges);
        }
    }

    pub fn add_document_range(&self, path: &Path, range: DocumentRange) {
        self.inner
            .state
            .borrow_mut()
            .ranges
            .entry(path.clone())
            .or_default()
            .push(range);
    }

    /// Ranges recorded for exactly `path`, in insertion order.
    pub fn document_ranges(&self, path: &Path) -> Vec<DocumentRange> {
        self.inner
            .state
            .borrow()
            .ranges
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    /// Register the text of a source file so ranges can be sliced from it.
    pub fn set_source_text(&self, source: impl Into<String>, text: impl Into<String>) {
        self.inner
            .state
            .borrow_mut()
            .sources
            .insert(source.into(), text.into());
    }

    /// Text covered by `range`, if its source is registered and the range
    /// lies on character boundaries within it.
    pub fn source_text(&self, range: &DocumentRange) -> Option<String> {
        let state = self.inner.state.borrow();
        let text = state.sources.get(&range.source)?;
        text.get(range.begin..range.end).map(str::to_string)
    }
}

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use wsf_proxy_path::Path;

/// What a structural change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    ChildAdded,
    ChildRemoved,
    /// An object-map entry was renamed. `aux` carries the new name.
    ChildMoved,
    AttributeChanged,
}

/// Whether an event precedes or follows the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangePhase {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub phase: ChangePhase,
    pub path: Path,
    pub aux: Option<String>,
}

pub(crate) type Listener = Box<dyn FnMut(&ChangeEvent)>;

pub(crate) type SharedListener = Rc<RefCell<Listener>>;

/// Observer registry.
///
/// Delivery works from a snapshot of shared handles, so a listener may
/// register or remove observers (including itself) or raise further
/// changes while it runs. A listener that is already running is skipped
/// for the events it raises itself.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    before: BTreeMap<u64, SharedListener>,
    after: BTreeMap<u64, SharedListener>,
}

impl Observers {
    pub(crate) fn insert(&mut self, phase: ChangePhase, listener: Listener) -> u64 {
        self.next_id = self.next_id.saturating_add(1);
        let id = self.next_id;
        self.listeners_mut(phase).insert(id, Rc::new(RefCell::new(listener)));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        self.before.remove(&id).is_some() || self.after.remove(&id).is_some()
    }

    pub(crate) fn is_live(&self, id: u64) -> bool {
        self.before.contains_key(&id) || self.after.contains_key(&id)
    }

    /// Handles to the listeners registered for `phase`, in registration order.
    pub(crate) fn snapshot(&self, phase: ChangePhase) -> Vec<(u64, SharedListener)> {
        let map = match phase {
            ChangePhase::Before => &self.before,
            ChangePhase::After => &self.after,
        };
        map.iter().map(|(id, l)| (*id, Rc::clone(l))).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    fn listeners_mut(&mut self, phase: ChangePhase) -> &mut BTreeMap<u64, SharedListener> {
        match phase {
            ChangePhase::Before => &mut self.before,
            ChangePhase::After => &mut self.after,
        }
    }
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use wsf_proxy::{ChangeEvent, ChangeKind, ChangePhase, Proxy};

/// Collects every before and after event a proxy emits.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<ChangeEvent>>>,
}

impl Recorder {
    pub fn attach(proxy: &Proxy) -> Self {
        let recorder = Self::default();
        let before = recorder.events.clone();
        proxy.on_before_modified(move |ev| before.borrow_mut().push(ev.clone()));
        let after = recorder.events.clone();
        proxy.on_modified(move |ev| after.borrow_mut().push(ev.clone()));
        recorder
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.borrow().clone()
    }

    pub fn after(&self) -> Vec<ChangeEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|ev| ev.phase == ChangePhase::After)
            .cloned()
            .collect()
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.events.borrow().iter().filter(|ev| ev.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

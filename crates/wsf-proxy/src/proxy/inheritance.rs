//! Base → derived index.
//!
//! # Overview
//!
//! Every struct with a `base` is recorded twice: under its base in
//! `derived`, and by its own path in `bases`. The first answers "who
//! inherits from this type" (propagation, rename); the second answers "what
//! does this path inherit from" (cycle checks) without touching the trees.

use std::collections::{BTreeMap, BTreeSet};

use wsf_proxy_path::Path;

use crate::value::Value;

#[derive(Debug, Default, Clone)]
pub struct InheritanceIndex {
    derived: BTreeMap<Path, BTreeSet<Path>>,
    bases: BTreeMap<Path, Path>,
}

impl InheritanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the bases found in `trees`.
    pub fn rebuild<'a>(&mut self, trees: impl IntoIterator<Item = &'a Value>) {
        self.derived.clear();
        self.bases.clear();
        for tree in trees {
            tree.for_each_base(&Path::root(), &mut |derived, base| {
                self.insert(derived.clone(), base.clone());
            });
        }
    }

    /// Record that `derived` inherits from `base`, replacing any earlier
    /// base of `derived`.
    pub fn insert(&mut self, derived: Path, base: Path) {
        self.remove(&derived);
        self.derived.entry(base.clone()).or_default().insert(derived.clone());
        self.bases.insert(derived, base);
    }

    /// Forget the base of `derived`. Returns the old base.
    pub fn remove(&mut self, derived: &Path) -> Option<Path> {
        let base = self.bases.remove(derived)?;
        if let Some(set) = self.derived.get_mut(&base) {
            set.remove(derived);
            if set.is_empty() {
                self.derived.remove(&base);
            }
        }
        Some(base)
    }

    /// Forget every derived entry at or below `prefix`.
    pub fn remove_subtree(&mut self, prefix: &Path) {
        let doomed: Vec<Path> = self
            .bases
            .range(prefix.clone()..)
            .take_while(|(p, _)| prefix.is_prefix_of(p))
            .map(|(p, _)| p.clone())
            .collect();
        for path in doomed {
            self.remove(&path);
        }
    }

    /// Record every base found in `value`, which lives at `prefix`.
    pub fn insert_subtree(&mut self, prefix: &Path, value: &Value) {
        value.for_each_base(prefix, &mut |derived, base| {
            self.insert(derived.clone(), base.clone());
        });
    }

    pub fn base_of(&self, derived: &Path) -> Option<&Path> {
        self.bases.get(derived)
    }

    /// Paths directly derived from `base`.
    pub fn derived_of(&self, base: &Path) -> Vec<Path> {
        self.derived
            .get(base)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// `(base, derived)` pairs whose base lies at or below `prefix`.
    pub fn derived_under(&self, prefix: &Path) -> Vec<(Path, Path)> {
        self.derived
            .range(prefix.clone()..)
            .take_while(|(base, _)| prefix.is_prefix_of(base))
            .flat_map(|(base, set)| set.iter().map(move |d| (base.clone(), d.clone())))
            .collect()
    }

    /// What `path` inherits from: the base of its nearest ancestor-or-self
    /// with one, extended by the remaining suffix.
    pub fn inherited_of(&self, path: &Path) -> Option<Path> {
        let mut prefix = path.clone();
        loop {
            if let Some(base) = self.bases.get(&prefix) {
                return Some(base.join(&path.strip_prefix(&prefix)?));
            }
            prefix.pop()?;
        }
    }

    /// Returns `true` if giving `derived` the base `base` would make some
    /// path inherit from itself.
    pub fn would_cycle(&self, derived: &Path, base: &Path) -> bool {
        let related = |p: &Path| derived.is_prefix_of(p) || p.is_prefix_of(derived);
        if related(base) {
            return true;
        }
        let mut seen = BTreeSet::new();
        let mut cur = base.clone();
        while let Some(next) = self.inherited_of(&cur) {
            if related(&next) || !seen.insert(next.clone()) {
                return true;
            }
            cur = next;
        }
        false
    }

    /// Re-key every entry at or below `old` to lie below `new`, on both
    /// sides of the relation.
    pub fn rename_prefix(&mut self, old: &Path, new: &Path) {
        let mut affected: BTreeSet<(Path, Path)> = self
            .bases
            .range(old.clone()..)
            .take_while(|(derived, _)| old.is_prefix_of(derived))
            .map(|(derived, base)| (derived.clone(), base.clone()))
            .collect();
        affected.extend(self.derived_under(old).into_iter().map(|(base, derived)| (derived, base)));
        let moved = |p: &Path| p.replace_prefix(old, new).unwrap_or_else(|| p.clone());
        for (derived, _) in &affected {
            self.remove(derived);
        }
        for (derived, base) in &affected {
            self.insert(moved(derived), moved(base));
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

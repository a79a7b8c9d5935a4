use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Wrappers generated for one package, listed in its `load.go`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub classes: BTreeSet<String>,
    pub functions: BTreeSet<String>,
}

/// An item to add to a package's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Class(String),
    Function(String),
}

#[derive(Debug, Default)]
struct SessionState {
    generated: HashSet<String>,
    registry: BTreeMap<String, PackageEntry>,
}

/// State shared by every task of one generation run: the set of types already
/// handled and the per-package registry of emitted wrappers.
///
/// Both live behind one lock, so concurrent roots never generate a type twice
/// and never write a manifest from a stale listing.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `key` as generated. Returns false when it already was.
    pub fn claim(&self, key: &str) -> bool {
        self.lock().generated.insert(key.to_string())
    }

    /// Registers an item under `package` and runs `f` on the updated entry
    /// while the lock is still held.
    pub fn register<R>(
        &self,
        package: &str,
        item: Registration,
        f: impl FnOnce(&PackageEntry) -> R,
    ) -> R {
        let mut state = self.lock();
        let entry = state.registry.entry(package.to_string()).or_default();
        match item {
            Registration::Class(name) => entry.classes.insert(name),
            Registration::Function(name) => entry.functions.insert(name),
        };
        f(entry)
    }

    /// Snapshot of the registry.
    pub fn registry(&self) -> BTreeMap<String, PackageEntry> {
        self.lock().registry.clone()
    }
}

//! In-memory engine.
//!
//! Backs the full [`EngineBridge`] surface with plain maps behind a mutex.
//! Snapshots are frozen copies of committed state; forks are writable
//! copies applied atomically by [`InMemoryEngine::commit_fork`] (the
//! "native code commits" path - the runtime bridge itself never commits).
//!
//! Destruction requests are counted per handle so lifecycle tests can
//! assert that an owning proxy destroys its view exactly once.

use std::collections::{BTreeMap, HashMap};

use oxbow_types::Handle;
use parking_lot::Mutex;

use crate::bridge::{EngineBridge, EngineError, Result};

/// Index kind recorded at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexKind {
    Map,
    List,
}

/// Named tables of one view.
#[derive(Debug, Clone, Default)]
struct Tables {
    maps: HashMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
    lists: HashMap<String, Vec<Vec<u8>>>,
}

/// One live view: a copy of table state plus its write capability.
#[derive(Debug)]
struct ViewState {
    tables: Tables,
    writable: bool,
}

/// One open index: the view it is scoped to, its table name and kind.
#[derive(Debug)]
struct IndexEntry {
    view: Handle,
    name: String,
    kind: IndexKind,
}

#[derive(Debug, Default)]
struct EngineState {
    committed: Tables,
    views: HashMap<Handle, ViewState>,
    indexes: HashMap<Handle, IndexEntry>,
    destroyed: HashMap<Handle, u32>,
    next_handle: u64,
}

impl EngineState {
    fn issue_handle(&mut self) -> Handle {
        self.next_handle += 1;
        Handle::new(self.next_handle)
    }

    /// Resolves an index to its owning view handle, table name, and kind.
    fn index_entry(&self, index: Handle, expected: IndexKind) -> Result<(Handle, String)> {
        let entry = self
            .indexes
            .get(&index)
            .ok_or(EngineError::UnknownIndex { handle: index })?;
        if entry.kind != expected {
            return Err(EngineError::WrongIndexKind {
                handle: index,
                expected: match expected {
                    IndexKind::Map => "map",
                    IndexKind::List => "list",
                },
            });
        }
        Ok((entry.view, entry.name.clone()))
    }

    fn view(&self, view: Handle) -> Result<&ViewState> {
        self.views.get(&view).ok_or(EngineError::UnknownView { handle: view })
    }

    fn writable_view(&mut self, view: Handle) -> Result<&mut ViewState> {
        let state = self
            .views
            .get_mut(&view)
            .ok_or(EngineError::UnknownView { handle: view })?;
        if !state.writable {
            return Err(EngineError::ReadOnlyView { handle: view });
        }
        Ok(state)
    }

    fn open_index(&mut self, view: Handle, name: &str, kind: IndexKind) -> Result<Handle> {
        let state = self.view(view)?;
        let taken_by_other_kind = match kind {
            IndexKind::Map => state.tables.lists.contains_key(name),
            IndexKind::List => state.tables.maps.contains_key(name),
        };
        if taken_by_other_kind {
            return Err(EngineError::WrongIndexKind {
                handle: view,
                expected: match kind {
                    IndexKind::Map => "map",
                    IndexKind::List => "list",
                },
            });
        }

        let handle = self.issue_handle();
        self.indexes.insert(handle, IndexEntry { view, name: name.to_string(), kind });
        Ok(handle)
    }
}

/// An in-process engine for tests and local runs.
///
/// Cheap to share: wrap in `Arc` and hand clones of the `Arc` to views.
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    state: Mutex<EngineState>,
}

impl InMemoryEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a snapshot view: a frozen copy of committed state.
    pub fn create_snapshot(&self) -> Handle {
        let mut state = self.state.lock();
        let tables = state.committed.clone();
        let handle = state.issue_handle();
        state.views.insert(handle, ViewState { tables, writable: false });
        handle
    }

    /// Creates a fork view: a writable copy whose changes stay buffered
    /// until [`InMemoryEngine::commit_fork`].
    pub fn create_fork(&self) -> Handle {
        let mut state = self.state.lock();
        let tables = state.committed.clone();
        let handle = state.issue_handle();
        state.views.insert(handle, ViewState { tables, writable: true });
        handle
    }

    /// Atomically applies a fork's buffered writes to committed state,
    /// consuming the view.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownView` if the fork is not live, or
    /// `EngineError::ReadOnlyView` if the handle references a snapshot.
    pub fn commit_fork(&self, fork: Handle) -> Result<()> {
        let mut state = self.state.lock();
        let view = state.views.get(&fork).ok_or(EngineError::UnknownView { handle: fork })?;
        if !view.writable {
            return Err(EngineError::ReadOnlyView { handle: fork });
        }
        // Checked above; remove cannot fail.
        if let Some(view) = state.views.remove(&fork) {
            state.committed = view.tables;
        }
        Ok(())
    }

    /// How many destruction requests this handle has received.
    ///
    /// Lifecycle tests assert exactly one for owning proxies and zero for
    /// non-owning ones.
    #[must_use]
    pub fn destroy_count(&self, handle: Handle) -> u32 {
        self.state.lock().destroyed.get(&handle).copied().unwrap_or(0)
    }

    /// Reads a committed map entry directly, bypassing views.
    ///
    /// Test observability: lets assertions check what the engine has
    /// actually committed without creating another view.
    #[must_use]
    pub fn committed_map_get(&self, name: &str, key: &[u8]) -> Option<Vec<u8>> {
        let state = self.state.lock();
        state.committed.maps.get(name).and_then(|map| map.get(key)).cloned()
    }
}

impl EngineBridge for InMemoryEngine {
    fn destroy_view(&self, view: Handle) {
        let mut state = self.state.lock();
        state.views.remove(&view);
        *state.destroyed.entry(view).or_insert(0) += 1;
    }

    fn open_map_index(&self, view: Handle, name: &str) -> Result<Handle> {
        self.state.lock().open_index(view, name, IndexKind::Map)
    }

    fn open_list_index(&self, view: Handle, name: &str) -> Result<Handle> {
        self.state.lock().open_index(view, name, IndexKind::List)
    }

    fn map_get(&self, index: Handle, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let state = self.state.lock();
        let (view, name) = state.index_entry(index, IndexKind::Map)?;
        let view = state.view(view)?;
        Ok(view.tables.maps.get(&name).and_then(|map| map.get(key)).cloned())
    }

    fn map_contains(&self, index: Handle, key: &[u8]) -> Result<bool> {
        let state = self.state.lock();
        let (view, name) = state.index_entry(index, IndexKind::Map)?;
        let view = state.view(view)?;
        Ok(view.tables.maps.get(&name).is_some_and(|map| map.contains_key(key)))
    }

    fn map_put(&self, index: Handle, key: &[u8], value: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let (view, name) = state.index_entry(index, IndexKind::Map)?;
        let view = state.writable_view(view)?;
        view.tables.maps.entry(name).or_default().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn map_remove(&self, index: Handle, key: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let (view, name) = state.index_entry(index, IndexKind::Map)?;
        let view = state.writable_view(view)?;
        if let Some(map) = view.tables.maps.get_mut(&name) {
            map.remove(key);
        }
        Ok(())
    }

    fn list_len(&self, index: Handle) -> Result<u64> {
        let state = self.state.lock();
        let (view, name) = state.index_entry(index, IndexKind::List)?;
        let view = state.view(view)?;
        Ok(view.tables.lists.get(&name).map_or(0, |list| list.len() as u64))
    }

    fn list_get(&self, index: Handle, position: u64) -> Result<Option<Vec<u8>>> {
        let state = self.state.lock();
        let (view, name) = state.index_entry(index, IndexKind::List)?;
        let view = state.view(view)?;
        Ok(view
            .tables
            .lists
            .get(&name)
            .and_then(|list| list.get(position as usize))
            .cloned())
    }

    fn list_push(&self, index: Handle, value: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let (view, name) = state.index_entry(index, IndexKind::List)?;
        let view = state.writable_view(view)?;
        view.tables.lists.entry(name).or_default().push(value.to_vec());
        Ok(())
    }
}

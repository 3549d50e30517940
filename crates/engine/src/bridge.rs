//! The abstracted native call surface.
//!
//! Handles are issued by the engine and interpreted by the engine; the
//! runtime side only carries them. View handles reference either an
//! immutable snapshot or a mutable fork whose buffered writes the engine
//! applies atomically on commit. Index handles reference structured access
//! points (map or list) scoped to one view.

use oxbow_types::Handle;
use snafu::Snafu;

/// Errors returned by engine operations.
#[derive(Debug, Snafu)]
pub enum EngineError {
    /// The view handle does not reference a live view.
    #[snafu(display("Unknown view handle: {handle}"))]
    UnknownView {
        /// The offending handle.
        handle: Handle,
    },

    /// The index handle does not reference a live index.
    #[snafu(display("Unknown index handle: {handle}"))]
    UnknownIndex {
        /// The offending handle.
        handle: Handle,
    },

    /// The named index exists with a different kind.
    #[snafu(display("Index {handle} is not a {expected} index"))]
    WrongIndexKind {
        /// The offending handle.
        handle: Handle,
        /// The kind the caller asked for.
        expected: &'static str,
    },

    /// A write was attempted through a read-only (snapshot) view.
    #[snafu(display("View {handle} is read-only"))]
    ReadOnlyView {
        /// The offending view handle.
        handle: Handle,
    },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// The native call surface the runtime bridge depends on.
///
/// Inputs are assumed valid only while the referenced view is live; the
/// runtime side guards every call with its own lifecycle checks before
/// reaching this trait. Destruction authority belongs to the caller holding
/// the owning proxy: `destroy_view` must be invoked at most once per view.
pub trait EngineBridge: Send + Sync {
    /// Destroys a native view and frees the memory behind it.
    fn destroy_view(&self, view: Handle);

    /// Opens a map index scoped to the given view.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownView` if the view is not live, or
    /// `EngineError::WrongIndexKind` if `name` already names a list index.
    fn open_map_index(&self, view: Handle, name: &str) -> Result<Handle>;

    /// Opens a list index scoped to the given view.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownView` if the view is not live, or
    /// `EngineError::WrongIndexKind` if `name` already names a map index.
    fn open_list_index(&self, view: Handle, name: &str) -> Result<Handle>;

    /// Reads a value from a map index.
    fn map_get(&self, index: Handle, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Whether a map index contains a key.
    fn map_contains(&self, index: Handle, key: &[u8]) -> Result<bool>;

    /// Writes a value into a map index.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ReadOnlyView` if the index belongs to a
    /// snapshot view.
    fn map_put(&self, index: Handle, key: &[u8], value: &[u8]) -> Result<()>;

    /// Removes a key from a map index. Removing an absent key is a no-op.
    fn map_remove(&self, index: Handle, key: &[u8]) -> Result<()>;

    /// Number of elements in a list index.
    fn list_len(&self, index: Handle) -> Result<u64>;

    /// Reads the element at `position`, or `None` past the end.
    fn list_get(&self, index: Handle, position: u64) -> Result<Option<Vec<u8>>>;

    /// Appends a value to a list index.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ReadOnlyView` if the index belongs to a
    /// snapshot view.
    fn list_push(&self, index: Handle, value: &[u8]) -> Result<()>;
}

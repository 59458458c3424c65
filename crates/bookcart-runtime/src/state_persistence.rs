//! Durable key-value storage for application state.
//!
//! This module provides the [`StorageBackend`] trait, the backends that
//! implement it, and [`StateSlot`], a typed handle on a single key.
//!
//! # Layers
//!
//! ```text
//!   CartStore / Shelf            (bookcart-core)
//!          │ persist / erase / load
//!          ▼
//!   StateSlot<T>                 one key, one serde type, failures absorbed
//!          │ get / set / delete (raw JSON text)
//!          ▼
//!   dyn StorageBackend
//!     ├─ MemoryStorage           RwLock<HashMap>, fault switches, op counters
//!     └─ FileStorage             one JSON file, replaced atomically
//! ```
//!
//! Backends only move strings; they never panic and report every problem
//! as a [`StorageError`]. Removing a key is distinct from writing an empty
//! value. A slot reads anything it cannot decode as `None`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returns error, in-memory state unaffected |
//! | `StorageError::Serialization` | JSON encode/decode | Slot reads as absent, logged |
//! | `StorageError::Corruption` | Invalid file format or poisoned lock | Returns error |
//! | `StorageError::Rejected` | Backend refused the write (quota) | Logged by the slot |
//! | Missing key | First run, key erased | `None` |

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Why a backend call failed.
#[derive(Debug)]
pub enum StorageError {
    /// The backing file could not be read or written.
    Io(std::io::Error),
    /// A value or the file envelope did not encode or decode.
    Serialization(String),
    /// The store itself is unusable (bad envelope, poisoned lock).
    Corruption(String),
    /// Backend is not available.
    Unavailable(String),
    /// Backend refused the operation (quota exceeded, read-only, ...).
    Rejected(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            StorageError::Rejected(msg) => write!(f, "storage rejected operation: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_)
            | StorageError::Corruption(_)
            | StorageError::Unavailable(_)
            | StorageError::Rejected(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result of a backend call.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for pluggable durable key-value stores.
///
/// Implementations must be thread-safe (`Send + Sync`) so a single backend
/// can be shared between several slots.
///
/// # Implementation Notes
///
/// - `get` returns `Ok(None)` for a key that was never written or was deleted.
/// - `set` replaces the whole value for the key.
/// - `delete` of a missing key succeeds.
pub trait StorageBackend: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key` entirely.
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether the backend can currently be used.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// Operation counters kept by [`MemoryStorage`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCounts {
    /// Calls to `get`, including failed ones.
    pub reads: usize,
    /// Calls to `set`, including failed ones.
    pub writes: usize,
    /// Calls to `delete`, including failed ones.
    pub deletes: usize,
}

/// Process-local backend; nothing outlives the value.
///
/// State is lost when the process exits. Reads and writes can be made to
/// fail on demand with [`fail_reads`](Self::fail_reads) and
/// [`fail_writes`](Self::fail_writes), which is how tests model a full
/// quota or an unreadable store.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryStorage {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `entries` already stored.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` and `delete` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the operation counters.
    #[must_use]
    pub fn op_counts(&self) -> OpCounts {
        OpCounts {
            reads: self.reads.load(Ordering::SeqCst),
            writes: self.writes.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
        }
    }

    /// Whether `key` currently holds a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data
            .read()
            .map(|g| g.contains_key(key))
            .unwrap_or(false)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Check if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected("quota exceeded".into()));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_writable()?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.len())
            .field("ops", &self.op_counts())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_storage {
    use super::*;
    use serde::Deserialize;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// File format for stored state (JSON).
    #[derive(Serialize, Deserialize)]
    struct StateFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Map of key -> raw value.
        entries: HashMap<String, String>,
    }

    impl StateFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: HashMap::new(),
            }
        }
    }

    /// File-based storage backend using JSON.
    ///
    /// All keys live in a single JSON file that is rewritten on every `set`
    /// and `delete` with an atomic write-rename.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "bookCart": "[1,3,5]"
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Create storage at the default location for the application.
        ///
        /// Uses `$XDG_STATE_HOME/{app_name}/state.json` on Linux,
        /// or `~/.local/state/{app_name}/state.json` when unset.
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            let base = dirs_or_fallback();
            let path = base.join(app_name).join("state.json");
            Self { path }
        }

        /// Path of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn read_file(&self) -> StorageResult<HashMap<String, String>> {
            if !self.path.exists() {
                return Ok(HashMap::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);

            let state_file: StateFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Corruption(format!("failed to parse state file: {e}"))
            })?;

            if state_file.format_version != StateFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = state_file.format_version,
                    expected = StateFile::FORMAT_VERSION,
                    "state file format version mismatch, ignoring stored state"
                );
                return Ok(HashMap::new());
            }

            Ok(state_file.entries)
        }

        /// Entries to rewrite on the next save; a corrupt file is replaced.
        fn entries_for_update(&self) -> StorageResult<HashMap<String, String>> {
            match self.read_file() {
                Ok(entries) => Ok(entries),
                Err(StorageError::Corruption(msg)) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %msg,
                        "overwriting unreadable state file"
                    );
                    Ok(HashMap::new())
                }
                Err(e) => Err(e),
            }
        }

        fn write_file(&self, entries: HashMap<String, String>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut state_file = StateFile::new();
            state_file.entries = entries;

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &state_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize state: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }

            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = state_file.entries.len(),
                "saved state file"
            );

            Ok(())
        }
    }

    /// Get state directory, falling back to current dir if unavailable.
    fn dirs_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            let mut entries = self.read_file()?;
            Ok(entries.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut entries = self.entries_for_update()?;
            entries.insert(key.to_string(), value.to_string());
            self.write_file(entries)
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            let mut entries = self.entries_for_update()?;
            if entries.remove(key).is_none() && self.path.exists() {
                return Ok(());
            }
            if entries.is_empty() {
                if self.path.exists() {
                    fs::remove_file(&self.path)?;
                }
                return Ok(());
            }
            self.write_file(entries)
        }

        fn is_available(&self) -> bool {
            if let Some(parent) = self.path.parent() {
                if !parent.exists() {
                    return fs::create_dir_all(parent).is_ok();
                }
                let test_path = parent.join(".bookcart_test_write");
                if fs::write(&test_path, b"test").is_ok() {
                    let _ = fs::remove_file(&test_path);
                    return true;
                }
            }
            false
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// State Slot
// ─────────────────────────────────────────────────────────────────────────────

/// Counters describing what a [`StateSlot`] has done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotStats {
    /// Successful or failed load attempts.
    pub loads: usize,
    /// Write attempts (successful or not).
    pub writes: usize,
    /// Erase attempts (successful or not).
    pub erases: usize,
    /// Writes or erases that the backend refused.
    pub failures: usize,
    /// Loads whose stored value could not be decoded or read.
    pub corrupt_loads: usize,
}

/// Typed handle on one key of a [`StorageBackend`].
///
/// Values are encoded as JSON. Reads degrade to `None` on any failure;
/// writes and erases log failures at `warn` and never roll anything back,
/// so the caller's in-memory value stays authoritative.
///
/// # Example
///
/// ```ignore
/// use bookcart_runtime::state_persistence::{MemoryStorage, StateSlot};
/// use std::sync::Arc;
///
/// let mut slot: StateSlot<Vec<i64>> = StateSlot::new(Arc::new(MemoryStorage::new()), "ids");
/// slot.persist(&vec![1, 2]);
/// assert_eq!(slot.load(), Some(vec![1, 2]));
/// ```
pub struct StateSlot<T> {
    backend: Arc<dyn StorageBackend>,
    key: String,
    stats: SlotStats,
    _value: PhantomData<fn() -> T>,
}

impl<T> StateSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a slot for `key` on `backend`. Does not touch the backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            stats: SlotStats::default(),
            _value: PhantomData,
        }
    }

    /// Read and decode the stored value without any recovery.
    pub fn try_load(&self) -> StorageResult<Option<T>> {
        match self.backend.get(&self.key)? {
            None => Ok(None),
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        }
    }

    /// Read the stored value, treating unreadable or corrupt data as absent.
    pub fn load(&mut self) -> Option<T> {
        self.stats.loads += 1;
        match self.try_load() {
            Ok(value) => {
                tracing::debug!(
                    key = %self.key,
                    backend = %self.backend.name(),
                    present = value.is_some(),
                    "loaded state"
                );
                value
            }
            Err(e) => {
                self.stats.corrupt_loads += 1;
                tracing::warn!(
                    key = %self.key,
                    backend = %self.backend.name(),
                    error = %e,
                    "discarding unreadable stored state"
                );
                None
            }
        }
    }

    /// Encode and store `value`, returning the backend's verdict.
    pub fn try_store(&mut self, value: &T) -> StorageResult<()> {
        self.stats.writes += 1;
        let encoded = serde_json::to_string(value);
        let result = encoded
            .map_err(StorageError::from)
            .and_then(|raw| self.backend.set(&self.key, &raw));
        if result.is_err() {
            self.stats.failures += 1;
        }
        result
    }

    /// Store `value`; failures are logged and otherwise ignored.
    pub fn persist(&mut self, value: &T) {
        match self.try_store(value) {
            Ok(()) => tracing::debug!(key = %self.key, "persisted state"),
            Err(e) => tracing::warn!(
                key = %self.key,
                backend = %self.backend.name(),
                error = %e,
                "failed to persist state, keeping in-memory copy"
            ),
        }
    }

    /// Remove the key from the backend, returning the backend's verdict.
    pub fn try_erase(&mut self) -> StorageResult<()> {
        self.stats.erases += 1;
        let result = self.backend.delete(&self.key);
        if result.is_err() {
            self.stats.failures += 1;
        }
        result
    }

    /// Remove the key; failures are logged and otherwise ignored.
    pub fn erase(&mut self) {
        match self.try_erase() {
            Ok(()) => tracing::debug!(key = %self.key, "erased state"),
            Err(e) => tracing::warn!(
                key = %self.key,
                backend = %self.backend.name(),
                error = %e,
                "failed to erase stored state"
            ),
        }
    }
}

impl<T> StateSlot<T> {
    /// The storage key this slot reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Counters for this slot.
    #[must_use]
    pub fn stats(&self) -> SlotStats {
        self.stats
    }

    /// Name of the underlying backend.
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Shared handle on the underlying backend.
    #[must_use]
    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.backend)
    }
}

impl<T> fmt::Debug for StateSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSlot")
            .field("key", &self.key)
            .field("backend", &self.backend.name())
            .field("stats", &self.stats)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_basic_operations() {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "[1,2]").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("[1,2]"));

        storage.delete("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        assert!(!storage.contains_key("k"));

        assert_eq!(
            storage.op_counts(),
            OpCounts {
                reads: 3,
                writes: 1,
                deletes: 1
            }
        );
    }

    #[test]
    fn memory_storage_with_entries() {
        let storage = MemoryStorage::with_entries([("bookCart", "[3]")]);
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("bookCart").unwrap().as_deref(), Some("[3]"));
    }

    #[test]
    fn memory_storage_fault_injection() {
        let storage = MemoryStorage::with_entries([("k", "v")]);

        storage.fail_writes(true);
        assert!(matches!(
            storage.set("k", "w"),
            Err(StorageError::Rejected(_))
        ));
        assert!(storage.delete("k").is_err());
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.fail_reads(true);
        assert!(matches!(storage.get("k"), Err(StorageError::Unavailable(_))));

        storage.fail_reads(false);
        storage.fail_writes(false);
        storage.set("k", "w").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn delete_missing_key_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.delete("never").is_ok());
    }

    #[test]
    fn slot_round_trip() {
        let backend = Arc::new(MemoryStorage::new());
        let mut slot: StateSlot<Vec<i64>> = StateSlot::new(backend.clone(), "ids");

        assert_eq!(slot.load(), None);
        slot.persist(&vec![4, 2]);
        assert_eq!(backend.get("ids").unwrap().as_deref(), Some("[4,2]"));
        assert_eq!(slot.load(), Some(vec![4, 2]));

        slot.erase();
        assert!(!backend.contains_key("ids"));
        assert_eq!(slot.load(), None);

        let stats = slot.stats();
        assert_eq!(stats.loads, 3);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.erases, 1);
        assert_eq!(stats.failures, 0);
    }

    #[test]
    fn slot_corrupt_value_reads_as_absent() {
        let backend = Arc::new(MemoryStorage::with_entries([("ids", "{malformed")]));
        let mut slot: StateSlot<Vec<i64>> = StateSlot::new(backend, "ids");

        assert!(matches!(
            slot.try_load(),
            Err(StorageError::Serialization(_))
        ));
        assert_eq!(slot.load(), None);
        assert_eq!(slot.stats().corrupt_loads, 1);
    }

    #[test]
    fn slot_failed_write_is_counted_not_raised() {
        let backend = Arc::new(MemoryStorage::new());
        backend.fail_writes(true);
        let mut slot: StateSlot<Vec<i64>> = StateSlot::new(backend.clone(), "ids");

        slot.persist(&vec![1]);
        slot.erase();

        let stats = slot.stats();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.erases, 1);
        assert_eq!(stats.failures, 2);
        assert!(backend.is_empty());
    }

    #[test]
    fn slot_unreadable_backend_reads_as_absent() {
        let backend = Arc::new(MemoryStorage::with_entries([("ids", "[1]")]));
        backend.fail_reads(true);
        let mut slot: StateSlot<Vec<i64>> = StateSlot::new(backend, "ids");
        assert_eq!(slot.load(), None);
    }

    #[test]
    fn storage_error_display() {
        let io_err = StorageError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(io_err.to_string().contains("I/O error"));

        let corrupt = StorageError::Corruption("bad data".into());
        assert!(corrupt.to_string().contains("corruption"));

        let unavail = StorageError::Unavailable("no backend".into());
        assert!(unavail.to_string().contains("unavailable"));

        let rejected = StorageError::Rejected("quota".into());
        assert!(rejected.to_string().contains("quota"));
    }
}

#[cfg(all(test, feature = "state-persistence"))]
mod file_storage_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        let storage = FileStorage::new(&path);

        storage.set("bookCart", "[1,3,5]").unwrap();
        assert!(path.exists());

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get("bookCart").unwrap().as_deref(),
            Some("[1,3,5]")
        );
    }

    #[test]
    fn file_storage_load_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("does_not_exist.json"));
        assert_eq!(storage.get("bookCart").unwrap(), None);
    }

    #[test]
    fn file_storage_keys_are_independent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        let storage = FileStorage::new(&path);

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.delete("a").unwrap();

        assert_eq!(storage.get("a").unwrap(), None);
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));

        storage.delete("b").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn file_storage_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dirs").join("state.json");
        let storage = FileStorage::new(&path);

        storage.set("k", "[]").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_storage_corrupt_file_is_replaced_on_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("bookCart"),
            Err(StorageError::Corruption(_))
        ));

        storage.set("bookCart", "[2]").unwrap();
        assert_eq!(storage.get("bookCart").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn file_storage_ignores_unknown_format_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"format_version":99,"entries":{"bookCart":"[1]"}}"#,
        )
        .unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("bookCart").unwrap(), None);
    }
}

//! Persisted job state store.
//!
//! The single [`JobState`] is kept in memory and mirrored to durable storage
//! on every write, so a page reload restores an in-progress or completed job
//! instead of silently resetting it. The storage medium is abstracted behind
//! [`StateBackend`] so the store logic runs against a plain in-memory map in
//! tests.

use common::jobs::JobState;
use gloo_console::error;

/// Storage key of the single serialized job blob.
pub const STORAGE_KEY: &str = "sita_analysis_state";

/// Minimal durable key-value surface the store needs.
pub trait StateBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str);
}

/// Browser `localStorage` backend used by the real app.
pub struct LocalStorageBackend;

impl LocalStorageBackend {
    fn storage(&self) -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl StateBackend for LocalStorageBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), String> {
        let storage = self.storage().ok_or("local storage unavailable")?;
        storage
            .set_item(key, value)
            .map_err(|_| "local storage write rejected".to_string())
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = self.storage() {
            storage.remove_item(key).ok();
        }
    }
}

/// Owner of the in-memory [`JobState`] plus its durable mirror.
///
/// All mutation goes through [`JobStore::set`], an atomic read-modify-write
/// merge followed by a persist, so concurrent-looking callback interleavings
/// (a progress tick racing a reload) cannot lose updates.
pub struct JobStore<B: StateBackend> {
    backend: B,
    key: &'static str,
    state: JobState,
}

impl<B: StateBackend> JobStore<B> {
    pub fn new(backend: B) -> Self {
        JobStore {
            backend,
            key: STORAGE_KEY,
            state: JobState::default(),
        }
    }

    /// Restores the last persisted state into memory and returns a copy.
    /// Missing or corrupt blobs yield the idle default; persistence problems
    /// must never take the UI down.
    pub fn load(&mut self) -> JobState {
        self.state = self
            .backend
            .read(self.key)
            .and_then(|blob| serde_json::from_str(&blob).ok())
            .unwrap_or_default();
        self.state.clone()
    }

    pub fn get(&self) -> &JobState {
        &self.state
    }

    /// Applies `merge` to the current state and persists the result.
    pub fn set(&mut self, merge: impl FnOnce(&mut JobState)) {
        merge(&mut self.state);
        self.save();
    }

    /// Persists the current state. Failures are logged and swallowed: losing
    /// the durable mirror degrades reload behavior, nothing else.
    pub fn save(&self) {
        let blob = match serde_json::to_string(&self.state) {
            Ok(blob) => blob,
            Err(err) => {
                error!("failed to serialize job state:", err.to_string());
                return;
            }
        };
        if let Err(err) = self.backend.write(self.key, &blob) {
            error!("failed to persist job state:", err);
        }
    }

    /// Drops both the in-memory state and the persisted blob.
    pub fn clear(&mut self) {
        self.state = JobState::default();
        self.backend.remove(self.key);
    }
}

//! Record Store
//!
//! The directory's persistent collection of entries. The resolution engine
//! only reads through [`RecordStore::find`] and [`RecordStore::get`]; the CRUD
//! handlers and the importer are the only writers.
//!
//! [`MemoryStore`] keeps rows in a `DashMap` keyed by id. When opened with a
//! snapshot path, every write is flushed to a JSON file before it becomes
//! visible in memory, so a failed flush leaves the store unchanged.

use super::types::{DirectoryEntry, NewEntry};
use crate::resolver::matcher::StreetFilter;

use anyhow::{Context, Result};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage seam used by the resolver and the CRUD collaborators.
pub trait RecordStore: Send + Sync {
    /// Every entry satisfying the filter, ordered by id.
    fn find(&self, filter: &StreetFilter) -> Result<Vec<DirectoryEntry>>;
    fn get(&self, id: u64) -> Result<Option<DirectoryEntry>>;
    /// Every entry, ordered by id.
    fn all(&self) -> Result<Vec<DirectoryEntry>>;
    fn insert(&self, entry: NewEntry) -> Result<DirectoryEntry>;
    /// Inserts a batch, assigning consecutive ids. The default inserts row by
    /// row; `MemoryStore` stores all entries or none.
    fn insert_many(&self, entries: Vec<NewEntry>) -> Result<Vec<DirectoryEntry>> {
        entries.into_iter().map(|entry| self.insert(entry)).collect()
    }
    /// Replaces all fields of an existing entry. `None` when the id is unknown.
    fn replace(&self, id: u64, entry: NewEntry) -> Result<Option<DirectoryEntry>>;
    /// `None` when the id is unknown.
    fn remove(&self, id: u64) -> Result<Option<DirectoryEntry>>;
    fn count(&self) -> Result<usize>;
}

pub struct MemoryStore {
    entries: DashMap<u64, DirectoryEntry>,
    next_id: AtomicU64,
    snapshot: Option<PathBuf>,
    /// Serializes writers so the snapshot on disk always matches memory.
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// A store that lives only in memory.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
            snapshot: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens a store backed by a JSON snapshot. A missing file yields an
    /// empty store that will create the file on its first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let rows: Vec<DirectoryEntry> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing snapshot {}", path.display()))?;

            let max_id = rows.iter().map(|e| e.id).max().unwrap_or(0);
            for row in rows {
                store.entries.insert(row.id, row);
            }
            store.next_id = AtomicU64::new(max_id + 1);
            tracing::info!(
                "Loaded {} directory entries from {}",
                store.entries.len(),
                path.display()
            );
        } else {
            tracing::info!(
                "Snapshot {} not found, starting with an empty directory",
                path.display()
            );
        }

        store.snapshot = Some(path);
        Ok(store)
    }

    /// Builds an in-memory store from existing rows, keeping their ids.
    pub fn with_entries(rows: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let store = Self::new();
        let mut max_id = 0;
        for row in rows {
            max_id = max_id.max(row.id);
            store.entries.insert(row.id, row);
        }
        store.next_id.store(max_id + 1, Ordering::SeqCst);
        store
    }

    fn sorted(&self) -> Vec<DirectoryEntry> {
        let mut rows: Vec<DirectoryEntry> =
            self.entries.iter().map(|e| e.value().clone()).collect();
        rows.sort_by_key(|e| e.id);
        rows
    }

    /// Writes the state that results from applying `change` to the current
    /// rows. Called with the write lock held, before memory is touched.
    fn flush_with(&self, change: Change<'_>) -> Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let mut rows = self.sorted();
        match change {
            Change::Upsert(entry) => match rows.iter_mut().find(|e| e.id == entry.id) {
                Some(row) => *row = entry.clone(),
                None => rows.push(entry.clone()),
            },
            Change::Append(batch) => rows.extend_from_slice(batch),
            Change::Remove(id) => rows.retain(|e| e.id != id),
        }

        let json = serde_json::to_string_pretty(&rows)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .with_context(|| format!("writing snapshot {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("replacing snapshot {}", path.display()))?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("directory write lock poisoned"))
    }
}

enum Change<'a> {
    Upsert(&'a DirectoryEntry),
    /// Fresh rows whose ids are all above the current maximum.
    Append(&'a [DirectoryEntry]),
    Remove(u64),
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn find(&self, filter: &StreetFilter) -> Result<Vec<DirectoryEntry>> {
        let mut rows: Vec<DirectoryEntry> = self
            .entries
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by_key(|e| e.id);
        Ok(rows)
    }

    fn get(&self, id: u64) -> Result<Option<DirectoryEntry>> {
        Ok(self.entries.get(&id).map(|e| e.value().clone()))
    }

    fn all(&self) -> Result<Vec<DirectoryEntry>> {
        Ok(self.sorted())
    }

    fn insert(&self, entry: NewEntry) -> Result<DirectoryEntry> {
        let _guard = self.lock()?;
        let id = self.next_id.load(Ordering::SeqCst);
        let row = DirectoryEntry::from_new(id, entry);

        self.flush_with(Change::Upsert(&row))?;
        self.next_id.store(id + 1, Ordering::SeqCst);
        self.entries.insert(id, row.clone());
        tracing::debug!("Inserted directory entry {}", id);
        Ok(row)
    }

    fn insert_many(&self, entries: Vec<NewEntry>) -> Result<Vec<DirectoryEntry>> {
        for (i, entry) in entries.iter().enumerate() {
            entry
                .validate()
                .map_err(|reason| anyhow::anyhow!("batch row {} rejected: {}", i + 1, reason))?;
        }

        let _guard = self.lock()?;
        let first = self.next_id.load(Ordering::SeqCst);
        let rows: Vec<DirectoryEntry> = entries
            .into_iter()
            .zip(first..)
            .map(|(entry, id)| DirectoryEntry::from_new(id, entry))
            .collect();

        self.flush_with(Change::Append(&rows))?;
        self.next_id.store(first + rows.len() as u64, Ordering::SeqCst);
        for row in &rows {
            self.entries.insert(row.id, row.clone());
        }
        tracing::debug!("Inserted {} directory entries from id {}", rows.len(), first);
        Ok(rows)
    }

    fn replace(&self, id: u64, entry: NewEntry) -> Result<Option<DirectoryEntry>> {
        let _guard = self.lock()?;
        if !self.entries.contains_key(&id) {
            return Ok(None);
        }
        let row = DirectoryEntry::from_new(id, entry);

        self.flush_with(Change::Upsert(&row))?;
        self.entries.insert(id, row.clone());
        tracing::debug!("Updated directory entry {}", id);
        Ok(Some(row))
    }

    fn remove(&self, id: u64) -> Result<Option<DirectoryEntry>> {
        let _guard = self.lock()?;
        if !self.entries.contains_key(&id) {
            return Ok(None);
        }

        self.flush_with(Change::Remove(id))?;
        let removed = self.entries.remove(&id).map(|(_, row)| row);
        tracing::debug!("Removed directory entry {}", id);
        Ok(removed)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.entries.len())
    }
}

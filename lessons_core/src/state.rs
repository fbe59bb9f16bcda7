//! Booking store persistence with file locking.
//!
//! The whole store is snapshotted as one JSON document. Saves go through a
//! temp file with an exclusive lock and an atomic rename, so a concurrent
//! process never observes a torn snapshot.

use crate::{BookingStore, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl BookingStore {
    /// Load the store snapshot with shared locking
    ///
    /// Returns a store seeded from the default catalog if the file doesn't
    /// exist yet. A snapshot that exists but can't be read or parsed is an
    /// error: booking rows must never be silently dropped.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No store snapshot found, starting from the default catalog");
            return Ok(Self::new());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        match serde_json::from_str::<BookingStore>(&contents) {
            Ok(store) => {
                tracing::debug!(
                    "Loaded store snapshot from {:?} ({} classes, {} entries)",
                    path,
                    store.classes.len(),
                    store.entries.len()
                );
                Ok(store)
            }
            Err(e) => Err(Error::State(format!(
                "corrupt store snapshot at {:?}: {}",
                path, e
            ))),
        }
    }

    /// Save the store snapshot with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "snapshot path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved store snapshot to {:?}", path);
        Ok(())
    }

    /// Load the store, modify it, and save it back atomically
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut BookingStore) -> Result<()>,
    {
        let mut store = Self::load(path)?;
        f(&mut store)?;
        store.save(path)?;
        Ok(store)
    }
}

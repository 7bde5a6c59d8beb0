// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! File-backed session store: one JSON document per session.

use dashmap::DashMap;
use moka::sync::Cache;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use traitscope_core::SessionId;

use crate::{SessionRecord, SessionStore, StoreError};

const RECORD_EXT: &str = "json";

/// Stores `<data_dir>/<session_id>.json` with a bounded read cache in front.
///
/// Every write goes to its own temp file and is renamed into place, so
/// readers never see a half-written record. Writes for one session are
/// serialized so the file on disk and the cache agree on the last writer.
pub struct FileSessionStore {
    dir: PathBuf,
    cache: Cache<SessionId, SessionRecord>,
    write_locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl FileSessionStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>, cache_capacity: u64) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!("Session store opened at {:?}", dir);
        Ok(Self {
            dir,
            cache: Cache::new(cache_capacity),
            write_locks: DashMap::new(),
        })
    }

    fn write_lock(&self, id: &SessionId) -> Arc<Mutex<()>> {
        self.write_locks.entry(id.clone()).or_default().clone()
    }

    fn record_path(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXT))
    }

    fn read_record(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let file = match File::open(self.record_path(id)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let corrupt = |reason: String| StoreError::Corrupt {
            session_id: id.to_string(),
            reason,
        };

        let record: SessionRecord =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| corrupt(e.to_string()))?;
        if record.session_id != *id {
            return Err(corrupt(format!(
                "file holds session {}",
                record.session_id
            )));
        }
        record
            .response
            .validate()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(Some(record))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        if let Some(record) = self.cache.get(id) {
            return Ok(Some(record));
        }

        let lock = self.write_lock(id);
        let _guard = lock.lock();
        let record = self.read_record(id)?;
        if let Some(ref record) = record {
            self.cache.insert(id.clone(), record.clone());
        }
        Ok(record)
    }

    fn put(&self, record: SessionRecord) -> Result<(), StoreError> {
        let id = record.session_id.clone();
        let lock = self.write_lock(&id);
        let _guard = lock.lock();

        // Hidden name with a .tmp extension, so len() never counts it.
        let temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", id))
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &record)?;
            writer.flush()?;
        }
        temp.persist(self.record_path(&id)).map_err(|e| e.error)?;

        debug!(session_id = %id, "Session written to disk");
        self.cache.insert(id, record);
        Ok(())
    }

    fn delete(&self, id: &SessionId) -> Result<bool, StoreError> {
        let lock = self.write_lock(id);
        let _guard = lock.lock();

        self.cache.invalidate(id);
        match fs::remove_file(self.record_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn len(&self) -> usize {
        match count_records(&self.dir) {
            Ok(n) => n,
            Err(e) => {
                warn!("Failed to count session records in {:?}: {}", self.dir, e);
                0
            }
        }
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

fn count_records(dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_record = path.extension().is_some_and(|ext| ext == RECORD_EXT)
            && !path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
        if is_record {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;
    use tempfile::TempDir;

    #[test]
    fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(temp_dir.path(), 16).unwrap();

        store.put(record("s1", "some text")).unwrap();
        let id = SessionId::parse("s1").unwrap();
        let loaded = store.get(&id).unwrap().unwrap();
        assert_eq!(loaded.content, "some text");
        assert!(temp_dir.path().join("s1.json").exists());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let original = record("persist", "kept");
        {
            let store = FileSessionStore::open(temp_dir.path(), 16).unwrap();
            store.put(original.clone()).unwrap();
        }

        let store = FileSessionStore::open(temp_dir.path(), 16).unwrap();
        let id = SessionId::parse("persist").unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(original));
    }

    #[test]
    fn test_overwrite_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(temp_dir.path(), 16).unwrap();
        let id = SessionId::parse("s1").unwrap();

        store.put(record("s1", "first")).unwrap();
        store.put(record("s1", "second")).unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().content, "second");

        assert!(store.delete(&id).unwrap());
        assert!(store.get(&id).unwrap().is_none());
        assert!(!store.delete(&id).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_writes_to_one_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(temp_dir.path(), 16).unwrap();
        let id = SessionId::parse("s1").unwrap();

        std::thread::scope(|scope| {
            for writer in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for round in 0..25 {
                        let text = format!("writer {} round {}", writer, round);
                        store.put(record("s1", &text)).unwrap();
                    }
                });
            }
        });

        // Cache and disk agree on the last writer.
        let cached = store.get(&id).unwrap().unwrap();
        let reopened = FileSessionStore::open(temp_dir.path(), 16).unwrap();
        assert_eq!(reopened.get(&id).unwrap(), Some(cached));

        assert_eq!(store.len(), 1);
        let leftovers = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter(|entry| {
                entry
                    .as_ref()
                    .unwrap()
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == "tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_corrupt_record() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.json"), "{ not json").unwrap();
        let store = FileSessionStore::open(temp_dir.path(), 16).unwrap();

        let id = SessionId::parse("broken").unwrap();
        match store.get(&id) {
            Err(StoreError::Corrupt { session_id, .. }) => assert_eq!(session_id, "broken"),
            other => panic!("expected corrupt record, got {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_session_id_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let raw = serde_json::to_string(&record("other", "x")).unwrap();
        fs::write(temp_dir.path().join("mine.json"), raw).unwrap();
        let store = FileSessionStore::open(temp_dir.path(), 16).unwrap();

        let id = SessionId::parse("mine").unwrap();
        assert!(matches!(store.get(&id), Err(StoreError::Corrupt { .. })));
    }
}

//! Durable key-value storage backed by small JSON documents. Every write goes
//! through a temp file plus atomic rename in the same directory, so readers
//! (the dashboard, external consumers) never observe a partial file. The
//! orchestrator is the sole writer; no locking is needed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use common::errors::StoreError;

pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Reads a JSON document, returning the type's default when the file is
    /// missing or corrupt. Only genuine I/O faults become errors.
    pub fn read_json<T>(&self, name: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path_of(name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("corrupt state file {}: {e}; using default", path.display());
                Ok(T::default())
            }
        }
    }

    /// Serializes to a sibling temp file and renames over the target. Rename
    /// within one directory is atomic on the platforms we run on.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path_of(name);
        let tmp = self.dir.join(format!(".{name}.tmp"));
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        count: u32,
        label: String,
    }

    #[test]
    fn round_trips_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        let doc = Doc {
            count: 3,
            label: "x".into(),
        };
        store.write_json("doc.json", &doc).unwrap();
        let back: Doc = store.read_json("doc.json").unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        let doc: Doc = store.read_json("absent.json").unwrap();
        assert_eq!(doc, Doc::default());
    }

    #[test]
    fn corrupt_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        std::fs::write(store.path_of("doc.json"), "{not json").unwrap();
        let doc: Doc = store.read_json("doc.json").unwrap();
        assert_eq!(doc, Doc::default());
    }

    #[test]
    fn write_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        store.write_json("doc.json", &Doc::default()).unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn overwrite_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path()).unwrap();
        store
            .write_json(
                "doc.json",
                &Doc {
                    count: 1,
                    label: "first".into(),
                },
            )
            .unwrap();
        store
            .write_json(
                "doc.json",
                &Doc {
                    count: 2,
                    label: "second".into(),
                },
            )
            .unwrap();
        let back: Doc = store.read_json("doc.json").unwrap();
        assert_eq!(back.count, 2);
        assert_eq!(back.label, "second");
    }
}

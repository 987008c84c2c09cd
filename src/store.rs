// Persistence plumbing: a string-keyed slot store and the artwork collection
// kept in one of its slots.
// The whole collection lives in a single slot as one JSON array; there is no
// per-artwork addressing and no partial update.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::gallery::Artwork;

/// Slot holding the serialized artwork collection.
pub const ARTWORKS_KEY: &str = "communityArtworks";

/// Minimal local-storage style store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store, mostly for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One file per key under a data directory (`<dir>/<key>.json`).
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// Load/save capability for the whole artwork list.
pub trait ArtworkStore {
    fn load(&self) -> Result<Vec<Artwork>, StoreError>;
    fn save(&mut self, artworks: &[Artwork]) -> Result<(), StoreError>;
}

/// [`ArtworkStore`] backed by the [`ARTWORKS_KEY`] slot of a key-value store.
pub struct SlotArtworkStore<S> {
    kv: S,
}

impl<S: KeyValueStore> SlotArtworkStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn inner(&self) -> &S {
        &self.kv
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.kv
    }
}

impl<S: KeyValueStore> ArtworkStore for SlotArtworkStore<S> {
    /// A missing or blank slot is an empty collection. Unparseable JSON is a
    /// hard error.
    fn load(&self) -> Result<Vec<Artwork>, StoreError> {
        match self.kv.get(ARTWORKS_KEY)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(StoreError::Corrupt),
            _ => Ok(Vec::new()),
        }
    }

    fn save(&mut self, artworks: &[Artwork]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(artworks).map_err(StoreError::Serialize)?;
        self.kv.set(ARTWORKS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(id: &str) -> Artwork {
        Artwork { id: id.into(), data: format!("data:image/png;base64,{id}") }
    }

    #[test]
    fn empty_slot_is_empty_list() {
        let store = SlotArtworkStore::new(MemoryStore::new());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn layout_is_a_json_array_of_id_and_data() {
        let mut store = SlotArtworkStore::new(MemoryStore::new());
        store.save(&[art("1"), art("2")]).unwrap();
        let raw = store.inner().get(ARTWORKS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], "1");
        assert_eq!(value[1]["data"], "data:image/png;base64,2");
        assert_eq!(store.load().unwrap(), vec![art("1"), art("2")]);
    }

    #[test]
    fn corrupt_slot_is_an_error() {
        let mut kv = MemoryStore::new();
        kv.set(ARTWORKS_KEY, "{not json").unwrap();
        let store = SlotArtworkStore::new(kv);
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut kv = FileStore::new(dir.path().join("nested"));
        assert_eq!(kv.get(ARTWORKS_KEY).unwrap(), None);
        kv.set(ARTWORKS_KEY, "[]").unwrap();
        assert_eq!(kv.get(ARTWORKS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(kv.dir().join("communityArtworks.json").exists());
    }

    #[test]
    fn file_store_keys_cannot_escape_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut kv = FileStore::new(dir.path());
        kv.set("../evil", "x").unwrap();
        assert!(dir.path().join("___evil.json").exists());
    }
}

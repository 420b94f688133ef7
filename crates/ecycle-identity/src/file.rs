use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::error::{IdentityError, IdentityResult};
use crate::store::{Binding, BindingStore};

/// Binding store persisted as a JSON file.
///
/// The whole map is rewritten on every `put` via write-temp-then-rename, so
/// a crash mid-write leaves the previous file intact. Bindings therefore
/// survive process restart, which the identity layer requires.
pub struct FileBindingStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, Binding>>,
}

impl FileBindingStore {
    /// Open (or create) the store at `path`, loading any existing bindings.
    pub fn open(path: &Path) -> IdentityResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let cache = if path.exists() {
            let data = fs::read(path)?;
            let bindings: Vec<Binding> = serde_json::from_slice(&data)
                .map_err(|e| IdentityError::Serialization(e.to_string()))?;
            bindings
                .into_iter()
                .map(|b| (b.external_id.clone(), b))
                .collect()
        } else {
            HashMap::new()
        };

        info!(path = %path.display(), bindings = cache.len(), "binding store opened");
        Ok(Self {
            path: path.to_path_buf(),
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the current map atomically.
    fn persist(&self, cache: &HashMap<String, Binding>) -> IdentityResult<()> {
        let mut bindings: Vec<&Binding> = cache.values().collect();
        bindings.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        let data = serde_json::to_vec_pretty(&bindings)
            .map_err(|e| IdentityError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = cache.len(), "bindings persisted");
        Ok(())
    }
}

impl BindingStore for FileBindingStore {
    fn get(&self, external_id: &str) -> IdentityResult<Option<Binding>> {
        let cache = self.cache.read().map_err(|_| IdentityError::LockPoisoned)?;
        Ok(cache.get(external_id).cloned())
    }

    fn put(&self, binding: &Binding) -> IdentityResult<()> {
        let mut cache = self.cache.write().map_err(|_| IdentityError::LockPoisoned)?;
        cache.insert(binding.external_id.clone(), binding.clone());
        self.persist(&cache)
    }

    fn list(&self) -> IdentityResult<Vec<Binding>> {
        let cache = self.cache.read().map_err(|_| IdentityError::LockPoisoned)?;
        Ok(cache.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecycle_types::Address;

    fn binding(id: &str, seed: u8) -> Binding {
        Binding {
            external_id: id.to_string(),
            address: Address::from_raw([seed; 20]),
            secret_key: [seed; 32],
        }
    }

    #[test]
    fn open_creates_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBindingStore::open(&dir.path().join("bindings.json")).unwrap();
        assert!(store.get("tg:1").unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn bindings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");

        {
            let store = FileBindingStore::open(&path).unwrap();
            store.put(&binding("tg:1001", 1)).unwrap();
            store.put(&binding("tg:1002", 2)).unwrap();
        }

        let reopened = FileBindingStore::open(&path).unwrap();
        assert_eq!(reopened.list().unwrap().len(), 2);
        let found = reopened.get("tg:1001").unwrap().unwrap();
        assert_eq!(found.address, Address::from_raw([1; 20]));
        assert_eq!(found.secret_key, [1; 32]);
    }

    #[test]
    fn put_overwrites_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");

        let store = FileBindingStore::open(&path).unwrap();
        store.put(&binding("tg:1", 1)).unwrap();
        store.put(&binding("tg:1", 9)).unwrap();
        drop(store);

        let reopened = FileBindingStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("tg:1").unwrap().unwrap().address,
            Address::from_raw([9; 20])
        );
        assert_eq!(reopened.list().unwrap().len(), 1);
    }

    #[test]
    fn open_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/bindings.json");
        let store = FileBindingStore::open(&path).unwrap();
        store.put(&binding("tg:1", 1)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileBindingStore::open(&path),
            Err(IdentityError::Serialization(_))
        ));
    }
}

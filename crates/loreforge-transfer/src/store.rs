//! Content-addressed asset storage.

use std::collections::HashMap;

use loreforge_model::{Asset, AssetKey};

/// In-memory content-addressed blob store.
///
/// The key is the hash of the content, so putting the same bytes twice
/// is a no-op and a re-upload under a different name deduplicates to
/// the same entry.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: HashMap<AssetKey, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an asset, returning its key. Idempotent.
    pub fn put(&mut self, asset: Asset) -> AssetKey {
        let key = asset.key;
        self.assets.entry(key).or_insert(asset);
        key
    }

    pub fn get(&self, key: &AssetKey) -> Option<&Asset> {
        self.assets.get(key)
    }

    pub fn remove(&mut self, key: &AssetKey) -> Option<Asset> {
        self.assets.remove(key)
    }

    pub fn contains(&self, key: &AssetKey) -> bool {
        self.assets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_is_idempotent() {
        let mut store = AssetStore::new();
        let k1 = store.put(Asset::new("map", b"pixels".to_vec()));
        let k2 = store.put(Asset::new("map-copy", b"pixels".to_vec()));
        assert_eq!(k1, k2);
        assert_eq!(store.len(), 1);
        // First name wins on dedup.
        assert_eq!(store.get(&k1).unwrap().name, "map");
    }

    #[test]
    fn test_get_unknown_is_none() {
        let store = AssetStore::new();
        assert!(store.get(&AssetKey::of(b"nothing")).is_none());
    }

    #[test]
    fn test_remove() {
        let mut store = AssetStore::new();
        let key = store.put(Asset::new("a", vec![1, 2, 3]));
        assert!(store.remove(&key).is_some());
        assert!(!store.contains(&key));
    }
}

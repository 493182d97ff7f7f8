//! Shared fixtures for the integration suite.

use minidb::{PathBuf, Store, StoreConfig};

/// A fresh `Store` over a temp file, plus the `TempDir` that must outlive it.
pub fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(StoreConfig::new(dir.path().join("db.json"))).unwrap();
    (dir, store)
}

/// Seeds a store with a small nested document:
/// `{"users": [{"name": "kmill", "age": 30}, {"name": "ari", "age": 25}], "count": 2}`.
pub fn seed_users(store: &Store) {
    store
        .insert(
            &PathBuf::root().push("users"),
            serde_json::from_str(
                r#"[{"name": "kmill", "age": 30}, {"name": "ari", "age": 25}]"#,
            )
            .unwrap(),
            false,
            false,
        )
        .unwrap();
    store.insert(&PathBuf::root().push("count"), minidb::Value::Int(2), false, false).unwrap();
}

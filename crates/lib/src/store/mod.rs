//! `Store`: the owner of the in-memory tree, the lock, and the backing
//! file. All of the crate's I/O and concurrency live here; `mutator` stays
//! pure so it can be unit-tested without a filesystem.

mod config;
mod rwlock;

pub use config::StoreConfig;
pub use rwlock::TreeLock;

use std::{
    fs,
    io::{ErrorKind, Write},
    sync::Mutex as StdMutex,
};

use crate::{
    ast::QueryFunc,
    error::{Error, Result},
    fuel::Fuel,
    mutator::{self, Change},
    path::PathBuf,
    value::{Map, Value},
};

/// An embedded document database: one backing file, one in-memory tree,
/// one reentrant-writer lock.
pub struct Store {
    config: StoreConfig,
    lock: TreeLock,
    data: StdMutex<Value>,
}

impl Store {
    /// Opens `config.path`, loading its contents (or starting from an
    /// empty map if the file does not exist yet).
    pub fn open(config: StoreConfig) -> Result<Self> {
        let data = Self::read_from_disk(config.path())?;
        tracing::info!(path = %config.path().display(), "store opened");
        Ok(Store {
            config,
            lock: TreeLock::new(),
            data: StdMutex::new(data),
        })
    }

    fn read_from_disk(path: &std::path::Path) -> Result<Value> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Value::Map(Map::new())),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn narrow(tree: &Value, subpath: Option<&PathBuf>) -> Result<(Value, PathBuf)> {
        match subpath {
            Some(p) => Ok((p.get(tree)?.clone(), p.clone())),
            None => Ok((tree.clone(), PathBuf::root())),
        }
    }

    fn fuel(&self) -> Fuel {
        Fuel::new(self.config.fuel_budget)
    }

    /// Serializes the tree to `<file>.tmp` and atomically renames it over
    /// `<file>`. Must be called while holding at least a read lock.
    fn write_to_disk(&self) -> Result<()> {
        let tmp_path = self.tmp_path();
        let tree = self.data.lock().unwrap();
        let bytes = if self.config.pretty_json {
            serde_json::to_vec_pretty(&*tree)?
        } else {
            serde_json::to_vec(&*tree)?
        };
        drop(tree);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp_path, self.config.path())?;
        tracing::debug!(path = %self.config.path().display(), "committed tree to disk");
        Ok(())
    }

    fn tmp_path(&self) -> std::path::PathBuf {
        let mut p = self.config.path().as_os_str().to_owned();
        p.push(".tmp");
        p.into()
    }

    /// Flushes the current in-memory tree to disk. Acquires a read lock
    /// (spec.md §4.7: commit only needs to exclude concurrent writers, not
    /// concurrent readers).
    pub fn commit(&self) -> Result<()> {
        let _read = self.lock.read();
        self.write_to_disk()
    }

    /// Reloads the tree from disk (or resets it to an empty map if the file
    /// is absent). Runs under the write lock.
    pub fn rollback(&self) -> Result<()> {
        let _write = self.lock.write();
        let fresh = Self::read_from_disk(self.config.path())?;
        *self.data.lock().unwrap() = fresh;
        tracing::warn!(path = %self.config.path().display(), "tree rolled back from disk");
        Ok(())
    }

    /// Runs a query under the read lock and returns its result values.
    pub fn select(&self, qf: &QueryFunc, subpath: Option<&PathBuf>) -> Result<Vec<Value>> {
        let _read = self.lock.read();
        let tree = self.data.lock().unwrap();
        let (root_value, root_path) = Self::narrow(&tree, subpath)?;
        mutator::select(&root_value, root_path, qf, &self.fuel())
    }

    /// Validates `value`, locates `path`'s parent, enforces
    /// `overwrite`/`append`, writes it in, and commits.
    pub fn insert(&self, path: &PathBuf, value: Value, append: bool, overwrite: bool) -> Result<()> {
        if !value.check_type_is_ok() {
            return Err(Error::TypeRejected);
        }

        let _write = self.lock.write();
        {
            let mut tree = self.data.lock().unwrap();
            if append {
                let target = mutator::get_or_create_array_at(&mut tree, path)?;
                target.push(value);
            } else {
                if path.get(&tree).is_ok() && !overwrite {
                    return Err(Error::PathConflict { path: path.clone() });
                }
                mutator::set_at(&mut tree, path, value)?;
            }
        }
        tracing::debug!(path = %path, append, overwrite, "inserted value");

        let _read = self.lock.read();
        drop(_write);
        self.write_to_disk()
    }

    /// Runs `qf`, deletes every selected (tree-sourced) result, and
    /// commits. On `InconsistentData` the in-memory tree is rolled back
    /// from disk before the error is re-raised (spec.md §4.7/§7); any other
    /// error propagates with the tree untouched.
    pub fn remove(&self, qf: &QueryFunc, subpath: Option<&PathBuf>) -> Result<()> {
        let _write = self.lock.write();
        let fuel = self.fuel();
        let result = {
            let mut tree = self.data.lock().unwrap();
            let (root_value, root_path) = Self::narrow(&tree, subpath)?;
            mutator::remove(&mut tree, root_value, root_path, qf, &fuel)
        };
        self.finish_mutation(result, _write)
    }

    /// Runs `qf`, evaluates and applies every `Change`, and commits.
    /// Rollback policy matches `remove`.
    pub fn update(&self, qf: &QueryFunc, changes: &[Change], subpath: Option<&PathBuf>) -> Result<()> {
        let _write = self.lock.write();
        let fuel = self.fuel();
        let result = {
            let mut tree = self.data.lock().unwrap();
            let (root_value, root_path) = Self::narrow(&tree, subpath)?;
            mutator::update(&mut tree, root_value, root_path, qf, changes, &fuel)
        };
        self.finish_mutation(result, _write)
    }

    fn finish_mutation(&self, result: Result<()>, write_guard: rwlock::WriteGuard<'_>) -> Result<()> {
        match result {
            Err(e) if e.triggers_rollback() => {
                tracing::error!(error = %e, "mutation left the tree inconsistent; rolling back");
                let fresh = Self::read_from_disk(self.config.path());
                match fresh {
                    Ok(fresh_tree) => *self.data.lock().unwrap() = fresh_tree,
                    Err(reload_err) => {
                        tracing::error!(error = %reload_err, "rollback reload also failed");
                    }
                }
                Err(e)
            }
            Err(e) => Err(e),
            Ok(()) => {
                let _read = self.lock.read();
                drop(write_guard);
                self.write_to_disk()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Expr, Query, ValueFunc},
        mutator::UpdateMode,
    };

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = Store::open(StoreConfig::new(path)).unwrap();
        (dir, store)
    }

    #[test]
    fn insert_then_select_round_trips() {
        let (_dir, store) = temp_store();
        store.insert(&PathBuf::root().push("name"), Value::Str("kmill".into()), false, false).unwrap();

        let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("name")));
        let results = store.select(&qf, None).unwrap();
        assert_eq!(results, vec![Value::Str("kmill".into())]);
    }

    #[test]
    fn insert_without_overwrite_on_occupied_path_conflicts() {
        let (_dir, store) = temp_store();
        let path = PathBuf::root().push("name");
        store.insert(&path, Value::Int(1), false, false).unwrap();
        let err = store.insert(&path, Value::Int(2), false, false).unwrap_err();
        assert!(matches!(err, Error::PathConflict { .. }));
    }

    #[test]
    fn commit_then_reopen_reads_back_equal_tree() {
        let (dir, store) = temp_store();
        store.insert(&PathBuf::root().push("x"), Value::Int(42), false, false).unwrap();

        let reopened = Store::open(StoreConfig::new(dir.path().join("db.json"))).unwrap();
        let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("x")));
        let results = reopened.select(&qf, None).unwrap();
        assert_eq!(results, vec![Value::Int(42)]);
    }

    #[test]
    fn remove_via_store_commits_the_deletion() {
        let (_dir, store) = temp_store();
        store.insert(&PathBuf::root().push("x"), Value::Int(1), false, false).unwrap();

        let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root()));
        store.remove(&qf, None).unwrap();

        let select_qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root()));
        assert_eq!(store.select(&select_qf, None).unwrap().len(), 0);
    }

    #[test]
    fn update_via_store_applies_change() {
        let (_dir, store) = temp_store();
        store.insert(&PathBuf::root().push("count"), Value::Int(1), false, false).unwrap();

        let qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("count")));
        let change = Change {
            subpath: PathBuf::root(),
            valuefunc: ValueFunc::new(Some("v"), Expr::op("add", vec![Expr::var("v"), Expr::constant(1i64)]).unwrap()),
            mode: UpdateMode::Overwrite,
        };
        store.update(&qf, &[change], None).unwrap();

        let select_qf = QueryFunc::new(Some("root"), Query::get(Expr::var("root"), PathBuf::root().push("count")));
        assert_eq!(store.select(&select_qf, None).unwrap(), vec![Value::Int(2)]);
    }
}

//! `select`, `remove`, `update`: the pure functions built on the
//! interpreter plus the path-trie used to stage deletions.
//!
//! None of these touch the filesystem or the lock — that is `store`'s job.
//! Each function here takes the tree by reference (`select`) or by mutable
//! reference (`remove`/`update`) and returns `Result`; `store::Store` is
//! responsible for translating an `Err` into a rollback when appropriate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    ast::{QueryFunc, ValueFunc},
    bindings::Bindings,
    error::{Error, Result},
    fuel::Fuel,
    interp::{self, eval},
    path::{PathBuf, Step},
    value::Value,
};

/// Builds the initial environment binding `qf.var` to `(Some(root_path),
/// root_value)`. `root_value` is already-narrowed (and, for `remove`/
/// `update`, already a snapshot distinct from the live tree being mutated).
fn root_env(root_value: Value, root_path: PathBuf, qf: &QueryFunc) -> Bindings {
    match &qf.var {
        Some(name) => Bindings::empty().extend(name.clone(), (Some(root_path), root_value)),
        None => Bindings::empty(),
    }
}

/// Binds `qf.var` to `(Some(root_path), tree)` and drains `execute`, keeping
/// only the values (spec.md §4.4).
pub fn select(tree: &Value, root_path: PathBuf, qf: &QueryFunc, fuel: &Fuel) -> Result<Vec<Value>> {
    let env = root_env(tree.clone(), root_path, qf);
    interp::execute(&qf.query, fuel, env)
        .map(|item| item.map(|(_, v)| v))
        .collect()
}

/// One node of the overlay path-trie used to stage a `remove`.
///
/// Inserting a path marks it `Deleted`, discarding any deeper marks that
/// already existed under it; inserting under an already-`Deleted` ancestor
/// is a no-op (shallower always wins). See spec.md §4.5.
enum TrieNode {
    Deleted,
    Branch(HashMap<Step, TrieNode>),
}

fn trie_insert(children: &mut HashMap<Step, TrieNode>, steps: &[Step]) {
    let head = steps[0].clone();
    let rest = &steps[1..];

    if matches!(children.get(&head), Some(TrieNode::Deleted)) {
        return;
    }
    if rest.is_empty() {
        children.insert(head, TrieNode::Deleted);
        return;
    }
    match children.entry(head).or_insert_with(|| TrieNode::Branch(HashMap::new())) {
        TrieNode::Deleted => {}
        TrieNode::Branch(grandchildren) => trie_insert(grandchildren, rest),
    }
}

/// Applies a (non-empty) subtrie to the container at `value`, removing
/// `Deleted` entries and recursing into `Branch` entries. Array deletions
/// are collected and applied in descending index order so earlier removals
/// never shift the index of a later one (spec.md §4.5, property 8).
fn apply_trie(value: &mut Value, children: &HashMap<Step, TrieNode>) -> Result<()> {
    match value {
        Value::Map(map) => {
            for (step, node) in children {
                let key = match step {
                    Step::MapKey(k) => k,
                    Step::ArrayIndex(_) => {
                        return Err(Error::InconsistentData {
                            reason: "path expected an array index but the tree has a map".to_string(),
                        });
                    }
                };
                match node {
                    TrieNode::Deleted => {
                        if map.remove(key).is_none() {
                            return Err(Error::InconsistentData {
                                reason: format!("key {key:?} was already gone during remove apply"),
                            });
                        }
                    }
                    TrieNode::Branch(grandchildren) => {
                        let child = map.get_mut(key).ok_or_else(|| Error::InconsistentData {
                            reason: format!("key {key:?} went missing during remove apply"),
                        })?;
                        apply_trie(child, grandchildren)?;
                    }
                }
            }
            Ok(())
        }
        Value::Array(items) => {
            let mut delete_indices = Vec::new();
            for (step, node) in children {
                let idx = match step {
                    Step::ArrayIndex(i) => *i,
                    Step::MapKey(_) => {
                        return Err(Error::InconsistentData {
                            reason: "path expected a map key but the tree has an array".to_string(),
                        });
                    }
                };
                match node {
                    TrieNode::Deleted => delete_indices.push(idx),
                    TrieNode::Branch(grandchildren) => {
                        let child = items.get_mut(idx).ok_or_else(|| Error::InconsistentData {
                            reason: format!("index {idx} out of range during remove apply"),
                        })?;
                        apply_trie(child, grandchildren)?;
                    }
                }
            }
            delete_indices.sort_unstable_by(|a, b| b.cmp(a));
            for idx in delete_indices {
                if idx >= items.len() {
                    return Err(Error::InconsistentData {
                        reason: format!("index {idx} out of range during remove apply"),
                    });
                }
                items.remove(idx);
            }
            Ok(())
        }
        other => Err(Error::InconsistentData {
            reason: format!("expected a map or array at this path, found {}", other.type_name()),
        }),
    }
}

/// Runs `qf`, requiring every result to carry a tree-sourced path (I2),
/// stages the resulting paths in a trie deduplicated by ancestor dominance,
/// then applies the trie to `tree`. `tree` is left untouched if any result
/// is missing a path.
pub fn remove(tree: &mut Value, root_value: Value, root_path: PathBuf, qf: &QueryFunc, fuel: &Fuel) -> Result<()> {
    let env = root_env(root_value, root_path, qf);

    let mut root: Option<TrieNode> = None;
    for item in interp::execute(&qf.query, fuel, env) {
        let (path, _value) = item?;
        let path = path.ok_or(Error::RemovalOfNonTreeValue)?;
        let steps = path.steps();
        if steps.is_empty() {
            root = Some(TrieNode::Deleted);
            continue;
        }
        match &mut root {
            Some(TrieNode::Deleted) => {}
            Some(TrieNode::Branch(children)) => trie_insert(children, &steps),
            None => {
                let mut children = HashMap::new();
                trie_insert(&mut children, &steps);
                root = Some(TrieNode::Branch(children));
            }
        }
    }

    match root {
        None => Ok(()),
        Some(TrieNode::Deleted) => {
            *tree = Value::Null;
            Ok(())
        }
        Some(TrieNode::Branch(children)) => apply_trie(tree, &children),
    }
}

/// How a single `update` change is applied at its `changepath` (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateMode {
    Overwrite,
    Append,
    Renamekey,
}

/// One field of an `update` call: where (relative to each selected result),
/// what the new value is computed from, and how it is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub subpath: PathBuf,
    pub valuefunc: ValueFunc,
    pub mode: UpdateMode,
}

/// Two-pass update: evaluate every change's `valuefunc` against a snapshot
/// of each selected result before mutating anything, then apply all the
/// computed values. A failure during the apply pass means the tree may be
/// partially mutated — the caller (`store::Store`) is expected to convert
/// that into a rollback.
pub fn update(tree: &mut Value, root_value: Value, root_path: PathBuf, qf: &QueryFunc, changes: &[Change], fuel: &Fuel) -> Result<()> {
    let base_env = root_env(root_value, root_path, qf);

    let mut planned: Vec<(PathBuf, Vec<Value>)> = Vec::new();
    for item in interp::execute(&qf.query, fuel, base_env.clone()) {
        let (path, value) = item?;
        let path = path.ok_or(Error::RemovalOfNonTreeValue)?;

        let mut new_values = Vec::with_capacity(changes.len());
        for change in changes {
            let change_env = match &change.valuefunc.var {
                Some(name) => base_env.extend(name.clone(), (None, value.clone())),
                None => base_env.clone(),
            };
            let (_, new_value) = eval(&change.valuefunc.expr, fuel, &change_env)?;
            new_values.push(new_value);
        }
        planned.push((path, new_values));
    }

    for (path, new_values) in &planned {
        for (change, new_value) in changes.iter().zip(new_values.iter()) {
            apply_change(tree, path, change, new_value.clone())?;
        }
    }
    Ok(())
}

fn apply_change(tree: &mut Value, result_path: &PathBuf, change: &Change, new_value: Value) -> Result<()> {
    let changepath = result_path.concat(&change.subpath);
    match change.mode {
        UpdateMode::Overwrite => set_at(tree, &changepath, new_value),
        UpdateMode::Append => {
            let target = get_or_create_array_at(tree, &changepath)?;
            target.push(new_value);
            Ok(())
        }
        UpdateMode::Renamekey => rename_key(tree, result_path, &change.subpath, new_value),
    }
}

pub(crate) fn set_at(tree: &mut Value, path: &PathBuf, value: Value) -> Result<()> {
    match path.last_step() {
        None => {
            *tree = value;
            Ok(())
        }
        Some(step) => {
            let parent_path = path.parent().expect("non-root path has a parent");
            let parent = parent_path.get_mut(tree)?;
            match (parent, step) {
                (Value::Map(map), Step::MapKey(k)) => {
                    map.insert(k.clone(), value);
                    Ok(())
                }
                (Value::Array(arr), Step::ArrayIndex(i)) => {
                    let slot = arr.get_mut(*i).ok_or_else(|| Error::InconsistentData {
                        reason: format!("index {i} out of range during update apply"),
                    })?;
                    *slot = value;
                    Ok(())
                }
                _ => Err(Error::InconsistentData {
                    reason: "path shape mismatch during update apply".to_string(),
                }),
            }
        }
    }
}

pub(crate) fn get_or_create_array_at<'t>(tree: &'t mut Value, path: &PathBuf) -> Result<&'t mut Vec<Value>> {
    match path.last_step() {
        None => {
            if matches!(tree, Value::Null) {
                *tree = Value::Array(Vec::new());
            }
            tree.as_array_mut().ok_or_else(|| Error::NotAList { path: path.clone() })
        }
        Some(step) => {
            let parent_path = path.parent().expect("non-root path has a parent");
            let parent = parent_path.get_mut(tree)?;
            match (parent, step) {
                (Value::Map(map), Step::MapKey(k)) => {
                    if !map.contains_key(k) {
                        map.insert(k.clone(), Value::Array(Vec::new()));
                    }
                    match map.get_mut(k) {
                        Some(Value::Array(arr)) => Ok(arr),
                        _ => Err(Error::NotAList { path: path.clone() }),
                    }
                }
                (Value::Array(arr), Step::ArrayIndex(i)) => {
                    let slot = arr.get_mut(*i).ok_or_else(|| Error::InconsistentData {
                        reason: format!("index {i} out of range during update apply"),
                    })?;
                    if matches!(slot, Value::Null) {
                        *slot = Value::Array(Vec::new());
                    }
                    match slot {
                        Value::Array(a) => Ok(a),
                        _ => Err(Error::NotAList { path: path.clone() }),
                    }
                }
                _ => Err(Error::InconsistentData {
                    reason: "path shape mismatch during update apply".to_string(),
                }),
            }
        }
    }
}

fn rename_key(tree: &mut Value, result_path: &PathBuf, subpath: &PathBuf, new_key: Value) -> Result<()> {
    let new_key = match new_key {
        Value::Str(s) => s,
        other => {
            return Err(Error::InconsistentData {
                reason: format!("Renamekey requires a string new-key value, got {}", other.type_name()),
            });
        }
    };
    let full_old_path = result_path.concat(subpath);
    let old_step = full_old_path.last_step().cloned().ok_or_else(|| Error::InconsistentData {
        reason: "cannot rename the tree root".to_string(),
    })?;
    let parent_path = full_old_path.parent().expect("non-root path has a parent");
    let parent = parent_path.get_mut(tree)?;
    match parent {
        Value::Map(map) => {
            let key = match &old_step {
                Step::MapKey(k) => k.clone(),
                Step::ArrayIndex(_) => {
                    return Err(Error::InconsistentData {
                        reason: "Renamekey target is indexed by position, not by key".to_string(),
                    });
                }
            };
            let value = map.remove(&key).ok_or_else(|| Error::InconsistentData {
                reason: format!("key {key:?} went missing during rename"),
            })?;
            map.insert(new_key, value);
            Ok(())
        }
        _ => Err(Error::InconsistentData {
            reason: "Renamekey target's parent is not a map".to_string(),
        }),
    }
}

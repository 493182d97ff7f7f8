//! Paths of provenance through the document tree.
//!
//! A `Path` is the route of map-key and array-index steps from the tree
//! root down to some value, structured as the same key+parent cons-list the
//! original `minidb.Path` used (`Path(key, parent)`), rather than a `Vec` —
//! cheap structural sharing matters here because every `Get` step extends
//! an existing path and many results share a long common prefix.

use std::{fmt, rc::Rc};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::Value;

/// One step of a path: a map key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    MapKey(String),
    ArrayIndex(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::MapKey(k) => write!(f, "{k:?}"),
            Step::ArrayIndex(i) => write!(f, "[{i}]"),
        }
    }
}

impl From<&str> for Step {
    fn from(value: &str) -> Self {
        Step::MapKey(value.to_string())
    }
}

impl From<String> for Step {
    fn from(value: String) -> Self {
        Step::MapKey(value)
    }
}

impl From<usize> for Step {
    fn from(value: usize) -> Self {
        Step::ArrayIndex(value)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Node {
    step: Step,
    parent: PathBuf,
}

/// An immutable, structurally-shared path from the tree root to a value.
///
/// `PathBuf::root()` is the empty path. `Clone` is O(1) (an `Rc` bump).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBuf(Option<Rc<Node>>);

impl PathBuf {
    /// The empty path, denoting the tree root.
    pub fn root() -> Self {
        PathBuf(None)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// Appends one step, returning a new path. `self` is left unchanged.
    pub fn push(&self, step: impl Into<Step>) -> PathBuf {
        PathBuf(Some(Rc::new(Node {
            step: step.into(),
            parent: self.clone(),
        })))
    }

    /// Appends all of `other`'s steps after `self`'s.
    pub fn concat(&self, other: &PathBuf) -> PathBuf {
        match &other.0 {
            None => self.clone(),
            Some(node) => self.concat(&node.parent).push(node.step.clone()),
        }
    }

    /// The last step, or `None` for the root.
    pub fn last_step(&self) -> Option<&Step> {
        self.0.as_ref().map(|n| &n.step)
    }

    /// The path with its last step removed, or `None` for the root.
    pub fn parent(&self) -> Option<PathBuf> {
        self.0.as_ref().map(|n| n.parent.clone())
    }

    /// Steps from the root to this path, in traversal order.
    pub fn steps(&self) -> Vec<Step> {
        let mut out = Vec::new();
        self.collect_steps(&mut out);
        out
    }

    fn collect_steps(&self, out: &mut Vec<Step>) {
        if let Some(node) = &self.0 {
            node.parent.collect_steps(out);
            out.push(node.step.clone());
        }
    }

    pub fn len(&self) -> usize {
        match &self.0 {
            None => 0,
            Some(node) => 1 + node.parent.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Walks `self`'s steps against `root`, failing on a missing map key,
    /// an out-of-range array index, or indexing into a scalar.
    pub fn get<'v>(&self, root: &'v Value) -> crate::error::Result<&'v Value> {
        match &self.0 {
            None => Ok(root),
            Some(node) => {
                let parent_value = node.parent.get(root)?;
                step_get(parent_value, &node.step).ok_or_else(|| crate::error::Error::PathNotFound {
                    path: self.clone(),
                })
            }
        }
    }

    /// Mutable counterpart of `get`, used by the mutator's apply phase.
    pub fn get_mut<'v>(&self, root: &'v mut Value) -> crate::error::Result<&'v mut Value> {
        match &self.0 {
            None => Ok(root),
            Some(node) => {
                let parent_value = node.parent.get_mut(root)?;
                step_get_mut(parent_value, &node.step).ok_or_else(|| crate::error::Error::PathNotFound {
                    path: self.clone(),
                })
            }
        }
    }
}

fn step_get<'v>(value: &'v Value, step: &Step) -> Option<&'v Value> {
    match (value, step) {
        (Value::Map(m), Step::MapKey(k)) => m.get(k),
        (Value::Array(a), Step::ArrayIndex(i)) => a.get(*i),
        _ => None,
    }
}

fn step_get_mut<'v>(value: &'v mut Value, step: &Step) -> Option<&'v mut Value> {
    match (value, step) {
        (Value::Map(m), Step::MapKey(k)) => m.get_mut(k),
        (Value::Array(a), Step::ArrayIndex(i)) => a.get_mut(*i),
        _ => None,
    }
}

impl Default for PathBuf {
    fn default() -> Self {
        Self::root()
    }
}

/// Serialized as a plain JSON array of steps, not the internal cons-list —
/// the RPC wire format (`rpc::Action`) needs paths to round-trip as data.
impl Serialize for PathBuf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.steps().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PathBuf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let steps = Vec::<Step>::deserialize(deserializer)?;
        Ok(steps.into_iter().collect())
    }
}

impl fmt::Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "$");
        }
        write!(f, "$")?;
        for step in self.steps() {
            match step {
                Step::MapKey(k) => write!(f, ".{k}")?,
                Step::ArrayIndex(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

impl FromIterator<Step> for PathBuf {
    fn from_iter<T: IntoIterator<Item = Step>>(iter: T) -> Self {
        let mut path = PathBuf::root();
        for step in iter {
            path = path.push(step);
        }
        path
    }
}

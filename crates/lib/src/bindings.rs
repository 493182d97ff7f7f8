//! Variable environments threaded through interpretation.
//!
//! `Bindings` is an immutable cons-list, same shape as `minidb.Bindings`:
//! each frame holds one `(name, result)` pair and a link to its parent
//! scope. Lookup walks innermost-first, so a shadowing bind in an inner
//! scope is found before the same name further out — scopes are purely
//! additive (I4 in the spec), never mutated in place.

use std::rc::Rc;

use crate::{path::PathBuf, value::Value};

/// A `(path, value)` result: the path is `Some` when the value was sourced
/// from the tree, `None` when synthesized (e.g. the result of `Op`).
pub type Binding = (Option<PathBuf>, Value);

struct Frame {
    name: String,
    value: Binding,
    parent: Bindings,
}

/// An immutable environment mapping variable names to `Binding`s.
#[derive(Clone)]
pub struct Bindings(Option<Rc<Frame>>);

impl Bindings {
    /// The empty environment.
    pub fn empty() -> Self {
        Bindings(None)
    }

    /// Extends this environment with one more binding, shadowing any
    /// existing binding of the same name.
    pub fn extend(&self, name: impl Into<String>, value: Binding) -> Bindings {
        Bindings(Some(Rc::new(Frame {
            name: name.into(),
            value,
            parent: self.clone(),
        })))
    }

    /// Looks up a variable, searching innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        let mut frame = self.0.as_deref();
        while let Some(f) = frame {
            if f.name == name {
                return Some(&f.value);
            }
            frame = f.parent.0.as_deref();
        }
        None
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::empty()
    }
}

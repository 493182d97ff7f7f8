//! `Do`: procedural sugar for assembling a chain of binds.
//!
//! Grounded on `queries.py`'s `Do` class, minus its reflection-based
//! variable auto-naming (spec.md §9 redirects that to an explicit builder;
//! `genvar1`, `genvar2`, ... is kept only as the naming convention for
//! internally-synthesized variables, used here when a step's caller does
//! not care about the binding name).
//!
//! `build()` folds the accumulated steps right-to-left into nested
//! `Query::Bind`s: `Bind(q1, Func(v1, Bind(q2, Func(v2, ... q_last))))`.
//! The last step must not bind a variable — it is the query whose results
//! become the whole chain's results.

use crate::{
    ast::{Expr, Query, QueryFunc},
    error::{Error, Result},
};

enum Step {
    /// A bound step: `foreach`/`let`, contributing a var to later steps.
    Bound(Option<String>, Query),
    /// The final step: plain `ret`/`require`/any terminal query.
    Final(Query),
}

/// Accumulates `(var_opt, Query)` steps and folds them into one `Query` via
/// nested `Bind`s.
pub struct Do {
    steps: Vec<Step>,
    genvar_counter: usize,
    finished: bool,
}

impl Do {
    pub fn new() -> Self {
        Do {
            steps: Vec::new(),
            genvar_counter: 0,
            finished: false,
        }
    }

    fn next_genvar(&mut self) -> String {
        self.genvar_counter += 1;
        format!("genvar{}", self.genvar_counter)
    }

    /// Binds `query`'s results to `var`, making `var` visible to every
    /// subsequent step.
    pub fn foreach(mut self, var: impl Into<String>, query: Query) -> Self {
        self.steps.push(Step::Bound(Some(var.into()), query));
        self
    }

    /// Like `foreach`, but the binding name is internally synthesized
    /// (`genvar1`, `genvar2`, ...) because the caller only needs the
    /// side effect of iterating `query`, not to name its result.
    pub fn let_(mut self, query: Query) -> Self {
        let var = self.next_genvar();
        self.steps.push(Step::Bound(Some(var), query));
        self
    }

    /// Runs `query` for its side effects on fuel/ordering without binding
    /// any variable at all (`var_opt = None`).
    pub fn reteach(mut self, query: Query) -> Self {
        self.steps.push(Step::Bound(None, query));
        self
    }

    /// Terminal step: the chain's results are this query's results.
    pub fn ret(mut self, query: Query) -> Self {
        self.steps.push(Step::Final(query));
        self.finished = true;
        self
    }

    /// Filters the chain on `expr`'s truthiness without binding a variable.
    /// Not terminal: later steps still see every variable bound so far.
    pub fn require(mut self, expr: Expr) -> Self {
        self.steps.push(Step::Bound(None, Query::require(expr)));
        self
    }

    /// Folds the accumulated steps into a single `Query`. Fails with
    /// `MalformedDo` if the chain is empty or its last step is a binding
    /// step rather than a terminal one.
    pub fn build(self) -> Result<Query> {
        if self.steps.is_empty() || !matches!(self.steps.last(), Some(Step::Final(_))) {
            return Err(Error::MalformedDo);
        }

        let mut iter = self.steps.into_iter().rev();
        let mut acc = match iter.next() {
            Some(Step::Final(q)) => q,
            _ => unreachable!("checked above"),
        };
        for step in iter {
            match step {
                Step::Final(_) => return Err(Error::MalformedDo),
                Step::Bound(var, query) => {
                    acc = Query::bind(query, QueryFunc::new(var, acc));
                }
            }
        }
        Ok(acc)
    }
}

impl Default for Do {
    fn default() -> Self {
        Self::new()
    }
}

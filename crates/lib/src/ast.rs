//! The query/expression AST.
//!
//! `Query` and `Expr` are two mutually-referencing tagged enums, plain data
//! with no closures over host state (spec.md §9's explicit design choice
//! over a class hierarchy or reflection-based query functions). Validation
//! that can be done once, at construction time — currently just the `Op`
//! name whitelist — happens in the constructor so a malformed AST can never
//! reach the interpreter.

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    ops::OpName,
    path::PathBuf,
    value::Value,
};

/// A query or expression function: a variable name to bind the argument to
/// (or `None` to discard it) paired with the body. `QueryFunc`/`ValueFunc`
/// below are the two instantiations named in spec.md §3.
///
/// Both derive `Serialize`/`Deserialize` so the RPC layer can ship a whole
/// query across the wire as data, the same way `Value` does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFunc {
    pub var: Option<String>,
    pub query: Box<Query>,
}

impl QueryFunc {
    pub fn new(var: Option<impl Into<String>>, query: Query) -> Self {
        QueryFunc {
            var: var.map(Into::into),
            query: Box::new(query),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueFunc {
    pub var: Option<String>,
    pub expr: Box<Expr>,
}

impl ValueFunc {
    pub fn new(var: Option<impl Into<String>>, expr: Expr) -> Self {
        ValueFunc {
            var: var.map(Into::into),
            expr: Box::new(expr),
        }
    }
}

/// Produces a lazy sequence of `(Path?, Value)` results (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Query {
    /// Singleton of `eval(expr)`.
    Return(Expr),
    /// Singleton `(None, Bool(true))` when `eval(expr)` is truthy, empty otherwise.
    Require(Expr),
    /// List-monad bind: run `func.query` once per result of `query`, with
    /// `func.var` (if any) bound to that result; concatenate.
    Bind(Box<Query>, QueryFunc),
    /// Concatenation of sub-queries in declaration order.
    Union(Vec<Query>),
    /// Enumerates the children of `expr`'s value at `path`.
    Get(Expr, PathBuf),
}

impl Query {
    pub fn ret(expr: Expr) -> Self {
        Query::Return(expr)
    }

    pub fn require(expr: Expr) -> Self {
        Query::Require(expr)
    }

    pub fn bind(query: Query, func: QueryFunc) -> Self {
        Query::Bind(Box::new(query), func)
    }

    pub fn union(queries: Vec<Query>) -> Self {
        Query::Union(queries)
    }

    pub fn get(expr: Expr, path: PathBuf) -> Self {
        Query::Get(expr, path)
    }
}

/// Produces a single `(Path?, Value)` result (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// `(None, v)`.
    Constant(Value),
    /// Looked up in the current `Bindings`.
    Var(String),
    /// Same traversal as the query form, but returns the single located
    /// result without enumerating its children.
    Get(Box<Expr>, PathBuf),
    /// `(None, [v for (_, v) in execute(query)])`.
    AsList(Box<Query>),
    /// `(None, {last_step(p) -> v for (p, v) in execute(query)})`.
    AsDict(Box<Query>),
    /// Evaluates each argument, then applies the named whitelisted primitive.
    Op(OpName, Vec<Expr>),
    /// Short-circuits on the first truthy result; `(None, false)` if empty.
    Or(Vec<Expr>),
    /// Short-circuits on the first falsy result; `(None, true)` if empty.
    And(Vec<Expr>),
    /// Evaluates `expr`, extends bindings with `func.var`, evaluates `func.expr`.
    Apply(Box<Expr>, ValueFunc),
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn get(expr: Expr, path: PathBuf) -> Self {
        Expr::Get(Box::new(expr), path)
    }

    pub fn as_list(query: Query) -> Self {
        Expr::AsList(Box::new(query))
    }

    pub fn as_dict(query: Query) -> Self {
        Expr::AsDict(Box::new(query))
    }

    /// Validates `name` against the Op whitelist before constructing the
    /// node, so an unknown name fails here rather than mid-interpretation.
    pub fn op(name: &str, args: Vec<Expr>) -> Result<Self> {
        let name: OpName = name.parse()?;
        Ok(Expr::Op(name, args))
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    pub fn apply(expr: Expr, func: ValueFunc) -> Self {
        Expr::Apply(Box::new(expr), func)
    }
}

//! The interpreter: `execute` over `Query`, `eval` over `Expr`.
//!
//! Grounded on `queries.py`'s recursive-descent evaluator, restructured as
//! two mutually recursive Rust functions instead of a method per AST class.
//! `execute` returns a boxed, genuinely lazy iterator so a `Bind` over an
//! infinite/huge outer query only materializes as many inner results as the
//! caller actually drains (`select`/`remove`/`update` all drain fully, but
//! `Require`/short-circuiting callers do not need to).

use crate::{
    ast::{Expr, Query},
    bindings::{Binding, Bindings},
    error::{Error, Result},
    fuel::Fuel,
    ops,
    path::{PathBuf, Step},
    value::{Map, Value},
};

/// Runs a query to completion as a lazy sequence of `(Path?, Value)`.
///
/// `env` is taken by value (not `&Bindings`) so that each level of nested
/// iterators (`Bind`'s inner query in particular) can own the extended
/// environment it needs across repeated calls to `.next()`, rather than
/// borrowing a stack frame that would not outlive the returned iterator.
pub fn execute<'a>(query: &'a Query, fuel: &'a Fuel, env: Bindings) -> Box<dyn Iterator<Item = Result<Binding>> + 'a> {
    match query {
        Query::Return(expr) => Box::new(std::iter::once(eval(expr, fuel, &env))),

        Query::Require(expr) => match eval(expr, fuel, &env) {
            Ok((_, v)) if v.is_truthy() => Box::new(std::iter::once(Ok((None, Value::Bool(true))))),
            Ok(_) => Box::new(std::iter::empty()),
            Err(e) => Box::new(std::iter::once(Err(e))),
        },

        Query::Bind(inner, func) => {
            let outer = execute(inner, fuel, env.clone());
            Box::new(outer.flat_map(move |item| -> Box<dyn Iterator<Item = Result<Binding>> + 'a> {
                match item {
                    Err(e) => Box::new(std::iter::once(Err(e))),
                    Ok(binding) => {
                        if let Err(e) = fuel.tick() {
                            return Box::new(std::iter::once(Err(e)));
                        }
                        let inner_env = match &func.var {
                            Some(name) => env.extend(name.clone(), binding),
                            None => env.clone(),
                        };
                        execute(&func.query, fuel, inner_env)
                    }
                }
            }))
        }

        Query::Union(queries) => {
            let mut chained: Box<dyn Iterator<Item = Result<Binding>> + 'a> = Box::new(std::iter::empty());
            for q in queries {
                chained = Box::new(chained.chain(execute(q, fuel, env.clone())));
            }
            Box::new(chained.map(move |item| match item {
                Ok(binding) => {
                    fuel.tick()?;
                    Ok(binding)
                }
                Err(e) => Err(e),
            }))
        }

        Query::Get(expr, path) => {
            let (expr_path, expr_value) = match eval(expr, fuel, &env) {
                Ok(pv) => pv,
                Err(e) => return Box::new(std::iter::once(Err(e))),
            };
            let basepath = expr_path.as_ref().map(|p| p.concat(path));
            let located = match path.get(&expr_value) {
                Ok(v) => v.clone(),
                Err(e) => return Box::new(std::iter::once(Err(e))),
            };
            match located {
                Value::Map(map) => {
                    let mut out = Vec::with_capacity(map.len());
                    for (k, v) in map.iter() {
                        if let Err(e) = fuel.tick() {
                            out.push(Err(e));
                            break;
                        }
                        let p = basepath.as_ref().map(|bp| bp.push(k));
                        out.push(Ok((p, v.clone())));
                    }
                    Box::new(out.into_iter())
                }
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for (i, v) in items.into_iter().enumerate() {
                        if let Err(e) = fuel.tick() {
                            out.push(Err(e));
                            break;
                        }
                        let p = basepath.as_ref().map(|bp| bp.push(i));
                        out.push(Ok((p, v)));
                    }
                    Box::new(out.into_iter())
                }
                _ => Box::new(std::iter::once(Err(Error::NotIterable {
                    path: basepath.unwrap_or_else(|| path.clone()),
                }))),
            }
        }
    }
}

/// Evaluates a single expression, strictly.
pub fn eval(expr: &Expr, fuel: &Fuel, env: &Bindings) -> Result<Binding> {
    match expr {
        Expr::Constant(v) => Ok((None, v.clone())),

        Expr::Var(name) => env.lookup(name).cloned().ok_or_else(|| Error::OpError {
            op: "var",
            reason: format!("unbound variable {name:?}"),
        }),

        Expr::Get(inner, path) => {
            let (p, v) = eval(inner, fuel, env)?;
            let located = path.get(&v)?.clone();
            let basepath = p.map(|p| p.concat(path));
            Ok((basepath, located))
        }

        Expr::AsList(query) => {
            let mut out = Vec::new();
            for item in execute(query, fuel, env.clone()) {
                let (_, v) = item?;
                fuel.tick()?;
                out.push(v);
            }
            Ok((None, Value::Array(out)))
        }

        Expr::AsDict(query) => {
            let mut map = Map::new();
            for item in execute(query, fuel, env.clone()) {
                let (p, v) = item?;
                fuel.tick()?;
                // `p = None` contributes the key `Null`; since `Map` is
                // string-keyed (the tree's maps serialize as JSON objects),
                // that is represented as the literal string "null" rather
                // than admitted as a non-string key.
                let key = match p.as_ref().and_then(PathBuf::last_step) {
                    Some(Step::MapKey(k)) => k.clone(),
                    Some(Step::ArrayIndex(i)) => i.to_string(),
                    None => "null".to_string(),
                };
                map.insert(key, v);
            }
            Ok((None, Value::Map(map)))
        }

        Expr::Op(name, args) => {
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                let (_, v) = eval(a, fuel, env)?;
                values.push(v);
            }
            let result = ops::apply(*name, &values)?;
            Ok((None, result))
        }

        Expr::Or(exprs) => {
            if exprs.is_empty() {
                return Ok((None, Value::Bool(false)));
            }
            let mut last = None;
            for e in exprs {
                let result = eval(e, fuel, env)?;
                if result.1.is_truthy() {
                    return Ok(result);
                }
                last = Some(result);
            }
            Ok(last.expect("exprs is non-empty"))
        }

        Expr::And(exprs) => {
            if exprs.is_empty() {
                return Ok((None, Value::Bool(true)));
            }
            let mut last = None;
            for e in exprs {
                let result = eval(e, fuel, env)?;
                if !result.1.is_truthy() {
                    return Ok(result);
                }
                last = Some(result);
            }
            Ok(last.expect("exprs is non-empty"))
        }

        Expr::Apply(inner, func) => {
            fuel.tick()?;
            let binding = eval(inner, fuel, env)?;
            let inner_env = match &func.var {
                Some(name) => env.extend(name.clone(), binding),
                None => env.clone(),
            };
            eval(&func.expr, fuel, &inner_env)
        }
    }
}

//! The whitelisted set of primitive operations usable inside `Op`.
//!
//! Grounded directly on `util.py`'s `allowed_operations` table: the name
//! list, arities, and "comparisons / boolean / arithmetic / membership /
//! coercions / reductions" grouping all come from that table. Construction
//! validates the name against the whitelist so a malformed `Op` can never
//! enter the AST (`UnknownOp` fails immediately, never during
//! interpretation).

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::{
    error::{Error, Result},
    value::Value,
};

/// One of the whitelisted primitive operation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpName {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    Not,
    Truth,
    Abs,
    Add,
    Sub,
    Neg,
    Mul,
    Div,
    Mod,
    Pow,
    Contains,
    Int,
    Float,
    Str,
    Any,
    All,
}

impl OpName {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpName::Lt => "lt",
            OpName::Le => "le",
            OpName::Eq => "eq",
            OpName::Ne => "ne",
            OpName::Ge => "ge",
            OpName::Gt => "gt",
            OpName::Not => "not",
            OpName::Truth => "truth",
            OpName::Abs => "abs",
            OpName::Add => "add",
            OpName::Sub => "sub",
            OpName::Neg => "neg",
            OpName::Mul => "mul",
            OpName::Div => "div",
            OpName::Mod => "mod",
            OpName::Pow => "pow",
            OpName::Contains => "contains",
            OpName::Int => "int",
            OpName::Float => "float",
            OpName::Str => "str",
            OpName::Any => "any",
            OpName::All => "all",
        }
    }
}

impl FromStr for OpName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "lt" => OpName::Lt,
            "le" => OpName::Le,
            "eq" => OpName::Eq,
            "ne" => OpName::Ne,
            "ge" => OpName::Ge,
            "gt" => OpName::Gt,
            "not" => OpName::Not,
            "truth" => OpName::Truth,
            "abs" => OpName::Abs,
            "add" => OpName::Add,
            "sub" => OpName::Sub,
            "neg" => OpName::Neg,
            "mul" => OpName::Mul,
            "div" => OpName::Div,
            "mod" => OpName::Mod,
            "pow" => OpName::Pow,
            "contains" => OpName::Contains,
            "int" => OpName::Int,
            "float" => OpName::Float,
            "str" => OpName::Str,
            "any" => OpName::Any,
            "all" => OpName::All,
            other => return Err(Error::UnknownOp(other.to_string())),
        })
    }
}

/// Serialized as its whitelisted name, same as it appears in `Expr::op`.
impl Serialize for OpName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OpName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn numeric_cmp(op: OpName, a: &Value, b: &Value) -> Result<std::cmp::Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        _ => {
            let (x, y) = (as_f64(a), as_f64(b));
            match (x, y) {
                (Some(x), Some(y)) => x.partial_cmp(&y).ok_or_else(|| Error::OpError {
                    op: op.as_str(),
                    reason: "NaN is not ordered".to_string(),
                }),
                _ => Err(Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot compare {} and {}", a.type_name(), b.type_name()),
                }),
            }
        }
    }
}

fn arith(op: OpName, a: &Value, b: &Value, f: impl Fn(f64, f64) -> f64, i: impl Fn(i64, i64) -> Option<i64>) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => i(*x, *y).map(Value::Int).ok_or_else(|| Error::OpError {
            op: op.as_str(),
            reason: "integer overflow or division by zero".to_string(),
        }),
        _ => {
            let (x, y) = (as_f64(a), as_f64(b));
            match (x, y) {
                (Some(x), Some(y)) => Ok(Value::Float(f(x, y))),
                _ => Err(Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot apply to {} and {}", a.type_name(), b.type_name()),
                }),
            }
        }
    }
}

fn to_display_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Applies `op` to already-evaluated arguments (the path component of each
/// argument has already been discarded by `eval`, per spec.md §4.2's
/// "`Op`'s second-operand-path is discarded" rule).
pub fn apply(op: OpName, args: &[Value]) -> Result<Value> {
    let arity_error = |want: usize| Error::OpError {
        op: op.as_str(),
        reason: format!("expected {want} argument(s), got {}", args.len()),
    };

    match op {
        OpName::Lt | OpName::Le | OpName::Eq | OpName::Ne | OpName::Ge | OpName::Gt => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            if matches!(op, OpName::Eq | OpName::Ne) {
                let eq = args[0] == args[1];
                return Ok(Value::Bool(if matches!(op, OpName::Eq) { eq } else { !eq }));
            }
            let ord = numeric_cmp(op, &args[0], &args[1])?;
            use std::cmp::Ordering::*;
            let result = match (op, ord) {
                (OpName::Lt, Less) => true,
                (OpName::Le, Less | Equal) => true,
                (OpName::Ge, Greater | Equal) => true,
                (OpName::Gt, Greater) => true,
                _ => false,
            };
            Ok(Value::Bool(result))
        }
        OpName::Not => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(Value::Bool(!args[0].is_truthy()))
        }
        OpName::Truth => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(Value::Bool(args[0].is_truthy()))
        }
        OpName::Abs => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            match &args[0] {
                Value::Int(n) => Ok(Value::Int(n.abs())),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => Err(Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot take abs of {}", other.type_name()),
                }),
            }
        }
        OpName::Neg => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            match &args[0] {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot negate {}", other.type_name()),
                }),
            }
        }
        OpName::Add => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            if let (Value::Str(a), Value::Str(b)) = (&args[0], &args[1]) {
                return Ok(Value::Str(format!("{a}{b}")));
            }
            arith(op, &args[0], &args[1], |a, b| a + b, |a, b| a.checked_add(b))
        }
        OpName::Sub => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            arith(op, &args[0], &args[1], |a, b| a - b, |a, b| a.checked_sub(b))
        }
        OpName::Mul => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            arith(op, &args[0], &args[1], |a, b| a * b, |a, b| a.checked_mul(b))
        }
        OpName::Div => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            arith(
                op,
                &args[0],
                &args[1],
                |a, b| a / b,
                |a, b| if b == 0 { None } else { a.checked_div(b) },
            )
        }
        OpName::Mod => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            // Python's `%`: floor-division modulo, result takes the sign of
            // the divisor (not `rem_euclid`, which is always non-negative).
            arith(
                op,
                &args[0],
                &args[1],
                |a, b| {
                    let r = a % b;
                    if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
                },
                |a, b| {
                    if b == 0 {
                        return None;
                    }
                    let r = a % b;
                    Some(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
                },
            )
        }
        OpName::Pow => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            match (&args[0], &args[1]) {
                (Value::Int(base), Value::Int(exp)) if *exp >= 0 => {
                    Ok(Value::Int(base.pow(*exp as u32)))
                }
                _ => {
                    let (base, exp) = (as_f64(&args[0]), as_f64(&args[1]));
                    match (base, exp) {
                        (Some(base), Some(exp)) => Ok(Value::Float(base.powf(exp))),
                        _ => Err(Error::OpError {
                            op: op.as_str(),
                            reason: "pow requires numeric operands".to_string(),
                        }),
                    }
                }
            }
        }
        OpName::Contains => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            let result = match &args[0] {
                Value::Array(items) => items.contains(&args[1]),
                Value::Map(map) => match &args[1] {
                    Value::Str(key) => map.contains_key(key),
                    _ => false,
                },
                Value::Str(s) => match &args[1] {
                    Value::Str(needle) => s.contains(needle.as_str()),
                    _ => false,
                },
                other => {
                    return Err(Error::OpError {
                        op: op.as_str(),
                        reason: format!("{} is not a container", other.type_name()),
                    });
                }
            };
            Ok(Value::Bool(result))
        }
        OpName::Int => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            match &args[0] {
                Value::Int(n) => Ok(Value::Int(*n)),
                Value::Float(f) => Ok(Value::Int(*f as i64)),
                Value::Bool(b) => Ok(Value::Int(*b as i64)),
                Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot parse {s:?} as int"),
                }),
                other => Err(Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot convert {} to int", other.type_name()),
                }),
            }
        }
        OpName::Float => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            match &args[0] {
                Value::Int(n) => Ok(Value::Float(*n as f64)),
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot parse {s:?} as float"),
                }),
                other => Err(Error::OpError {
                    op: op.as_str(),
                    reason: format!("cannot convert {} to float", other.type_name()),
                }),
            }
        }
        OpName::Str => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(Value::Str(to_display_string(&args[0])))
        }
        OpName::Any | OpName::All => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            let items = args[0].as_array().ok_or_else(|| Error::OpError {
                op: op.as_str(),
                reason: format!("expected an array, got {}", args[0].type_name()),
            })?;
            let result = if matches!(op, OpName::Any) {
                items.iter().any(Value::is_truthy)
            } else {
                items.iter().all(Value::is_truthy)
            };
            Ok(Value::Bool(result))
        }
    }
}

//! Expression evaluation over JSON records

use super::parser::{number, BinaryOp, Expr, UnaryOp};
use crate::record::display_value;
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub fn evaluate(expr: &Expr, record: &Value) -> Result<Value, String> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Field(name) => Ok(record.get(name).cloned().unwrap_or(Value::Null)),
        Expr::Member(target, name) => {
            let target = evaluate(target, record)?;
            Ok(member(&target, name))
        }
        Expr::Index(target, index) => {
            let target = evaluate(target, record)?;
            let index = evaluate(index, record)?;
            Ok(match &index {
                Value::String(key) => member(&target, key),
                Value::Number(n) => n
                    .as_u64()
                    .and_then(|i| target.get(i as usize))
                    .cloned()
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            })
        }
        Expr::Array(items) => items
            .iter()
            .map(|item| evaluate(item, record))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Object(entries) => {
            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(key.clone(), evaluate(value, record)?);
            }
            Ok(Value::Object(object))
        }
        Expr::Unary(op, operand) => {
            let value = evaluate(operand, record)?;
            match (op, value) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Not, Value::Null) => Ok(Value::Bool(true)),
                (UnaryOp::Neg, Value::Number(n)) => Ok(number(-as_f64(&n))),
                (UnaryOp::Not, other) => Err(format!("cannot negate {other}")),
                (UnaryOp::Neg, other) => Err(format!("cannot apply '-' to {other}")),
            }
        }
        Expr::Regex {
            subject,
            regex,
            negate,
        } => {
            let subject = evaluate(subject, record)?;
            Ok(Value::Bool(match subject {
                Value::String(s) => regex.is_match(&s) != *negate,
                _ => false,
            }))
        }
        Expr::Binary(BinaryOp::And, left, right) => {
            if !truthy(&evaluate(left, record)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&evaluate(right, record)?)?))
        }
        Expr::Binary(BinaryOp::Or, left, right) => {
            if truthy(&evaluate(left, record)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&evaluate(right, record)?)?))
        }
        Expr::Binary(op, left, right) => {
            let left = evaluate(left, record)?;
            let right = evaluate(right, record)?;
            binary(*op, &left, &right)
        }
    }
}

fn member(target: &Value, key: &str) -> Value {
    match target {
        Value::Object(map) => map.get(key).cloned().unwrap_or(Value::Null),
        Value::Array(items) => key
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn truthy(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(format!("expected a boolean, got {other}")),
    }
}

fn as_f64(n: &serde_json::Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => as_f64(a) == as_f64(b),
        _ => left == right,
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => as_f64(a).partial_cmp(&as_f64(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, String> {
    let compare = |accept: fn(Ordering) -> bool| {
        Value::Bool(ordering(left, right).is_some_and(accept))
    };

    let result = match op {
        BinaryOp::Eq => Value::Bool(loose_eq(left, right)),
        BinaryOp::Ne => Value::Bool(!loose_eq(left, right)),
        BinaryOp::Lt => compare(|o| o == Ordering::Less),
        BinaryOp::Le => compare(|o| o != Ordering::Greater),
        BinaryOp::Gt => compare(|o| o == Ordering::Greater),
        BinaryOp::Ge => compare(|o| o != Ordering::Less),
        BinaryOp::Match | BinaryOp::NotMatch => match (left, right) {
            (Value::String(subject), Value::String(pattern)) => {
                let regex = regex::Regex::new(pattern)
                    .map_err(|e| format!("invalid regular expression {pattern:?}: {e}"))?;
                Value::Bool(regex.is_match(subject) == (op == BinaryOp::Match))
            }
            _ => Value::Bool(false),
        },
        BinaryOp::In => Value::Bool(match right {
            Value::Array(items) => items.iter().any(|item| loose_eq(left, item)),
            Value::Object(map) => left.as_str().is_some_and(|key| map.contains_key(key)),
            _ => false,
        }),
        BinaryOp::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => number(as_f64(a) + as_f64(b)),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", display_value(left), display_value(right)))
            }
            (Value::Array(a), Value::Array(b)) => {
                Value::Array(a.iter().chain(b.iter()).cloned().collect())
            }
            _ => return Err(format!("cannot add {left} and {right}")),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (Value::Number(a), Value::Number(b)) = (left, right) else {
                return Err(format!("arithmetic on non-numbers {left} and {right}"));
            };
            let (a, b) = (as_f64(a), as_f64(b));
            if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b == 0.0 {
                return Err("division by zero".into());
            }
            number(match op {
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            })
        }
        BinaryOp::And => Value::Bool(truthy(left)? && truthy(right)?),
        BinaryOp::Or => Value::Bool(truthy(left)? || truthy(right)?),
    };

    Ok(result)
}

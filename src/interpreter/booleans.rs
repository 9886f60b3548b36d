use std::cmp::Ordering;

use crate::{expressions::BinaryOp, row::Value, DBError::InterpretingError, DBResult};

pub fn comparison_impl(op: BinaryOp, left: Value, right: Value) -> DBResult<Value> {
    if left == Value::Null || right == Value::Null {
        return Ok(Value::Null);
    }
    let ordering = cmp_impl(&left, &right)?;
    let result = match op {
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Gte => ordering.is_ge(),
        BinaryOp::Eq => ordering.is_eq(),
        BinaryOp::NotEq => ordering.is_ne(),
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Lte => ordering.is_le(),
        _ => {
            return Err(InterpretingError(format!(
                "{op:?} is not a comparison operator"
            )))
        }
    };
    Ok(Value::Boolean(result))
}

pub fn cmp_impl(left: &Value, right: &Value) -> DBResult<Ordering> {
    let ordering = match (left, right) {
        (Value::Int64(l), Value::Int64(r)) => Some(l.cmp(r)),
        (Value::Float64(l), Value::Float64(r)) => l.partial_cmp(r),
        (Value::Int64(l), Value::Float64(r)) => (*l as f64).partial_cmp(r),
        (Value::Float64(l), Value::Int64(r)) => l.partial_cmp(&(*r as f64)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        (Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
        (left, right) => {
            return Err(InterpretingError(format!(
                "can't compare {left:?} and {right:?}"
            )))
        }
    };
    ordering.ok_or_else(|| InterpretingError(format!("can't compare {left:?} and {right:?}")))
}

/// Three-valued AND.
pub fn and_impl(left: Value, right: Value) -> DBResult<Value> {
    match (left, right) {
        (Value::Boolean(false), _) | (_, Value::Boolean(false)) => Ok(Value::Boolean(false)),
        (Value::Boolean(true), Value::Boolean(true)) => Ok(Value::Boolean(true)),
        (Value::Null, Value::Boolean(_) | Value::Null)
        | (Value::Boolean(_), Value::Null) => Ok(Value::Null),
        (left, right) => Err(InterpretingError(format!(
            "{:?} operator not implemented for {:?} and {:?}",
            BinaryOp::And,
            left,
            right
        ))),
    }
}

/// Three-valued OR.
pub fn or_impl(left: Value, right: Value) -> DBResult<Value> {
    match (left, right) {
        (Value::Boolean(true), _) | (_, Value::Boolean(true)) => Ok(Value::Boolean(true)),
        (Value::Boolean(false), Value::Boolean(false)) => Ok(Value::Boolean(false)),
        (Value::Null, Value::Boolean(_) | Value::Null)
        | (Value::Boolean(_), Value::Null) => Ok(Value::Null),
        (left, right) => Err(InterpretingError(format!(
            "{:?} operator not implemented for {:?} and {:?}",
            BinaryOp::Or,
            left,
            right
        ))),
    }
}

pub fn not_impl(input: Value) -> DBResult<Value> {
    match input {
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        Value::Null => Ok(Value::Null),
        other => Err(InterpretingError(format!(
            "NOT operator not implemented for {other:?}"
        ))),
    }
}

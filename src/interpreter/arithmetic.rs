use crate::{expressions::BinaryOp, row::Value, DBError::InterpretingError, DBResult};

pub fn arithmetic_impl(op: BinaryOp, left: Value, right: Value) -> DBResult<Value> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int64(l), Value::Int64(r)) => int_impl(op, l, r),
        (Value::Float64(l), Value::Float64(r)) => float_impl(op, l, r),
        (Value::Int64(l), Value::Float64(r)) => float_impl(op, l as f64, r),
        (Value::Float64(l), Value::Int64(r)) => float_impl(op, l, r as f64),
        (left, right) => Err(InterpretingError(format!(
            "{op:?} operator not implemented for {left:?} and {right:?}"
        ))),
    }
}

fn int_impl(op: BinaryOp, l: i64, r: i64) -> DBResult<Value> {
    let result = match op {
        BinaryOp::Plus => l.checked_add(r),
        BinaryOp::Minus => l.checked_sub(r),
        BinaryOp::Multiply => l.checked_mul(r),
        BinaryOp::Divide if r == 0 => return Ok(Value::Null),
        BinaryOp::Divide => l.checked_div(r),
        _ => {
            return Err(InterpretingError(format!(
                "{op:?} is not an arithmetic operator"
            )))
        }
    };
    result
        .map(Value::Int64)
        .ok_or_else(|| InterpretingError(format!("integer overflow in {l} {op} {r}")))
}

fn float_impl(op: BinaryOp, l: f64, r: f64) -> DBResult<Value> {
    match op {
        BinaryOp::Plus => Ok(Value::Float64(l + r)),
        BinaryOp::Minus => Ok(Value::Float64(l - r)),
        BinaryOp::Multiply => Ok(Value::Float64(l * r)),
        BinaryOp::Divide if r == 0.0 => Ok(Value::Null),
        BinaryOp::Divide => Ok(Value::Float64(l / r)),
        _ => Err(InterpretingError(format!(
            "{op:?} is not an arithmetic operator"
        ))),
    }
}

pub fn negative_impl(input: Value) -> DBResult<Value> {
    match input {
        Value::Null => Ok(Value::Null),
        Value::Int64(i) => i
            .checked_neg()
            .map(Value::Int64)
            .ok_or_else(|| InterpretingError(format!("integer overflow in -{i}"))),
        Value::Float64(f) => Ok(Value::Float64(-f)),
        other => Err(InterpretingError(format!(
            "negation not implemented for {other:?}"
        ))),
    }
}

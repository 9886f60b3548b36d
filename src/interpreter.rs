mod arithmetic;
mod booleans;

use crate::{
    expressions::{BinaryOp, Expression, UnaryOp},
    row::{Row, Value},
    DBError, DBResult,
};

use self::{
    arithmetic::{arithmetic_impl, negative_impl},
    booleans::{and_impl, comparison_impl, not_impl, or_impl},
};

pub struct Interpreter {}

impl Interpreter {
    pub fn eval(expr: &Expression, row: &Row) -> DBResult<Value> {
        match expr {
            Expression::Literal(l) => Ok(l.clone()),
            Expression::UnresolvedColumn { .. } => Err(DBError::NotResolved(format!(
                "trying to evaluate unresolved column {expr}"
            ))),
            Expression::Column { index, .. } => row.get_field(*index),
            Expression::BinaryOp { op, left, right } => {
                let (left, right) = (Self::eval(left, row)?, Self::eval(right, row)?);
                match op {
                    BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Divide | BinaryOp::Multiply => {
                        arithmetic_impl(*op, left, right)
                    }
                    BinaryOp::Gt
                    | BinaryOp::Gte
                    | BinaryOp::Eq
                    | BinaryOp::NotEq
                    | BinaryOp::Lt
                    | BinaryOp::Lte => comparison_impl(*op, left, right),
                    BinaryOp::And => and_impl(left, right),
                    BinaryOp::Or => or_impl(left, right),
                }
            }
            Expression::UnaryOp { op, input } => match op {
                UnaryOp::Not => not_impl(Self::eval(input, row)?),
                UnaryOp::Neg => negative_impl(Self::eval(input, row)?),
            },
            Expression::Alias { child, .. } => Self::eval(child, row),
        }
    }
}

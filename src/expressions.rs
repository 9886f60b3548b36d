use std::fmt::Display;

use crate::data_types::DataType;
use crate::row::Value;
use crate::DBResult;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    UnresolvedColumn {
        table: Option<String>,
        name: String,
    },
    Column {
        name: String,
        index: usize,
        data_type: DataType,
    },
    Alias {
        alias: String,
        child: Box<Expression>,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOp,
        input: Box<Expression>,
    },
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(l) => l.fmt(f),
            Expression::UnresolvedColumn {
                table: Some(table),
                name,
            } => write!(f, "{table}.{name}"),
            Expression::UnresolvedColumn { table: None, name } => name.fmt(f),
            Expression::Column { name, .. } => name.fmt(f),
            Expression::Alias { alias, .. } => alias.fmt(f),
            Expression::BinaryOp { op, left, right } => write!(f, "{left} {op} {right}"),
            Expression::UnaryOp { op, input } => write!(f, "{op} {input}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Divide,
    Multiply,
    Gt,
    Gte,
    Eq,
    NotEq,
    Lt,
    Lte,
    And,
    Or,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Plus => "+".fmt(f),
            BinaryOp::Minus => "-".fmt(f),
            BinaryOp::Divide => "/".fmt(f),
            BinaryOp::Multiply => "*".fmt(f),
            BinaryOp::Gt => ">".fmt(f),
            BinaryOp::Gte => ">=".fmt(f),
            BinaryOp::Eq => "=".fmt(f),
            BinaryOp::NotEq => "!=".fmt(f),
            BinaryOp::Lt => "<".fmt(f),
            BinaryOp::Lte => "<=".fmt(f),
            BinaryOp::And => "AND".fmt(f),
            BinaryOp::Or => "OR".fmt(f),
        }
    }
}

impl BinaryOp {
    pub fn is_boolean_op(&self) -> bool {
        matches!(
            self,
            BinaryOp::Gt
                | BinaryOp::Gte
                | BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::Lte
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => "NOT".fmt(f),
            UnaryOp::Neg => "-".fmt(f),
        }
    }
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::UnresolvedColumn {
            table: None,
            name: name.into(),
        }
    }

    pub fn literal(value: Value) -> Self {
        Expression::Literal(value)
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// True once every column reference is bound to an input position.
    pub fn resolved(&self) -> bool {
        match self {
            Expression::Literal(_) | Expression::Column { .. } => true,
            Expression::UnresolvedColumn { .. } => false,
            Expression::Alias { child, .. } => child.resolved(),
            Expression::BinaryOp { left, right, .. } => left.resolved() && right.resolved(),
            Expression::UnaryOp { input, .. } => input.resolved(),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal(l) => l.data_type(),
            Expression::UnresolvedColumn { .. } => DataType::Null,
            Expression::Column { data_type, .. } => data_type.clone(),
            Expression::BinaryOp { op, left, right } => match op {
                op if op.is_boolean_op() => DataType::Boolean,
                _ if left.data_type() == DataType::Float64
                    || right.data_type() == DataType::Float64 =>
                {
                    DataType::Float64
                }
                _ => left.data_type(),
            },
            Expression::UnaryOp {
                op: UnaryOp::Not, ..
            } => DataType::Boolean,
            Expression::UnaryOp { input, .. } => input.data_type(),
            Expression::Alias { child, .. } => child.data_type(),
        }
    }

    /// Rewrites the expression children first, then the expression itself.
    /// Returns `None` when nothing changed.
    pub fn transform_bottom_up<F>(&self, f: &mut F) -> DBResult<Option<Expression>>
    where
        F: FnMut(&Expression) -> DBResult<Option<Expression>>,
    {
        let rebuilt = match self {
            Expression::Alias { alias, child } => child
                .transform_bottom_up(f)?
                .map(|child| Expression::Alias {
                    alias: alias.clone(),
                    child: Box::new(child),
                }),
            Expression::BinaryOp { op, left, right } => {
                let new_left = left.transform_bottom_up(f)?;
                let new_right = right.transform_bottom_up(f)?;
                if new_left.is_none() && new_right.is_none() {
                    None
                } else {
                    Some(Expression::BinaryOp {
                        op: *op,
                        left: Box::new(new_left.unwrap_or_else(|| *left.clone())),
                        right: Box::new(new_right.unwrap_or_else(|| *right.clone())),
                    })
                }
            }
            Expression::UnaryOp { op, input } => {
                input
                    .transform_bottom_up(f)?
                    .map(|input| Expression::UnaryOp {
                        op: *op,
                        input: Box::new(input),
                    })
            }
            Expression::Literal(_)
            | Expression::UnresolvedColumn { .. }
            | Expression::Column { .. } => None,
        };
        match rebuilt {
            Some(expr) => Ok(Some(f(&expr)?.unwrap_or(expr))),
            None => f(self),
        }
    }
}

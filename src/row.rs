use std::fmt::Display;

use serde::Serialize;

use crate::data_types::DataType;
use crate::{DBError, DBResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Boolean(_) => DataType::Boolean,
            Value::Int64(_) => DataType::Int64,
            Value::Float64(_) => DataType::Float64,
            Value::String(_) => DataType::String,
        }
    }

    /// Null counts as false so filters drop rows with unknown predicates.
    pub fn as_bool(&self) -> DBResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Null => Ok(false),
            other => Err(DBError::InterpretingError(format!(
                "{other:?} is not a boolean"
            ))),
        }
    }

    /// Coerce into the column type of a table when inserting.
    pub fn cast_to(self, data_type: &DataType) -> DBResult<Value> {
        match (self, data_type) {
            (Value::Null, _) => Ok(Value::Null),
            (v, t) if v.data_type() == *t => Ok(v),
            (Value::Int64(i), DataType::Float64) => Ok(Value::Float64(i as f64)),
            (Value::Int64(i), DataType::String) => Ok(Value::String(i.to_string())),
            (Value::Float64(f), DataType::String) => Ok(Value::String(f.to_string())),
            (Value::Boolean(b), DataType::Int64) => Ok(Value::Int64(b as i64)),
            (Value::String(s), DataType::Int64) => s
                .parse()
                .map(Value::Int64)
                .map_err(|_| DBError::InterpretingError(format!("can't cast '{s}' to Int64"))),
            (Value::String(s), DataType::Float64) => s
                .parse()
                .map(Value::Float64)
                .map_err(|_| DBError::InterpretingError(format!("can't cast '{s}' to Float64"))),
            (v, t) => Err(DBError::InterpretingError(format!("can't cast {v:?} to {t}"))),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => "NULL".fmt(f),
            Value::Boolean(b) => b.fmt(f),
            Value::Int64(i) => i.fmt(f),
            Value::Float64(v) => v.fmt(f),
            Value::String(s) => write!(f, "'{s}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: Vec<Value>,
}

impl Row {
    pub fn new(fields: Vec<Value>) -> Self {
        Row { fields }
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn get_field(&self, index: usize) -> DBResult<Value> {
        match self.fields.get(index) {
            None => Err(DBError::Unknown(format!("field index {index} out of bound"))),
            Some(value) => Ok(value.clone()),
        }
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Value> {
        self.fields
    }

    pub(crate) fn concat(left: &Row, right: &Row) -> Row {
        let mut fields = Vec::with_capacity(left.num_fields() + right.num_fields());
        fields.extend_from_slice(&left.fields);
        fields.extend_from_slice(&right.fields);
        Row { fields }
    }
}

use std::fmt::Display;

use serde::Serialize;

use crate::{DBError, DBResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DataType {
    Boolean,
    Int64,
    Float64,
    String,
    Null,
}

impl DataType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl TryFrom<&sqlparser::ast::DataType> for DataType {
    type Error = DBError;

    fn try_from(dt: &sqlparser::ast::DataType) -> DBResult<Self> {
        use sqlparser::ast::DataType as Ast;
        match dt {
            Ast::Boolean => Ok(DataType::Boolean),
            Ast::TinyInt(_)
            | Ast::UnsignedTinyInt(_)
            | Ast::SmallInt(_)
            | Ast::UnsignedSmallInt(_)
            | Ast::MediumInt(_)
            | Ast::UnsignedMediumInt(_)
            | Ast::Int(_)
            | Ast::Integer(_)
            | Ast::UnsignedInt(_)
            | Ast::UnsignedInteger(_)
            | Ast::BigInt(_)
            | Ast::UnsignedBigInt(_) => Ok(DataType::Int64),
            Ast::Float(_) | Ast::Real | Ast::Double | Ast::DoublePrecision => {
                Ok(DataType::Float64)
            }
            Ast::Char(_)
            | Ast::Character(_)
            | Ast::CharVarying(_)
            | Ast::CharacterVarying(_)
            | Ast::Varchar(_)
            | Ast::Nvarchar(_)
            | Ast::Text
            | Ast::String => Ok(DataType::String),
            other => Err(DBError::NotSupported(format!("data type {other}"))),
        }
    }
}

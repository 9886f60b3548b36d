use serde::Serialize;

use crate::{data_types::DataType, DBError, DBResult};

/// Ordered list of the columns a plan node produces.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    pub fn empty() -> Self {
        Schema::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name, optionally qualified by its source table.
    /// Column names compare case-insensitively. Fails with `AmbiguousColumn`
    /// when more than one column matches.
    pub fn index_of(&self, source: Option<&str>, name: &str) -> DBResult<Option<usize>> {
        let mut matches = self.columns.iter().enumerate().filter(|(_, c)| {
            c.name.eq_ignore_ascii_case(name)
                && source.map_or(true, |s| c.source.eq_ignore_ascii_case(s))
        });
        let first = matches.next().map(|(idx, _)| idx);
        if matches.next().is_some() {
            let qualified = match source {
                Some(s) => format!("{s}.{name}"),
                None => name.to_string(),
            };
            return Err(DBError::AmbiguousColumn(qualified));
        }
        Ok(first)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn concat(left: &Schema, right: &Schema) -> Schema {
        let columns = left
            .columns
            .iter()
            .chain(right.columns.iter())
            .cloned()
            .collect();
        Schema { columns }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    data_type: DataType,
    /// Table the column comes from, empty for computed columns.
    source: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            source: String::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn source(&self) -> &str {
        self.source.as_ref()
    }
}

use std::sync::RwLock;

use crate::{row::Row, schema::Schema, DBError, DBResult};

/// In-memory table owned by a database handle.
#[derive(Debug)]
pub struct MemTable {
    name: String,
    schema: Schema,
    data: RwLock<Vec<Row>>,
}

impl MemTable {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        MemTable {
            name: name.into(),
            schema,
            data: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn insert_data(&self, rows: Vec<Row>) -> DBResult<usize> {
        let mut data = self.data.write().map_err(|_| {
            DBError::Unknown(format!("Access write lock of table {} failed!", self.name))
        })?;
        let inserted = rows.len();
        data.extend(rows);
        Ok(inserted)
    }

    pub fn num_rows(&self) -> DBResult<usize> {
        self.with_data(|rows| rows.len())
    }

    /// Row at `index`, or `None` once past the end. The lock is only held
    /// for the single lookup.
    pub fn row_at(&self, index: usize) -> DBResult<Option<Row>> {
        self.with_data(|rows| rows.get(index).cloned())
    }

    fn with_data<T>(&self, f: impl FnOnce(&Vec<Row>) -> T) -> DBResult<T> {
        let data = self.data.read().map_err(|_| {
            DBError::Unknown(format!("Access read lock of table {} failed!", self.name))
        })?;
        Ok(f(&data))
    }
}

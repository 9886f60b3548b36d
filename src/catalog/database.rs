use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{schema::Schema, tables::MemTable, DBError, DBResult};

/// A database handle registered in the catalog. Table names are matched
/// case-insensitively.
#[derive(Debug)]
pub struct Database {
    name: String,
    collation: Option<String>,
    charset: Option<String>,
    tables: RwLock<HashMap<String, Arc<MemTable>>>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, None, None)
    }

    pub fn with_options(
        name: impl Into<String>,
        collation: Option<String>,
        charset: Option<String>,
    ) -> Self {
        Database {
            name: name.into(),
            collation,
            charset,
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn has_table(&self, name: &str) -> DBResult<bool> {
        let tables = self.read_tables()?;
        Ok(tables.contains_key(&name.to_lowercase()))
    }

    /// Fails with `TableAlreadyExists` when the name is taken.
    pub fn create_table(&self, name: &str, schema: Schema) -> DBResult<Arc<MemTable>> {
        let mut tables = self.tables.write().map_err(|_| {
            DBError::Unknown(format!("Access write lock of database {} failed!", self.name))
        })?;
        let key = name.to_lowercase();
        if tables.contains_key(&key) {
            return Err(DBError::TableAlreadyExists(name.to_string()));
        }
        let table = Arc::new(MemTable::new(name, schema));
        tables.insert(key, Arc::clone(&table));
        log::debug!("created table {}.{}", self.name, name);
        Ok(table)
    }

    pub fn try_get_table(&self, name: &str) -> DBResult<Arc<MemTable>> {
        let tables = self.read_tables()?;
        tables
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| DBError::TableNotFound(name.to_string()))
    }

    pub fn table_names(&self) -> DBResult<Vec<String>> {
        let tables = self.read_tables()?;
        let mut names: Vec<String> =
            tables.values().map(|t| t.name().to_string()).collect();
        names.sort();
        Ok(names)
    }

    fn read_tables(
        &self,
    ) -> DBResult<std::sync::RwLockReadGuard<'_, HashMap<String, Arc<MemTable>>>> {
        self.tables.read().map_err(|_| {
            DBError::Unknown(format!("Access read lock of database {} failed!", self.name))
        })
    }
}

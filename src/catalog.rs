mod database;

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub use database::Database;

use crate::{context::Session, DBError, DBResult};

/// Process-wide registry of databases.
///
/// The catalog is a low-level registry: it does not reject duplicate names on
/// [`Catalog::add_database`] and dropping an absent database is a no-op. The
/// policy for both lives in the plan nodes that call it. Every operation holds
/// the internal lock for a single map lookup, insert or delete.
#[derive(Debug, Default)]
pub struct Catalog {
    case_sensitive: bool,
    databases: RwLock<HashMap<String, Arc<Database>>>,
}

impl Catalog {
    /// Catalog with case-insensitive database names.
    pub fn new() -> Self {
        Self::with_case_sensitivity(false)
    }

    pub fn with_case_sensitivity(case_sensitive: bool) -> Self {
        Catalog {
            case_sensitive,
            databases: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn has_database(&self, name: &str) -> DBResult<bool> {
        let key = self.key(name);
        Ok(self.read()?.contains_key(&key))
    }

    /// Registers `database` and returns the handle stored under its name.
    /// A handle already registered under that name is kept, together with
    /// its tables, and returned instead.
    pub fn add_database(&self, database: Database) -> DBResult<Arc<Database>> {
        let key = self.key(database.name());
        let (stored, added) = {
            let mut databases = self.write()?;
            match databases.get(&key) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let database = Arc::new(database);
                    databases.insert(key, Arc::clone(&database));
                    (database, true)
                }
            }
        };
        if added {
            log::info!("added database {}", stored.name());
        } else {
            log::debug!("database {} already registered", stored.name());
        }
        Ok(stored)
    }

    /// Removes the database if present, absence is not an error here.
    pub fn drop_database(&self, name: &str) -> DBResult<()> {
        let key = self.key(name);
        let removed = self.write()?.remove(&key);
        match removed {
            Some(_) => log::info!("dropped database {name}"),
            None => log::debug!("drop of absent database {name} ignored"),
        }
        Ok(())
    }

    pub fn database(&self, name: &str) -> DBResult<Arc<Database>> {
        let key = self.key(name);
        self.read()?
            .get(&key)
            .cloned()
            .ok_or_else(|| DBError::DatabaseNotFound(name.to_string()))
    }

    /// The named database, or the session's current one when no name is given.
    pub fn database_or_current(
        &self,
        name: Option<&str>,
        session: &Session,
    ) -> DBResult<Arc<Database>> {
        match name {
            Some(name) => self.database(name),
            None => {
                let current = session
                    .current_database()
                    .ok_or(DBError::NoDatabaseSelected)?;
                self.database(&current)
            }
        }
    }

    /// Names of all databases, sorted.
    pub fn all_databases(&self) -> DBResult<Vec<String>> {
        let mut names: Vec<String> = self
            .read()?
            .values()
            .map(|db| db.name().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn len(&self) -> DBResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> DBResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Whether two names refer to the same database under this catalog's
    /// case policy.
    pub fn same_name(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }

    fn key(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    fn read(&self) -> DBResult<RwLockReadGuard<'_, HashMap<String, Arc<Database>>>> {
        self.databases.read().map_err(|_| {
            DBError::Unknown("Access read lock of catalog failed!".to_string())
        })
    }

    fn write(&self) -> DBResult<RwLockWriteGuard<'_, HashMap<String, Arc<Database>>>> {
        self.databases.write().map_err(|_| {
            DBError::Unknown("Access write lock of catalog failed!".to_string())
        })
    }
}

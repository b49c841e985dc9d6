use crate::{Entity, Error, MappingError, Result, TableMetadata};
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard},
};

/// Cache of resolved [`TableMetadata`], one entry per entity type.
///
/// Entries are created on first use and never replaced, every lookup of the
/// same type returns the same `Arc`.
#[derive(Debug, Default)]
pub struct Registry {
    tables: RwLock<HashMap<TypeId, Arc<TableMetadata>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata of `E`, without resolving it.
    pub fn get<E: Entity>(&self) -> Result<Option<Arc<TableMetadata>>> {
        Ok(self.read()?.get(&TypeId::of::<E>()).cloned())
    }

    /// Metadata of `E`, resolving and caching it on first use.
    pub fn resolve<E: Entity>(&self) -> Result<Arc<TableMetadata>> {
        if let Some(table) = self.get::<E>()? {
            return Ok(table);
        }
        self.insert::<E>(None)
    }

    /// Resolve `E` using `table_name` as the table name.
    ///
    /// An empty name falls back to the type name. Registering a type that is
    /// already cached succeeds only when the names agree.
    pub fn register<E: Entity>(&self, table_name: &str) -> Result<Arc<TableMetadata>> {
        let requested = if table_name.trim().is_empty() {
            E::type_name().to_uppercase()
        } else {
            table_name.trim().to_uppercase()
        };
        if let Some(table) = self.get::<E>()? {
            return Self::check_name::<E>(table, requested);
        }
        self.insert::<E>(Some(&requested))
            .and_then(|table| Self::check_name::<E>(table, requested))
    }

    /// Number of cached entity types.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<TypeId, Arc<TableMetadata>>>> {
        self.tables
            .read()
            .map_err(|_| Error::msg("The metadata registry lock is poisoned"))
    }

    fn insert<E: Entity>(&self, table_name: Option<&str>) -> Result<Arc<TableMetadata>> {
        let table = Arc::new(TableMetadata::resolve::<E>(table_name)?);
        let mut tables = self
            .tables
            .write()
            .map_err(|_| Error::msg("The metadata registry lock is poisoned"))?;
        // Another thread might have won the race, keep its entry
        Ok(tables.entry(TypeId::of::<E>()).or_insert(table).clone())
    }

    fn check_name<E: Entity>(
        table: Arc<TableMetadata>,
        requested: String,
    ) -> Result<Arc<TableMetadata>> {
        if table.name == requested {
            Ok(table)
        } else {
            Err(MappingError::AlreadyRegistered {
                entity: E::type_name(),
                existing: table.name.clone(),
                requested,
            }
            .into())
        }
    }
}

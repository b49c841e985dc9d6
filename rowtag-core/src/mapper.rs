use crate::{
    Backend, Context, Entity, Error, MapperConfig, Registry, Result, ResultShape, RowsAffected,
    Selection, SqlWriter, Statement, TableMetadata, Value, key_column, materialize, truncate_long,
};
use std::sync::{Arc, Mutex, MutexGuard};

/// Entry point of the four table operations.
///
/// Owns the metadata [`Registry`] and serializes each kind of operation with
/// its own lock. The backend is passed to every call, the mapper does not
/// keep a connection.
///
/// # Example
/// ```rust,ignore
/// let mapper = Mapper::new(MapperConfig::default().with_schema("SALES"));
/// mapper.insert(&mut item, &mut backend)?;
/// let items = mapper
///     .select::<Item, _>(ResultShape::MapOfValPk, &mut backend, "OWNER_ID = :1", &[7.into()])?
///     .into_value_map::<i64>()?;
/// ```
#[derive(Debug, Default)]
pub struct Mapper {
    registry: Registry,
    config: MapperConfig,
    insert_lock: Mutex<()>,
    update_lock: Mutex<()>,
    delete_lock: Mutex<()>,
    select_lock: Mutex<()>,
    register_lock: Mutex<()>,
}

fn lock<'a>(mutex: &'a Mutex<()>, operation: &str) -> Result<MutexGuard<'a, ()>> {
    mutex
        .lock()
        .map_err(|_| Error::msg(format!("The {operation} lock is poisoned")))
}

impl Mapper {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Metadata of `E`, resolved on first use.
    pub fn metadata<E: Entity>(&self) -> Result<Arc<TableMetadata>> {
        self.registry.resolve::<E>()
    }

    /// Map `E` to the table `table_name`, an empty name uses the type name.
    pub fn register<E: Entity>(&self, table_name: &str) -> Result<Arc<TableMetadata>> {
        let _guard = lock(&self.register_lock, "register")?;
        self.registry
            .register::<E>(table_name)
            .inspect(|table| {
                if self.config.log.register {
                    log::info!(
                        "Registered `{}` as table `{}` with columns {:?}",
                        table.type_name,
                        table.name,
                        table.column_names().collect::<Vec<_>>(),
                    );
                }
            })
            .inspect_err(|e| log::error!("{:#}", e))
    }

    fn table_ref<B: Backend>(&self, backend: &B, table: &TableMetadata) -> String {
        let mut out = String::with_capacity(self.config.schema.len() + table.name.len() + 1);
        backend
            .sql_writer()
            .write_table_ref(&mut out, &self.config.schema, &table.name);
        out
    }

    /// Insert `entity`. When the table has an identity column, the value
    /// generated by the backend is written back into `entity`.
    pub fn insert<E: Entity, B: Backend>(
        &self,
        entity: &mut E,
        backend: &mut B,
    ) -> Result<RowsAffected> {
        let _guard = lock(&self.insert_lock, "insert")?;
        (|| -> Result<RowsAffected> {
            let table = self.registry.resolve::<E>()?;
            let mut sql = String::with_capacity(128);
            let params =
                backend
                    .sql_writer()
                    .write_insert(&mut sql, &self.config.schema, &table, entity)?;
            if self.config.log.insert {
                log::debug!("{}", truncate_long!(sql));
            }
            let result = backend
                .prepare_and_execute(&sql, &params)
                .with_context(|| format!("While inserting into `{}`", table.name))?;
            if let Some(identity) = table.identity() {
                let value = result.returned.clone().with_context(|| {
                    format!(
                        "The backend did not return the value of the identity column `{}`",
                        identity.name
                    )
                })?;
                entity
                    .set_field(identity.field_position, value)
                    .with_context(|| {
                        format!("While storing the identity column `{}`", identity.name)
                    })?;
            }
            Ok(result)
        })()
        .inspect_err(|e| log::error!("{:#}", e))
    }

    /// Update the row having the primary key of `entity` with its other columns.
    pub fn update<E: Entity, B: Backend>(
        &self,
        entity: &E,
        backend: &mut B,
    ) -> Result<RowsAffected> {
        let _guard = lock(&self.update_lock, "update")?;
        (|| -> Result<RowsAffected> {
            let table = self.registry.resolve::<E>()?;
            let pairs = backend.sql_writer().update_pairs(&table, entity)?;
            let table_ref = self.table_ref(backend, &table);
            if self.config.log.update {
                log::debug!(
                    "UPDATE {} {:?}",
                    table_ref,
                    pairs.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()
                );
            }
            backend
                .update(&table_ref, &pairs)
                .with_context(|| format!("While updating `{table_ref}`"))
        })()
        .inspect_err(|e| log::error!("{:#}", e))
    }

    /// Delete the row having the primary key of `entity`.
    pub fn delete<E: Entity, B: Backend>(
        &self,
        entity: &E,
        backend: &mut B,
    ) -> Result<RowsAffected> {
        let _guard = lock(&self.delete_lock, "delete")?;
        (|| -> Result<RowsAffected> {
            let table = self.registry.resolve::<E>()?;
            let mut sql = String::with_capacity(64);
            let params = backend.sql_writer().write_delete(
                &mut sql,
                &self.config.schema,
                &table,
                entity,
            )?;
            if self.config.log.delete {
                log::debug!("{}", truncate_long!(sql));
            }
            backend
                .prepare_and_execute(&sql, &params)
                .with_context(|| format!("While deleting from `{}`", table.name))
        })()
        .inspect_err(|e| log::error!("{:#}", e))
    }

    /// Select the rows of `E` matching `condition` and arrange them as `shape`.
    ///
    /// `condition` may omit the leading `WHERE`, `params` bind its placeholders.
    pub fn select<E: Entity, B: Backend>(
        &self,
        shape: ResultShape,
        backend: &mut B,
        condition: &str,
        params: &[Value],
    ) -> Result<Selection<E>> {
        let _guard = lock(&self.select_lock, "select")?;
        (|| -> Result<Selection<E>> {
            let table = self.registry.resolve::<E>()?;
            key_column(&table, shape)?;
            let mut sql = String::with_capacity(128);
            backend
                .sql_writer()
                .write_select(&mut sql, &self.config.schema, &table, condition);
            if self.config.log.select {
                log::debug!("{}", truncate_long!(sql));
            }
            let column_types = table.column_types();
            let mut statement = backend
                .prepare(&sql, &column_types)
                .with_context(|| format!("While preparing `{sql}`"))?;
            let rows = statement
                .query(params)
                .with_context(|| format!("While selecting from `{}`", table.name))?;
            materialize(&table, shape, rows)
        })()
        .inspect_err(|e| log::error!("{:#}", e))
    }
}

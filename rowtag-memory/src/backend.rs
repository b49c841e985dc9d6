use crate::{
    MemorySqlWriter, MemoryStatement,
    parse::{Command, parse},
};
use rowtag_core::{Backend, ColumnType, Context, Result, Value};
use std::collections::BTreeMap;

/// Stored row, column name to value.
pub type MemoryRow = BTreeMap<String, Value>;

#[derive(Default, Debug, Clone)]
pub struct MemoryTable {
    pub rows: Vec<MemoryRow>,
    /// Last generated identity value.
    pub sequence: i64,
}

/// Backend keeping its tables in process.
///
/// Tables are created by the first insert and addressed by their qualified
/// name (`SCHEMA.TABLE`). Names are case insensitive.
#[derive(Default, Debug)]
pub struct MemoryBackend {
    pub(crate) tables: BTreeMap<String, MemoryTable>,
    pub(crate) history: Vec<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(&name.to_uppercase())
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Statements prepared so far, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn last_statement(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Drop every table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

impl Backend for MemoryBackend {
    type SqlWriter = MemorySqlWriter;
    type Statement<'s> = MemoryStatement<'s>;

    fn sql_writer(&self) -> Self::SqlWriter {
        MemorySqlWriter
    }

    fn prepare(&mut self, sql: &str, column_types: &[ColumnType]) -> Result<Self::Statement<'_>> {
        let command = parse(sql).with_context(|| format!("Cannot prepare `{sql}`"))?;
        if let Command::Select { columns, .. } = &command
            && columns.len() != column_types.len()
        {
            return Err(rowtag_core::Error::msg(format!(
                "The query selects {} columns but {} column types were provided",
                columns.len(),
                column_types.len()
            )));
        }
        log::trace!("Prepared `{sql}`");
        self.history.push(sql.to_string());
        Ok(MemoryStatement {
            backend: self,
            command,
            column_types: column_types.into(),
        })
    }
}

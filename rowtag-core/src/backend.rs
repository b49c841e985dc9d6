use crate::{ColumnType, Context, Result, SqlWriter, Value};

/// Ordered values of one result row, one per selected column.
pub type Row = Box<[Value]>;

/// Statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Value bound to the next placeholder.
    In(Value),
    /// Slot receiving a value produced by the statement, like a `RETURNING ... INTO` target.
    Out {
        name: &'static str,
        column_type: ColumnType,
    },
}

impl Param {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Param::In(v) => Some(v),
            Param::Out { .. } => None,
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::In(value)
    }
}

/// Outcome of a statement that does not return rows.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Value written to the `Param::Out` slot, when the statement has one.
    pub returned: Option<Value>,
}

/// A statement prepared by a [`Backend`].
pub trait Statement {
    type Rows: Iterator<Item = Result<Row>>;

    fn execute(&mut self, params: &[Param]) -> Result<RowsAffected>;
    /// Run the statement and return its rows, columns follow the order of the
    /// column types the statement was prepared with.
    fn query(&mut self, params: &[Value]) -> Result<Self::Rows>;
}

/// Database the mapper talks to.
///
/// Implementations are synchronous, each call runs on the caller thread.
pub trait Backend {
    type SqlWriter: SqlWriter;
    type Statement<'s>: Statement
    where
        Self: 's;

    fn sql_writer(&self) -> Self::SqlWriter;

    /// Prepare `sql`. `column_types` describes the result columns of a query,
    /// it is empty for statements that do not return rows.
    fn prepare(&mut self, sql: &str, column_types: &[ColumnType]) -> Result<Self::Statement<'_>>;

    /// Update one row of `table`. The last pair identifies the row, the other
    /// pairs are the new column values.
    fn update(&mut self, table: &str, pairs: &[(String, Value)]) -> Result<RowsAffected> {
        let mut sql = String::with_capacity(128);
        let params = self.sql_writer().write_update(&mut sql, table, pairs)?;
        self.prepare_and_execute(&sql, &params)
    }

    fn prepare_and_execute(&mut self, sql: &str, params: &[Param]) -> Result<RowsAffected> {
        let mut statement = self
            .prepare(sql, &[])
            .with_context(|| format!("While preparing `{sql}`"))?;
        statement
            .execute(params)
            .with_context(|| format!("While executing `{sql}`"))
    }
}

use crate::{
    Entity, Error, MappingError, Param, Result, Role, TableMetadata, Value, contains_keyword,
    separated_by,
};
use std::fmt::Write;

/// Name of the output parameter receiving the generated identity.
pub const RETURNING_PARAM: &str = "RET_VAL";
/// Name of the parameter holding the key in a `DELETE` predicate.
pub const WHERE_PARAM: &str = "WHERE_VAL";

/// Renders the statements of the four mapper operations.
///
/// Every method has a default implementation producing `:N` positional
/// placeholders, a backend overrides only what its dialect does differently.
pub trait SqlWriter {
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_table_ref(&self, out: &mut String, schema: &str, name: &str) {
        if !schema.is_empty() {
            self.write_identifier(out, schema);
            out.push('.');
        }
        self.write_identifier(out, name);
    }

    /// Positional placeholder, `index` starts from 1.
    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = write!(out, ":{index}");
    }

    fn write_named_placeholder(&self, out: &mut String, name: &str) {
        out.push(':');
        out.push_str(name);
    }

    /// `INSERT` of `entity`, returns the parameters to execute it with.
    ///
    /// The identity column is left out of the values and read back through a
    /// `RETURNING` clause into a trailing [`Param::Out`].
    fn write_insert<E: Entity>(
        &self,
        out: &mut String,
        schema: &str,
        table: &TableMetadata,
        entity: &E,
    ) -> Result<Vec<Param>> {
        let columns = table
            .columns
            .iter()
            .filter(|c| !c.roles.contains(Role::Identity))
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return Err(MappingError::NoInsertableColumns {
                entity: table.type_name,
            }
            .into());
        }
        let mut params = Vec::with_capacity(table.columns.len());
        out.push_str("INSERT INTO ");
        self.write_table_ref(out, schema, &table.name);
        out.push_str(" (");
        separated_by(
            out,
            columns.iter(),
            |out, c| self.write_identifier(out, &c.name),
            ", ",
        );
        out.push_str(") VALUES (");
        separated_by(
            out,
            1..=columns.len(),
            |out, i| self.write_placeholder(out, i),
            ", ",
        );
        out.push(')');
        for column in columns {
            params.push(Param::In(entity.field_value(column.field_position)?));
        }
        if let Some(identity) = table.identity() {
            out.push_str(" RETURNING ");
            self.write_identifier(out, &identity.name);
            out.push_str(" INTO ");
            self.write_named_placeholder(out, RETURNING_PARAM);
            params.push(Param::Out {
                name: RETURNING_PARAM,
                column_type: identity.column_type,
            });
        }
        Ok(params)
    }

    /// Column and value pairs of `entity`, the primary key pair last.
    fn update_pairs<E: Entity>(
        &self,
        table: &TableMetadata,
        entity: &E,
    ) -> Result<Vec<(String, Value)>> {
        table.require(Role::PrimaryKey)?;
        table
            .columns
            .iter()
            .map(|c| Ok((c.name.clone(), entity.field_value(c.field_position)?)))
            .collect()
    }

    /// `UPDATE` setting every pair but the last, which becomes the predicate.
    fn write_update(
        &self,
        out: &mut String,
        table: &str,
        pairs: &[(String, Value)],
    ) -> Result<Vec<Param>> {
        let Some(((key, key_value), set)) = pairs.split_last() else {
            return Err(Error::msg(format!(
                "Cannot update `{table}` without a key column"
            )));
        };
        if set.is_empty() {
            return Err(Error::msg(format!(
                "Cannot update `{table}`: there is no column besides the key `{key}`"
            )));
        }
        out.push_str("UPDATE ");
        out.push_str(table);
        out.push_str(" SET ");
        separated_by(
            out,
            set.iter().enumerate(),
            |out, (i, (name, _))| {
                self.write_identifier(out, name);
                out.push_str(" = ");
                self.write_placeholder(out, i + 1);
            },
            ", ",
        );
        out.push_str(" WHERE ");
        self.write_identifier(out, key);
        out.push_str(" = ");
        self.write_placeholder(out, pairs.len());
        Ok(set
            .iter()
            .map(|(_, v)| Param::In(v.clone()))
            .chain([Param::In(key_value.clone())])
            .collect())
    }

    /// `DELETE` of the row having the primary key of `entity`.
    fn write_delete<E: Entity>(
        &self,
        out: &mut String,
        schema: &str,
        table: &TableMetadata,
        entity: &E,
    ) -> Result<Vec<Param>> {
        let key = table.require(Role::PrimaryKey)?;
        out.push_str("DELETE FROM ");
        self.write_table_ref(out, schema, &table.name);
        out.push_str(" WHERE ");
        self.write_identifier(out, &key.name);
        out.push_str(" = ");
        self.write_named_placeholder(out, WHERE_PARAM);
        Ok(vec![Param::In(entity.field_value(key.field_position)?)])
    }

    /// `SELECT` of all the columns, `condition` is appended after a `WHERE`
    /// keyword unless it already contains one.
    fn write_select(&self, out: &mut String, schema: &str, table: &TableMetadata, condition: &str) {
        out.push_str("SELECT ");
        separated_by(
            out,
            table.columns.iter(),
            |out, c| self.write_identifier(out, &c.name),
            ", ",
        );
        out.push_str(" FROM ");
        self.write_table_ref(out, schema, &table.name);
        let condition = condition.trim();
        if !condition.is_empty() {
            out.push(' ');
            if !contains_keyword(condition, "WHERE") {
                out.push_str("WHERE ");
            }
            out.push_str(condition);
        }
    }
}

/// [`SqlWriter`] with the default rendering.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub fn new() -> Self {
        Self
    }
}

impl SqlWriter for GenericSqlWriter {}

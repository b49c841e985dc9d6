use crate::{
    Context, Entity, Error, FieldValues, MappingError, Result, ResultShape, Row, Selection,
    TableMetadata,
};
use std::{collections::HashMap, sync::Arc};

/// Index of the column keying `shape`, `None` for slices.
///
/// Fails when the table has no column with the role the shape needs.
pub fn key_column(table: &TableMetadata, shape: ResultShape) -> Result<Option<usize>> {
    let Some(role) = shape.key_role() else {
        return Ok(None);
    };
    table
        .position_of(role)
        .map(Some)
        .ok_or_else(|| {
            MappingError::MissingShapeRole {
                entity: table.type_name,
                shape,
                role,
            }
            .into()
        })
}

/// Build the requested shape out of `rows`, each row holds one value per
/// column of `table` in column order.
pub fn materialize<E, R>(table: &TableMetadata, shape: ResultShape, rows: R) -> Result<Selection<E>>
where
    E: Entity,
    R: IntoIterator<Item = Result<Row>>,
{
    let key = key_column(table, shape)?;
    let mut values = Vec::new();
    let mut map = HashMap::new();
    for row in rows {
        let row = row.with_context(|| format!("While reading a row of `{}`", table.name))?;
        let entity = build::<E>(table, row)?;
        match key {
            None => values.push(entity),
            Some(key) => {
                let column = &table.columns[key];
                let key = entity
                    .field_value(column.field_position)
                    .with_context(|| format!("While reading the key column `{}`", column.name))?;
                if map.contains_key(&key) {
                    log::warn!(
                        "Duplicate key {:?} in column `{}` of `{}`, the last row wins",
                        key,
                        column.name,
                        table.name,
                    );
                }
                map.insert(key, entity);
            }
        }
    }
    Ok(match (key, shape.by_ref()) {
        (None, false) => Selection::Values(values),
        (None, true) => Selection::Refs(values.into_iter().map(Arc::new).collect()),
        (Some(..), false) => Selection::ValueMap(map),
        (Some(..), true) => {
            Selection::RefMap(map.into_iter().map(|(k, v)| (k, Arc::new(v))).collect())
        }
    })
}

fn build<E: Entity>(table: &TableMetadata, row: Row) -> Result<E> {
    if row.len() != table.columns.len() {
        return Err(Error::msg(format!(
            "Row of `{}` has {} values but the table has {} columns",
            table.name,
            row.len(),
            table.columns.len(),
        )));
    }
    let mut fields = FieldValues::new::<E>();
    for (column, value) in table.columns.iter().zip(row) {
        fields.set(column.field_position, value)?;
    }
    E::from_fields(fields).with_context(|| format!("While building a `{}`", table.type_name))
}

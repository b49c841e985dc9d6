use crate::{MemoryBackend, MemoryRow, parse::Command, parse::Filter};
use rowtag_core::{ColumnType, Error, Param, Result, Row, RowsAffected, Statement, Value};
use std::vec;

#[derive(Debug)]
pub struct MemoryStatement<'s> {
    pub(crate) backend: &'s mut MemoryBackend,
    pub(crate) command: Command,
    pub(crate) column_types: Box<[ColumnType]>,
}

fn input<'a>(inputs: &'a [&'a Value], index: usize) -> Result<&'a Value> {
    inputs.get(index).copied().ok_or_else(|| {
        Error::msg(format!(
            "Parameter {} was not provided, got {} values",
            index + 1,
            inputs.len()
        ))
    })
}

/// SQL equality: NULL matches nothing, integers compare by value across widths.
fn equal(lhs: &Value, rhs: &Value) -> bool {
    if lhs.is_null() || rhs.is_null() {
        return false;
    }
    match (lhs.as_i128(), rhs.as_i128()) {
        (Some(l), Some(r)) => l == r,
        _ => lhs == rhs,
    }
}

/// Fail early when the filter reads a parameter that was not provided.
fn check_filter(filter: &Filter, inputs: &[&Value]) -> Result<()> {
    for (_, index) in filter {
        input(inputs, *index)?;
    }
    Ok(())
}

fn matches(row: &MemoryRow, filter: &Filter, inputs: &[&Value]) -> Result<bool> {
    for (column, index) in filter {
        let value = input(inputs, *index)?;
        if !row.get(column).is_some_and(|v| equal(v, value)) {
            return Ok(false);
        }
    }
    Ok(true)
}

impl<'s> Statement for MemoryStatement<'s> {
    type Rows = vec::IntoIter<Result<Row>>;

    fn execute(&mut self, params: &[Param]) -> Result<RowsAffected> {
        let inputs = params.iter().filter_map(Param::value).collect::<Vec<_>>();
        let table_name = self.command.table().to_string();
        match &self.command {
            Command::Insert {
                columns,
                values,
                returning,
                ..
            } => {
                let mut row = MemoryRow::new();
                for (column, index) in columns.iter().zip(values) {
                    row.insert(column.clone(), input(&inputs, *index)?.clone());
                }
                let table = self.backend.tables.entry(table_name).or_default();
                let mut returned = None;
                if let Some(column) = returning {
                    let column_type = params
                        .iter()
                        .find_map(|v| match v {
                            Param::Out { column_type, .. } => Some(*column_type),
                            Param::In(..) => None,
                        })
                        .unwrap_or(ColumnType::Int64);
                    let value = column_type.coerce(Value::Int64(Some(table.sequence + 1)))?;
                    table.sequence += 1;
                    row.insert(column.clone(), value.clone());
                    returned = Some(value);
                }
                table.rows.push(row);
                Ok(RowsAffected {
                    rows_affected: 1,
                    returned,
                })
            }
            Command::Update { set, filter, .. } => {
                check_filter(filter, &inputs)?;
                for (_, index) in set {
                    input(&inputs, *index)?;
                }
                let Some(table) = self.backend.tables.get_mut(&table_name) else {
                    return Ok(RowsAffected::default());
                };
                let mut rows_affected = 0;
                for row in table.rows.iter_mut() {
                    if matches(row, filter, &inputs)? {
                        for (column, index) in set {
                            row.insert(column.clone(), input(&inputs, *index)?.clone());
                        }
                        rows_affected += 1;
                    }
                }
                Ok(RowsAffected {
                    rows_affected,
                    returned: None,
                })
            }
            Command::Delete { filter, .. } => {
                check_filter(filter, &inputs)?;
                let Some(table) = self.backend.tables.get_mut(&table_name) else {
                    return Ok(RowsAffected::default());
                };
                let before = table.rows.len();
                let mut kept = Vec::with_capacity(before);
                for row in table.rows.drain(..) {
                    if !matches(&row, filter, &inputs)? {
                        kept.push(row);
                    }
                }
                let rows_affected = (before - kept.len()) as u64;
                table.rows = kept;
                Ok(RowsAffected {
                    rows_affected,
                    returned: None,
                })
            }
            Command::Select { .. } => Err(Error::msg(
                "A select statement must be run with `query`, not `execute`",
            )),
        }
    }

    fn query(&mut self, params: &[Value]) -> Result<Self::Rows> {
        let Command::Select {
            table,
            columns,
            filter,
        } = &self.command
        else {
            return Err(Error::msg(
                "Only a select statement can be run with `query`",
            ));
        };
        let inputs = params.iter().collect::<Vec<_>>();
        let mut result = Vec::new();
        let Some(table) = self.backend.tables.get(table) else {
            return Ok(result.into_iter());
        };
        for row in &table.rows {
            if !matches(row, filter, &inputs)? {
                continue;
            }
            let values = columns
                .iter()
                .zip(self.column_types.iter())
                .map(|(column, column_type)| {
                    let value = row
                        .get(column)
                        .cloned()
                        .unwrap_or_else(|| column_type.empty_value());
                    column_type.coerce(value)
                })
                .collect::<Result<Row>>();
            result.push(values);
        }
        Ok(result.into_iter())
    }
}

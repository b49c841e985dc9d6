use crate::{AsValue, ColumnType, Context, MappingError, Result, Value};

/// Compile time description of one named field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Declaration index, used to address the field.
    pub position: usize,
    pub name: &'static str,
    /// Raw content of the `db` annotation, empty when absent.
    pub tag: &'static str,
    pub column_type: ColumnType,
    /// Whether the field is visible outside its module.
    pub public: bool,
}

/// A record type that can be mapped to a table.
///
/// Implemented by `#[derive(Entity)]`. The descriptor table returned by
/// [`Entity::fields`] lists every named field in declaration order, including
/// the ones that will not be mapped, positions index into it.
pub trait Entity: Sized + 'static {
    fn type_name() -> &'static str;
    fn fields() -> &'static [FieldDef];
    /// Current value of the field at `position`.
    fn field_value(&self, position: usize) -> Result<Value>;
    /// Overwrite the field at `position` converting `value` into its type.
    fn set_field(&mut self, position: usize, value: Value) -> Result<()>;
    /// Build a new instance, fields missing from `values` take their default.
    fn from_fields(values: FieldValues) -> Result<Self>;
}

/// Values collected for a new entity instance, indexed by field position.
#[derive(Debug)]
pub struct FieldValues {
    entity: &'static str,
    fields: &'static [FieldDef],
    values: Vec<Option<Value>>,
}

impl FieldValues {
    pub fn new<E: Entity>() -> Self {
        let fields = E::fields();
        Self {
            entity: E::type_name(),
            fields,
            values: vec![None; fields.len()],
        }
    }

    pub fn set(&mut self, position: usize, value: Value) -> Result<()> {
        let slot = self.values.get_mut(position).with_context(|| {
            format!(
                "Field position {position} is out of range for `{}`",
                self.entity
            )
        })?;
        *slot = Some(value);
        Ok(())
    }

    pub fn contains(&self, position: usize) -> bool {
        matches!(self.values.get(position), Some(Some(..)))
    }

    /// Remove the value at `position` and convert it into `T`.
    pub fn take<T: AsValue>(&mut self, position: usize) -> Result<T> {
        let field = self.fields.get(position).map_or("?", |v| v.name);
        let value = self
            .values
            .get_mut(position)
            .and_then(Option::take)
            .ok_or(MappingError::MissingField {
                entity: self.entity,
                field,
            })?;
        T::try_from_value(value)
            .with_context(|| format!("While decoding field `{}::{}`", self.entity, field))
    }

    /// Like [`FieldValues::take`] but fall back to `T::default()` when absent.
    pub fn take_or_default<T: AsValue + Default>(&mut self, position: usize) -> Result<T> {
        if self.contains(position) {
            self.take(position)
        } else {
            Ok(T::default())
        }
    }
}

use crate::{ColumnType, Context, Entity, MappingError, Result, Role, Roles, parse_tag};
use std::any::TypeId;

/// Mapping of one entity field to a table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Position of the field in [`Entity::fields`].
    pub field_position: usize,
    /// Upper-cased column name.
    pub name: String,
    pub column_type: ColumnType,
    pub roles: Roles,
}

/// Table layout derived from an entity, the primary key column is always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub name: String,
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub columns: Vec<ColumnMetadata>,
    pub roles: Roles,
}

impl TableMetadata {
    /// Build the metadata of `E`, using `table_name` when given instead of the type name.
    pub fn resolve<E: Entity>(table_name: Option<&str>) -> Result<TableMetadata> {
        let entity = E::type_name();
        let mut columns = Vec::<ColumnMetadata>::with_capacity(E::fields().len());
        let mut roles = Roles::empty();
        for field in E::fields() {
            if !field.public {
                continue;
            }
            let tag = parse_tag(field.tag, field.name)
                .map_err(|e| attach_entity(e, entity))
                .with_context(|| {
                    format!("While parsing the annotation of `{entity}::{}`", field.name)
                })?;
            if tag.ignored {
                continue;
            }
            let name = tag.name.to_uppercase();
            for role in tag.roles.iter() {
                if let Some(first) = columns.iter().find(|c| c.roles.contains(role)) {
                    return Err(MappingError::DuplicateRole {
                        entity,
                        role,
                        first: first.name.clone(),
                        second: name,
                    }
                    .into());
                }
            }
            if tag.roles.contains(Role::Identity) && !tag.roles.contains(Role::PrimaryKey) {
                return Err(MappingError::IdentityWithoutPrimaryKey {
                    entity,
                    field: field.name.to_string(),
                }
                .into());
            }
            roles = roles.union(tag.roles);
            columns.push(ColumnMetadata {
                field_position: field.position,
                name,
                column_type: field.column_type,
                roles: tag.roles,
            });
        }
        if columns.is_empty() {
            return Err(MappingError::NoColumns { entity }.into());
        }
        if let Some(i) = columns
            .iter()
            .position(|c| c.roles.contains(Role::PrimaryKey))
        {
            let key = columns.remove(i);
            columns.push(key);
        }
        let name = match table_name {
            Some(v) if !v.trim().is_empty() => v.trim().to_uppercase(),
            _ => entity.to_uppercase(),
        };
        let result = TableMetadata {
            name,
            type_name: entity,
            type_id: TypeId::of::<E>(),
            columns,
            roles,
        };
        result.validate()?;
        Ok(result)
    }

    /// Check the structural invariants: at most one column per role, at
    /// least one column, primary key in last position.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(MappingError::NoColumns {
                entity: self.type_name,
            }
            .into());
        }
        for role in Role::ALL {
            let mut it = self.columns.iter().filter(|c| c.roles.contains(role));
            if let (Some(first), Some(second)) = (it.next(), it.next()) {
                return Err(MappingError::DuplicateRole {
                    entity: self.type_name,
                    role,
                    first: first.name.clone(),
                    second: second.name.clone(),
                }
                .into());
            }
        }
        if self.has_role(Role::PrimaryKey) && !self.last_column_roles().contains(Role::PrimaryKey)
        {
            return Err(MappingError::KeyNotLast {
                entity: self.type_name,
            }
            .into());
        }
        Ok(())
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    pub fn column_with(&self, role: Role) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.roles.contains(role))
    }

    /// Index of the column carrying `role`.
    pub fn position_of(&self, role: Role) -> Option<usize> {
        self.columns.iter().position(|c| c.roles.contains(role))
    }

    pub fn primary_key(&self) -> Option<&ColumnMetadata> {
        self.column_with(Role::PrimaryKey)
    }

    pub fn identity(&self) -> Option<&ColumnMetadata> {
        self.column_with(Role::Identity)
    }

    /// Like [`TableMetadata::column_with`] but missing roles are an error.
    pub fn require(&self, role: Role) -> Result<&ColumnMetadata> {
        self.column_with(role).ok_or_else(|| {
            MappingError::MissingRole {
                entity: self.type_name,
                role,
            }
            .into()
        })
    }

    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.column_type).collect()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn last_column_roles(&self) -> Roles {
        self.columns.last().map(|c| c.roles).unwrap_or_default()
    }
}

fn attach_entity(error: crate::Error, entity: &'static str) -> crate::Error {
    match error.downcast::<MappingError>() {
        Ok(MappingError::DuplicateRole {
            role,
            first,
            second,
            ..
        }) => MappingError::DuplicateRole {
            entity,
            role,
            first,
            second,
        }
        .into(),
        Ok(other) => other.into(),
        Err(error) => error,
    }
}

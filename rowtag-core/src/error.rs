use crate::{ResultShape, Role};
use thiserror::Error;

/// Metadata and shape validation failures.
///
/// These travel inside [`crate::Error`] and can be recovered with
/// `error.downcast_ref::<MappingError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Role `{role}` is declared more than once in `{entity}`: fields `{first}` and `{second}`")]
    DuplicateRole {
        entity: &'static str,
        role: Role,
        first: String,
        second: String,
    },
    #[error("Type `{entity}` does not have any exported field to map to a column")]
    NoColumns { entity: &'static str },
    #[error("Type `{entity}` does not have any column left to insert")]
    NoInsertableColumns { entity: &'static str },
    #[error("Type `{entity}` does not have a column marked `{role}`")]
    MissingRole { entity: &'static str, role: Role },
    #[error(
        "Unable to make a {shape} for type `{entity}`: it does not have an exported field marked `{role}`"
    )]
    MissingShapeRole {
        entity: &'static str,
        shape: ResultShape,
        role: Role,
    },
    #[error("Field `{field}` of `{entity}` is marked `id` but not `pk`")]
    IdentityWithoutPrimaryKey { entity: &'static str, field: String },
    #[error("The primary key of `{entity}` is not the last column")]
    KeyNotLast { entity: &'static str },
    #[error("Type `{entity}` is already registered as table `{existing}`, cannot register it as `{requested}`")]
    AlreadyRegistered {
        entity: &'static str,
        existing: String,
        requested: String,
    },
    #[error("Field `{field}` of `{entity}` was not provided")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
}

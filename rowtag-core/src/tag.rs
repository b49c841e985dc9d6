use crate::{MappingError, Result};
use std::fmt::{self, Display};

/// Role a column can play in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Value generated by the database on insert and returned to the caller.
    Identity,
    PrimaryKey,
    ForeignKey1,
    ForeignKey2,
    ForeignKey3,
    ForeignKey4,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Identity,
        Role::PrimaryKey,
        Role::ForeignKey1,
        Role::ForeignKey2,
        Role::ForeignKey3,
        Role::ForeignKey4,
    ];

    /// Annotation token.
    pub fn token(&self) -> &'static str {
        match self {
            Role::Identity => "id",
            Role::PrimaryKey => "pk",
            Role::ForeignKey1 => "fk1",
            Role::ForeignKey2 => "fk2",
            Role::ForeignKey3 => "fk3",
            Role::ForeignKey4 => "fk4",
        }
    }

    /// Parse an already trimmed and lower-cased annotation token.
    pub fn from_token(token: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|v| v.token() == token)
    }

    fn bit(&self) -> u8 {
        1 << *self as u8
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Set of roles.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Roles(u8);

impl Roles {
    pub const fn empty() -> Self {
        Roles(0)
    }
    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }
    /// Add a role, returns `false` if it was already present.
    pub fn insert(&mut self, role: Role) -> bool {
        let present = self.contains(role);
        self.0 |= role.bit();
        !present
    }
    pub fn union(self, other: Roles) -> Roles {
        Roles(self.0 | other.0)
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|v| self.contains(*v))
    }
}

impl From<Role> for Roles {
    fn from(value: Role) -> Self {
        Roles(value.bit())
    }
}

impl FromIterator<Role> for Roles {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        let mut result = Roles::empty();
        for role in iter {
            result.insert(role);
        }
        result
    }
}

impl Display for Roles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, role) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            role.fmt(f)?;
        }
        f.write_str("]")
    }
}

/// Parsed field annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTag {
    /// Display name, before any case normalization.
    pub name: String,
    pub roles: Roles,
    pub ignored: bool,
}

/// Parse a `db` annotation such as `"owner,fk1"` for the field `field_name`.
///
/// Tokens are comma separated, trimmed and compared case insensitively. The
/// first token is the column name unless it is empty or a role token. A `-`
/// token excludes the field. Unknown tokens are ignored.
pub fn parse_tag(tag: &str, field_name: &str) -> Result<ColumnTag> {
    let mut result = ColumnTag {
        name: field_name.to_string(),
        roles: Roles::empty(),
        ignored: false,
    };
    if tag.trim().is_empty() {
        return Ok(result);
    }
    if tag.split(',').any(|v| v.trim() == "-") {
        result.ignored = true;
        return Ok(result);
    }
    for (i, token) in tag.split(',').enumerate() {
        let token = token.trim().to_lowercase();
        if let Some(role) = Role::from_token(&token) {
            if !result.roles.insert(role) {
                return Err(MappingError::DuplicateRole {
                    entity: "",
                    role,
                    first: field_name.to_string(),
                    second: field_name.to_string(),
                }
                .into());
            }
        } else if i == 0 && !token.is_empty() {
            result.name = token;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tag() {
        let tag = parse_tag("", "name").unwrap();
        assert_eq!(tag.name, "name");
        assert!(tag.roles.is_empty());
        assert!(!tag.ignored);
    }

    #[test]
    fn name_and_roles() {
        let tag = parse_tag(" Owner , FK1, pk ", "owner_id").unwrap();
        assert_eq!(tag.name, "owner");
        assert!(tag.roles.contains(Role::ForeignKey1));
        assert!(tag.roles.contains(Role::PrimaryKey));
        assert!(!tag.roles.contains(Role::Identity));
    }

    #[test]
    fn role_only() {
        let tag = parse_tag("id,pk", "id").unwrap();
        assert_eq!(tag.name, "id");
        assert_eq!(
            tag.roles,
            [Role::Identity, Role::PrimaryKey].into_iter().collect::<Roles>()
        );
    }

    #[test]
    fn leading_empty_token() {
        let tag = parse_tag(",fk2", "parent").unwrap();
        assert_eq!(tag.name, "parent");
        assert_eq!(tag.roles, Roles::from(Role::ForeignKey2));
    }

    #[test]
    fn ignored() {
        assert!(parse_tag("-", "cache").unwrap().ignored);
        assert!(parse_tag("cache,-", "cache").unwrap().ignored);
        assert!(parse_tag("pk,pk,-", "x").unwrap().ignored);
        assert!(parse_tag("-,id,id", "x").unwrap().ignored);
    }

    #[test]
    fn unknown_tokens() {
        let tag = parse_tag("amount,omitempty,fk5", "amount").unwrap();
        assert_eq!(tag.name, "amount");
        assert!(tag.roles.is_empty());
    }

    #[test]
    fn repeated_role() {
        let error = parse_tag("pk,PK", "id").unwrap_err();
        assert!(matches!(
            error.downcast_ref::<MappingError>(),
            Some(MappingError::DuplicateRole {
                role: Role::PrimaryKey,
                ..
            })
        ));
    }

    #[test]
    fn roles_display() {
        let roles: Roles = [Role::ForeignKey3, Role::Identity].into_iter().collect();
        assert_eq!(roles.to_string(), "[id, fk3]");
    }
}

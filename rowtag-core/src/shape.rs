use crate::{AsValue, Error, Result, Role, Value};
use std::{
    collections::HashMap,
    fmt::{self, Display},
    hash::Hash,
    sync::Arc,
};

/// Requested output of a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    SliceOfVal,
    SliceOfRef,
    MapOfValPk,
    MapOfValFk1,
    MapOfValFk2,
    MapOfValFk3,
    MapOfValFk4,
    MapOfRefPk,
    MapOfRefFk1,
    MapOfRefFk2,
    MapOfRefFk3,
    MapOfRefFk4,
}

impl ResultShape {
    pub const ALL: [ResultShape; 12] = [
        ResultShape::SliceOfVal,
        ResultShape::SliceOfRef,
        ResultShape::MapOfValPk,
        ResultShape::MapOfValFk1,
        ResultShape::MapOfValFk2,
        ResultShape::MapOfValFk3,
        ResultShape::MapOfValFk4,
        ResultShape::MapOfRefPk,
        ResultShape::MapOfRefFk1,
        ResultShape::MapOfRefFk2,
        ResultShape::MapOfRefFk3,
        ResultShape::MapOfRefFk4,
    ];

    /// Role whose column keys the map, `None` for slices.
    pub fn key_role(&self) -> Option<Role> {
        use ResultShape::*;
        match self {
            SliceOfVal | SliceOfRef => None,
            MapOfValPk | MapOfRefPk => Some(Role::PrimaryKey),
            MapOfValFk1 | MapOfRefFk1 => Some(Role::ForeignKey1),
            MapOfValFk2 | MapOfRefFk2 => Some(Role::ForeignKey2),
            MapOfValFk3 | MapOfRefFk3 => Some(Role::ForeignKey3),
            MapOfValFk4 | MapOfRefFk4 => Some(Role::ForeignKey4),
        }
    }

    /// Whether elements are shared through `Arc` instead of owned.
    pub fn by_ref(&self) -> bool {
        use ResultShape::*;
        matches!(
            self,
            SliceOfRef | MapOfRefPk | MapOfRefFk1 | MapOfRefFk2 | MapOfRefFk3 | MapOfRefFk4
        )
    }
}

impl Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.key_role().is_some() { "map" } else { "slice" })?;
        f.write_str(if self.by_ref() { " of references" } else { " of values" })?;
        if let Some(role) = self.key_role() {
            write!(f, " keyed by {role}")?;
        }
        Ok(())
    }
}

/// Materialized rows of a select, the variant follows the requested [`ResultShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<E> {
    Values(Vec<E>),
    Refs(Vec<Arc<E>>),
    ValueMap(HashMap<Value, E>),
    RefMap(HashMap<Value, Arc<E>>),
}

impl<E> Selection<E> {
    pub fn len(&self) -> usize {
        match self {
            Selection::Values(v) => v.len(),
            Selection::Refs(v) => v.len(),
            Selection::ValueMap(v) => v.len(),
            Selection::RefMap(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Selection::Values(..) => "slice of values",
            Selection::Refs(..) => "slice of references",
            Selection::ValueMap(..) => "map of values",
            Selection::RefMap(..) => "map of references",
        }
    }

    fn mismatch(&self, expected: &str) -> Error {
        Error::msg(format!(
            "Expected a {expected} but the selection is a {}",
            self.kind()
        ))
    }

    pub fn into_values(self) -> Result<Vec<E>> {
        match self {
            Selection::Values(v) => Ok(v),
            other => Err(other.mismatch("slice of values")),
        }
    }

    pub fn into_refs(self) -> Result<Vec<Arc<E>>> {
        match self {
            Selection::Refs(v) => Ok(v),
            other => Err(other.mismatch("slice of references")),
        }
    }

    /// Map of values with keys converted into `K`.
    pub fn into_value_map<K: AsValue + Eq + Hash>(self) -> Result<HashMap<K, E>> {
        match self {
            Selection::ValueMap(v) => v
                .into_iter()
                .map(|(k, v)| Ok((K::try_from_value(k)?, v)))
                .collect(),
            other => Err(other.mismatch("map of values")),
        }
    }

    /// Map of references with keys converted into `K`.
    pub fn into_ref_map<K: AsValue + Eq + Hash>(self) -> Result<HashMap<K, Arc<E>>> {
        match self {
            Selection::RefMap(v) => v
                .into_iter()
                .map(|(k, v)| Ok((K::try_from_value(k)?, v)))
                .collect(),
            other => Err(other.mismatch("map of references")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles() {
        assert_eq!(ResultShape::SliceOfRef.key_role(), None);
        assert_eq!(ResultShape::MapOfRefFk2.key_role(), Some(Role::ForeignKey2));
        assert_eq!(ResultShape::MapOfValPk.key_role(), Some(Role::PrimaryKey));
        assert_eq!(ResultShape::ALL.iter().filter(|v| v.by_ref()).count(), 6);
        assert_eq!(ResultShape::MapOfRefFk2.to_string(), "map of references keyed by fk2");
    }

    #[test]
    fn accessors() {
        let selection = Selection::ValueMap(HashMap::from([(Value::Int64(Some(3)), "c")]));
        assert_eq!(selection.len(), 1);
        let map = selection.clone().into_value_map::<i32>().unwrap();
        assert_eq!(map.get(&3), Some(&"c"));
        assert!(selection.into_values().is_err());
    }
}

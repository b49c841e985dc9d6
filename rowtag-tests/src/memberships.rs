use crate::clear;
use rowtag::{Backend, Entity, MappingError, Mapper, MapperConfig, ResultShape, Role};

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Membership {
    #[db = "id,pk"]
    pub id: i32,
    #[db = "group_id,fk1"]
    pub group: i32,
    #[db = "user_id,fk2"]
    pub user: i32,
    pub note: Option<String>,
    seen: Vec<u8>,
}

impl Membership {
    pub fn new(group: i32, user: i32, note: Option<&str>) -> Self {
        Self {
            id: 0,
            group,
            user,
            note: note.map(Into::into),
            seen: Vec::new(),
        }
    }

    /// Local state, never stored.
    pub fn seen(&self) -> &[u8] {
        &self.seen
    }
}

pub fn memberships<B: Backend>(backend: &mut B) {
    let mapper = Mapper::new(MapperConfig::default());
    mapper
        .register::<Membership>("group_membership")
        .expect("Failed to register Membership");
    clear::<Membership, B>(&mapper, backend);

    let mut rows = [
        Membership::new(1, 10, Some("owner")),
        Membership::new(1, 11, None),
        Membership::new(2, 10, Some("guest")),
    ];
    for row in rows.iter_mut() {
        mapper
            .insert(row, backend)
            .expect("Failed to insert a membership");
    }

    // Keyed by fk1, one entry per group
    let by_group = mapper
        .select::<Membership, B>(ResultShape::MapOfRefFk1, backend, "", &[])
        .expect("Failed to select the memberships by group")
        .into_ref_map::<i32>()
        .expect("Expected a map of references");
    assert_eq!(by_group.len(), 2);
    assert_eq!(by_group[&1].group, 1);
    assert_eq!(*by_group[&2], rows[2]);

    // Keyed by fk2, one entry per user
    let by_user = mapper
        .select::<Membership, B>(ResultShape::MapOfValFk2, backend, "", &[])
        .expect("Failed to select the memberships by user")
        .into_value_map::<i32>()
        .expect("Expected a map of values");
    assert_eq!(by_user.len(), 2);
    assert_eq!(by_user[&11], rows[1]);

    // Two predicates
    let found = mapper
        .select::<Membership, B>(
            ResultShape::SliceOfVal,
            backend,
            "GROUP_ID = :1 AND USER_ID = :2",
            &[1.into(), 10.into()],
        )
        .expect("Failed to select a membership")
        .into_values()
        .expect("Expected a slice of values");
    assert_eq!(found, [rows[0].clone()]);
    assert!(found[0].seen().is_empty());

    // No column marked fk3
    let error = mapper
        .select::<Membership, B>(ResultShape::MapOfValFk3, backend, "", &[])
        .expect_err("Selecting a map keyed by fk3 should fail");
    assert!(matches!(
        error.downcast_ref::<MappingError>(),
        Some(MappingError::MissingShapeRole {
            role: Role::ForeignKey3,
            ..
        })
    ));
}

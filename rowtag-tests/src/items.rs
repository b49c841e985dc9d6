use crate::clear;
use rowtag::{Backend, Entity, Mapper, ResultShape};

#[derive(Entity, Debug, Default, Clone, PartialEq)]
pub struct Item {
    #[db = "id,pk"]
    pub id: i64,
    pub name: String,
    #[db = "fk1"]
    pub owner_id: i64,
}

pub fn items<B: Backend>(backend: &mut B) {
    let mapper = Mapper::default();
    clear::<Item, B>(&mapper, backend);

    // Insert
    let mut pen = Item {
        id: 0,
        name: "pen".into(),
        owner_id: 7,
    };
    let mut book = Item {
        id: 0,
        name: "book".into(),
        owner_id: 7,
    };
    let mut lamp = Item {
        id: 0,
        name: "lamp".into(),
        owner_id: 9,
    };
    for item in [&mut pen, &mut book, &mut lamp] {
        let result = mapper
            .insert(item, backend)
            .expect("Failed to insert an item");
        assert_eq!(result.rows_affected, 1);
        assert!(result.returned.is_some());
    }
    assert_ne!(pen.id, 0);
    assert_ne!(pen.id, book.id);
    assert_ne!(book.id, lamp.id);

    // Select by primary key
    let found = mapper
        .select::<Item, B>(ResultShape::SliceOfVal, backend, "ID = :1", &[pen.id.into()])
        .expect("Failed to select the pen")
        .into_values()
        .expect("Expected a slice of values");
    assert_eq!(found, [pen.clone()]);

    // Map keyed by primary key
    let all = mapper
        .select::<Item, B>(ResultShape::MapOfValPk, backend, "", &[])
        .expect("Failed to select all the items")
        .into_value_map::<i64>()
        .expect("Expected a map of values");
    assert_eq!(all.len(), 3);
    assert_eq!(all[&book.id], book);
    assert_eq!(all[&lamp.id], lamp);

    // Explicit WHERE, references
    let owned = mapper
        .select::<Item, B>(
            ResultShape::SliceOfRef,
            backend,
            "WHERE OWNER_ID = :1",
            &[7.into()],
        )
        .expect("Failed to select the items of owner 7")
        .into_refs()
        .expect("Expected a slice of references");
    assert_eq!(owned.len(), 2);
    assert!(owned.iter().all(|v| v.owner_id == 7));

    // Update
    book.name = "notebook".into();
    book.owner_id = 9;
    let result = mapper
        .update(&book, backend)
        .expect("Failed to update the book");
    assert_eq!(result.rows_affected, 1);
    let by_owner = mapper
        .select::<Item, B>(ResultShape::MapOfValPk, backend, "OWNER_ID = :1", &[9.into()])
        .expect("Failed to select the items of owner 9")
        .into_value_map::<i64>()
        .expect("Expected a map of values");
    assert_eq!(by_owner.len(), 2);
    assert_eq!(by_owner[&book.id].name, "notebook");

    // Delete
    let result = mapper
        .delete(&pen, backend)
        .expect("Failed to delete the pen");
    assert_eq!(result.rows_affected, 1);
    let result = mapper
        .delete(&pen, backend)
        .expect("Failed to delete the pen again");
    assert_eq!(result.rows_affected, 0);
    let remaining = mapper
        .select::<Item, B>(ResultShape::SliceOfVal, backend, "", &[])
        .expect("Failed to select the remaining items")
        .into_values()
        .expect("Expected a slice of values");
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|v| v.id != pen.id));
}

#[cfg(test)]
mod tests {
    use rowtag::{
        Backend, ColumnType, Entity, GenericSqlWriter, LogConfig, MappingError, Mapper,
        MapperConfig, Param, ResultShape, Role, Row, RowsAffected, Statement, Value,
    };
    use rowtag_memory::MemoryBackend;
    use rowtag_tests::{init_logs, silent_logs};
    use std::{sync::Arc, thread, vec};
    use time::{PrimitiveDateTime, macros::datetime};

    #[derive(Entity, Debug, Default, Clone, PartialEq)]
    struct Item {
        #[db = "id,pk"]
        pub id: i64,
        pub name: String,
        #[db = "fk1"]
        pub owner_id: i64,
    }

    #[derive(Entity, Debug, Default, Clone, PartialEq)]
    struct Event {
        #[db = "event_id,id,pk"]
        pub id: u32,
        #[db = "at"]
        pub happened_at: Option<PrimitiveDateTime>,
        #[db = "fk2"]
        pub item: Option<i64>,
    }

    /// Backend accepting every statement without returning anything.
    #[derive(Default)]
    struct Blackhole {
        prepared: Vec<String>,
    }

    struct BlackholeStatement;

    impl Statement for BlackholeStatement {
        type Rows = vec::IntoIter<rowtag::Result<Row>>;

        fn execute(&mut self, _params: &[Param]) -> rowtag::Result<RowsAffected> {
            Ok(RowsAffected {
                rows_affected: 1,
                returned: None,
            })
        }

        fn query(&mut self, _params: &[Value]) -> rowtag::Result<Self::Rows> {
            Ok(Vec::new().into_iter())
        }
    }

    impl Backend for Blackhole {
        type SqlWriter = GenericSqlWriter;
        type Statement<'s> = BlackholeStatement;

        fn sql_writer(&self) -> Self::SqlWriter {
            GenericSqlWriter
        }

        fn prepare(
            &mut self,
            sql: &str,
            _column_types: &[ColumnType],
        ) -> rowtag::Result<Self::Statement<'_>> {
            self.prepared.push(sql.to_string());
            Ok(BlackholeStatement)
        }
    }

    fn item(name: &str, owner_id: i64) -> Item {
        Item {
            id: 0,
            name: name.into(),
            owner_id,
        }
    }

    #[test]
    fn insert_populates_identity() {
        init_logs();
        let mapper = Mapper::default();
        let mut backend = MemoryBackend::new();
        let mut pen = item("pen", 7);
        let result = mapper.insert(&mut pen, &mut backend).unwrap();
        assert_eq!(result.returned, Some(Value::Int64(Some(1))));
        assert_eq!(pen.id, 1);
        assert_eq!(
            backend.last_statement(),
            Some("INSERT INTO ITEM (NAME, OWNER_ID) VALUES (:1, :2) RETURNING ID INTO :RET_VAL")
        );
        let stored = &backend.table("ITEM").unwrap().rows[0];
        assert_eq!(stored.get("ID"), Some(&Value::Int64(Some(1))));
        assert_eq!(stored.get("NAME"), Some(&Value::Varchar(Some("pen".into()))));
    }

    #[test]
    fn insert_requires_returned_identity() {
        let mapper = Mapper::default();
        let mut backend = Blackhole::default();
        let mut pen = item("pen", 7);
        silent_logs! {
            let error = mapper.insert(&mut pen, &mut backend).unwrap_err();
            assert!(format!("{error:#}").contains("identity column `ID`"));
        }
        assert_eq!(pen.id, 0);
    }

    #[test]
    fn round_trip() {
        let mapper = Mapper::default();
        let mut backend = MemoryBackend::new();
        let mut event = Event {
            id: 0,
            happened_at: Some(datetime!(2025-01-02 03:04:05)),
            item: Some(4),
        };
        mapper.insert(&mut event, &mut backend).unwrap();
        assert_eq!(event.id, 1);
        let found = mapper
            .select::<Event, _>(
                ResultShape::SliceOfVal,
                &mut backend,
                "EVENT_ID = :1",
                &[event.id.into()],
            )
            .unwrap()
            .into_values()
            .unwrap();
        assert_eq!(found, [event.clone()]);
        assert_eq!(
            backend.last_statement(),
            Some("SELECT AT, ITEM, EVENT_ID FROM EVENT WHERE EVENT_ID = :1")
        );
    }

    #[test]
    fn update_and_delete() {
        let mapper = Mapper::default();
        let mut backend = MemoryBackend::new();
        let mut pen = item("pen", 7);
        let mut cup = item("cup", 8);
        mapper.insert(&mut pen, &mut backend).unwrap();
        mapper.insert(&mut cup, &mut backend).unwrap();

        pen.name = "marker".into();
        let result = mapper.update(&pen, &mut backend).unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(
            backend.last_statement(),
            Some("UPDATE ITEM SET NAME = :1, OWNER_ID = :2 WHERE ID = :3")
        );

        let result = mapper.delete(&cup, &mut backend).unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(
            backend.last_statement(),
            Some("DELETE FROM ITEM WHERE ID = :WHERE_VAL")
        );
        let items = mapper
            .select::<Item, _>(ResultShape::MapOfValPk, &mut backend, "", &[])
            .unwrap()
            .into_value_map::<i64>()
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[&pen.id], pen);
    }

    #[test]
    fn keyed_shape_fails_before_prepare() {
        let mapper = Mapper::default();
        let mut backend = MemoryBackend::new();
        silent_logs! {
            let error = mapper
                .select::<Item, _>(ResultShape::MapOfRefFk2, &mut backend, "", &[])
                .unwrap_err();
            assert!(matches!(
                error.downcast_ref::<MappingError>(),
                Some(MappingError::MissingShapeRole {
                    entity: "Item",
                    role: Role::ForeignKey2,
                    ..
                })
            ));
        }
        assert!(backend.history().is_empty());
    }

    #[test]
    fn missing_primary_key() {
        #[derive(Entity, Default)]
        struct Note {
            pub text: String,
        }
        let mapper = Mapper::default();
        let mut backend = Blackhole::default();
        let note = Note {
            text: "hello".into(),
        };
        silent_logs! {
            let update = mapper.update(&note, &mut backend);
            let delete = mapper.delete(&note, &mut backend);
            for error in [update.unwrap_err(), delete.unwrap_err()] {
                assert_eq!(
                    error.downcast_ref::<MappingError>(),
                    Some(&MappingError::MissingRole {
                        entity: "Note",
                        role: Role::PrimaryKey,
                    })
                );
            }
        }
        assert!(backend.prepared.is_empty());
    }

    #[test]
    fn register_and_schema() {
        let mapper = Mapper::new(
            MapperConfig::default()
                .with_schema("SHOP")
                .with_log(LogConfig::silent()),
        );
        assert_eq!(mapper.config().schema, "SHOP");
        assert!(!mapper.config().log.insert);
        let table = mapper.register::<Item>("goods").unwrap();
        assert_eq!(table.name, "GOODS");
        assert!(Arc::ptr_eq(&table, &mapper.metadata::<Item>().unwrap()));
        silent_logs! {
            assert!(mapper.register::<Item>("items").is_err());
        }
        let mut backend = Blackhole::default();
        let mut pen = item("pen", 1);
        mapper.update(&pen, &mut backend).unwrap();
        mapper.delete(&pen, &mut backend).unwrap();
        let _ = mapper.insert(&mut pen, &mut backend);
        mapper
            .select::<Item, _>(ResultShape::SliceOfVal, &mut backend, "ID = :1", &[1.into()])
            .unwrap();
        assert_eq!(
            backend.prepared,
            [
                "UPDATE SHOP.GOODS SET NAME = :1, OWNER_ID = :2 WHERE ID = :3",
                "DELETE FROM SHOP.GOODS WHERE ID = :WHERE_VAL",
                "INSERT INTO SHOP.GOODS (NAME, OWNER_ID) VALUES (:1, :2) RETURNING ID INTO :RET_VAL",
                "SELECT NAME, OWNER_ID, ID FROM SHOP.GOODS WHERE ID = :1",
            ]
        );
    }

    #[test]
    fn shared_between_threads() {
        let mapper = Arc::new(Mapper::default());
        let handles = (0..4)
            .map(|i| {
                let mapper = mapper.clone();
                thread::spawn(move || {
                    let mut backend = MemoryBackend::new();
                    let mut value = item("thread", i);
                    mapper.insert(&mut value, &mut backend).unwrap();
                    mapper.metadata::<Item>().unwrap()
                })
            })
            .collect::<Vec<_>>();
        let tables = handles
            .into_iter()
            .map(|v| v.join().unwrap())
            .collect::<Vec<_>>();
        assert!(tables.iter().all(|v| Arc::ptr_eq(v, &tables[0])));
        assert_eq!(mapper.registry().len().unwrap(), 1);
    }
}

#[cfg(test)]
mod tests {
    use rowtag::{
        Entity, MappingError, ResultShape, Role, Row, Selection, TableMetadata, Value, key_column,
        materialize,
    };
    use rowtag_tests::{init_logs, silent_logs};
    use std::sync::Arc;

    #[derive(Entity, Debug, Default, Clone, PartialEq)]
    struct Order {
        #[db = "id,pk"]
        pub id: i64,
        #[db = "customer,fk1"]
        pub customer_id: i32,
        #[db = "fk2"]
        pub store: Option<i32>,
        pub total: f64,
        note: String,
    }

    fn row(customer: i32, store: Option<i32>, total: f64, id: i64) -> rowtag::Result<Row> {
        Ok(vec![
            Value::Int32(Some(customer)),
            Value::Int32(store),
            Value::Float64(Some(total)),
            Value::Int64(Some(id)),
        ]
        .into_boxed_slice())
    }

    fn order(id: i64, customer_id: i32, store: Option<i32>, total: f64) -> Order {
        Order {
            id,
            customer_id,
            store,
            total,
            note: String::new(),
        }
    }

    fn table() -> TableMetadata {
        TableMetadata::resolve::<Order>(None).unwrap()
    }

    #[test]
    fn columns() {
        assert_eq!(
            table().column_names().collect::<Vec<_>>(),
            ["CUSTOMER", "STORE", "TOTAL", "ID"]
        );
        assert!(order(1, 1, None, 0.0).note.is_empty());
    }

    #[test]
    fn slice_of_values() {
        let rows = vec![row(1, Some(3), 9.5, 10), row(2, None, 1.0, 11)];
        let result = materialize::<Order, _>(&table(), ResultShape::SliceOfVal, rows).unwrap();
        assert_eq!(
            result,
            Selection::Values(vec![order(10, 1, Some(3), 9.5), order(11, 2, None, 1.0)])
        );
    }

    #[test]
    fn slice_of_refs() {
        let rows = vec![row(1, Some(3), 9.5, 10)];
        let result = materialize::<Order, _>(&table(), ResultShape::SliceOfRef, rows)
            .unwrap()
            .into_refs()
            .unwrap();
        assert_eq!(result, [Arc::new(order(10, 1, Some(3), 9.5))]);
    }

    #[test]
    fn empty() {
        for shape in ResultShape::ALL {
            let result = materialize::<Order, _>(&table(), shape, Vec::new());
            match shape.key_role() {
                Some(Role::ForeignKey3 | Role::ForeignKey4) => assert!(result.is_err()),
                _ => assert!(result.unwrap().is_empty()),
            }
        }
    }

    #[test]
    fn map_by_primary_key() {
        let rows = vec![row(1, Some(3), 9.5, 10), row(1, Some(4), 2.0, 11)];
        let result = materialize::<Order, _>(&table(), ResultShape::MapOfValPk, rows)
            .unwrap()
            .into_value_map::<i64>()
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[&11], order(11, 1, Some(4), 2.0));
    }

    #[test]
    fn map_by_foreign_key_last_wins() {
        init_logs();
        let rows = vec![
            row(1, Some(3), 9.5, 10),
            row(2, Some(3), 4.0, 11),
            row(1, None, 2.0, 12),
        ];
        let result = materialize::<Order, _>(&table(), ResultShape::MapOfRefFk1, rows)
            .unwrap()
            .into_ref_map::<i32>()
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[&1].id, 12);
        assert_eq!(result[&2].id, 11);
    }

    #[test]
    fn map_by_nullable_key() {
        let rows = vec![row(1, Some(3), 9.5, 10), row(2, None, 4.0, 11)];
        let result = materialize::<Order, _>(&table(), ResultShape::MapOfValFk2, rows)
            .unwrap()
            .into_value_map::<Option<i32>>()
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[&None].id, 11);
        assert_eq!(result[&Some(3)].id, 10);
    }

    #[test]
    fn missing_role() {
        let error = key_column(&table(), ResultShape::MapOfRefFk3).unwrap_err();
        assert_eq!(
            error.downcast_ref::<MappingError>(),
            Some(&MappingError::MissingShapeRole {
                entity: "Order",
                shape: ResultShape::MapOfRefFk3,
                role: Role::ForeignKey3,
            })
        );
        assert_eq!(
            error.to_string(),
            "Unable to make a map of references keyed by fk3 for type `Order`: it does not have an exported field marked `fk3`"
        );
        assert_eq!(key_column(&table(), ResultShape::SliceOfVal).unwrap(), None);
        assert_eq!(key_column(&table(), ResultShape::MapOfValFk2).unwrap(), Some(1));
    }

    #[test]
    fn bad_rows() {
        silent_logs! {
            let short = vec![Ok(vec![Value::Int32(Some(1))].into_boxed_slice())];
            assert!(materialize::<Order, _>(&table(), ResultShape::SliceOfVal, short).is_err());
            let wrong_type = vec![Ok(vec![
                Value::Varchar(Some("x".into())),
                Value::Int32(None),
                Value::Float64(Some(1.0)),
                Value::Int64(Some(1)),
            ]
            .into_boxed_slice())];
            assert!(
                materialize::<Order, _>(&table(), ResultShape::SliceOfVal, wrong_type).is_err()
            );
            let failed = vec![row(1, None, 1.0, 1), Err(rowtag::Error::msg("connection lost"))];
            assert!(materialize::<Order, _>(&table(), ResultShape::SliceOfVal, failed).is_err());
        }
    }

    #[test]
    fn wrong_accessor() {
        let result =
            materialize::<Order, _>(&table(), ResultShape::SliceOfVal, vec![row(1, None, 1.0, 1)])
                .unwrap();
        assert!(result.clone().into_refs().is_err());
        assert!(result.clone().into_value_map::<i64>().is_err());
        assert!(result.into_ref_map::<i64>().is_err());
    }
}

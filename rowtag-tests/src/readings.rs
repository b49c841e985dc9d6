use crate::clear;
use rowtag::{Backend, Entity, Mapper, ResultShape};
use rust_decimal::Decimal;
use time::{PrimitiveDateTime, macros::datetime};
use uuid::Uuid;

#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Reading {
    #[db = "pk"]
    pub code: String,
    pub value: Option<f64>,
    pub taken_at: Option<PrimitiveDateTime>,
    pub valid: bool,
    pub small: Option<u8>,
    pub payload: Option<Vec<u8>>,
    pub sensor: Option<Uuid>,
    pub amount: Decimal,
    #[db = "-"]
    pub transient: u32,
}

pub fn readings<B: Backend>(backend: &mut B) {
    let mapper = Mapper::default();
    clear::<Reading, B>(&mapper, backend);

    let mut full = Reading {
        code: "R-1".into(),
        value: Some(21.5),
        taken_at: Some(datetime!(2025-03-01 10:30:00)),
        valid: true,
        small: Some(255),
        payload: Some(vec![1, 2, 3]),
        sensor: Some(
            Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").expect("Valid uuid"),
        ),
        amount: Decimal::new(12345, 2),
        transient: 0,
    };
    let mut empty = Reading {
        code: "R-2".into(),
        value: None,
        taken_at: None,
        valid: false,
        small: None,
        payload: None,
        sensor: None,
        amount: Decimal::ZERO,
        transient: 0,
    };
    for reading in [&mut full, &mut empty] {
        let result = mapper
            .insert(reading, backend)
            .expect("Failed to insert a reading");
        assert_eq!(result.returned, None);
    }

    let all = mapper
        .select::<Reading, B>(ResultShape::MapOfValPk, backend, "", &[])
        .expect("Failed to select the readings")
        .into_value_map::<String>()
        .expect("Expected a map of values");
    assert_eq!(all.len(), 2);
    assert_eq!(all["R-1"], full);
    assert_eq!(all["R-2"], empty);

    // Excluded fields are neither written nor read
    full.transient = 99;
    full.value = None;
    full.small = Some(1);
    mapper
        .update(&full, backend)
        .expect("Failed to update a reading");
    let found = mapper
        .select::<Reading, B>(ResultShape::SliceOfVal, backend, "CODE = :1", &["R-1".into()])
        .expect("Failed to select a reading")
        .into_values()
        .expect("Expected a slice of values");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, None);
    assert_eq!(found[0].small, Some(1));
    assert_eq!(found[0].transient, 0);
}

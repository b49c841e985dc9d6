#[cfg(test)]
mod tests {
    use rowtag_core::{AsValue, ColumnType, Value};
    use rust_decimal::Decimal;
    use std::{
        borrow::Cow,
        collections::{HashMap, hash_map::DefaultHasher},
        hash::{Hash, Hasher},
        sync::Arc,
    };
    use time::macros::datetime;
    use uuid::Uuid;

    fn hash(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Int32(Some(0)).is_null());
        assert_ne!(Value::Int32(None), Value::Int64(None));
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
    }

    #[test]
    fn value_bool() {
        let val = true.as_value();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(None));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert!(bool::try_from_value(val).unwrap());
        assert!(bool::try_from_value(8_i16.as_value()).unwrap());
        assert!(!bool::try_from_value(0_u64.as_value()).unwrap());
        assert!(bool::try_from_value(Value::Varchar(Some("true".into()))).is_err());
    }

    #[test]
    fn value_integers() {
        assert_eq!(i64::try_from_value(Value::Int8(Some(-3))).unwrap(), -3);
        assert_eq!(u8::try_from_value(Value::Int64(Some(255))).unwrap(), 255);
        assert!(u8::try_from_value(Value::Int64(Some(256))).is_err());
        assert!(u32::try_from_value(Value::Int32(Some(-1))).is_err());
        assert_eq!(
            i32::try_from_value(Value::Decimal(Some(Decimal::new(4200, 2)))).unwrap(),
            42
        );
        assert!(i32::try_from_value(Value::Decimal(Some(Decimal::new(4201, 2)))).is_err());
        assert!(i32::try_from_value(Value::Int32(None)).is_err());
        assert!(i16::try_from_value(Value::Float64(Some(1.0))).is_err());
    }

    #[test]
    fn value_floats() {
        assert_eq!(f64::try_from_value(Value::Float32(Some(1.5))).unwrap(), 1.5);
        assert_eq!(f64::try_from_value(Value::Int32(Some(7))).unwrap(), 7.0);
        assert_eq!(f32::try_from_value(Value::Float64(Some(0.25))).unwrap(), 0.25);
        assert!(f32::try_from_value(Value::Float64(Some(1e300))).is_err());
        assert_eq!(
            Value::Float64(Some(f64::NAN)),
            Value::Float64(Some(f64::NAN))
        );
        assert_eq!(
            hash(&Value::Float64(Some(2.5))),
            hash(&Value::Float64(Some(2.5)))
        );
    }

    #[test]
    fn value_text_and_binary() {
        let val = String::from("hello").as_value();
        assert_eq!(val, Value::Varchar(Some("hello".into())));
        let text: Cow<'static, str> = AsValue::try_from_value(val).unwrap();
        assert_eq!(text, "hello");
        let val: Value = "static".into();
        assert_eq!(val, Value::Varchar(Some("static".into())));
        let blob = vec![1u8, 2, 3].as_value();
        assert_eq!(blob, Value::Blob(Some([1u8, 2, 3].into())));
        assert_eq!(Vec::<u8>::try_from_value(blob).unwrap(), [1, 2, 3]);
    }

    #[test]
    fn value_option_and_wrappers() {
        assert_eq!(None::<i32>.as_value(), Value::Int32(None));
        assert_eq!(Some(5u16).as_value(), Value::UInt16(Some(5)));
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int64(None)).unwrap(),
            None
        );
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int64(Some(9))).unwrap(),
            Some(9)
        );
        assert_eq!(*Box::<i8>::try_from_value(Value::Int8(Some(1))).unwrap(), 1);
        assert_eq!(Arc::new(3i64).as_value(), Value::Int64(Some(3)));
    }

    #[test]
    fn value_time_and_uuid() {
        let local = datetime!(2024-05-06 07:08:09);
        let val = local.as_value();
        assert_eq!(val, Value::Timestamp(Some(local)));
        let offset = datetime!(2024-05-06 09:08:09 +02:00);
        assert_eq!(
            time::PrimitiveDateTime::try_from_value(Value::TimestampWithTimezone(Some(offset)))
                .unwrap(),
            local
        );
        let uuid = Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").unwrap();
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(uuid.to_string()))).unwrap(),
            uuid
        );
    }

    #[test]
    fn value_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Value::Int64(Some(1)), "one");
        map.insert(Value::Varchar(Some("two".into())), "two");
        map.insert(Value::Int64(Some(1)), "uno");
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Value::Int64(Some(1))], "uno");
    }

    #[test]
    fn column_type_coerce() {
        assert_eq!(
            ColumnType::Int64.coerce(Value::Int32(Some(4))).unwrap(),
            Value::Int64(Some(4))
        );
        assert_eq!(
            ColumnType::NullableInt64.coerce(Value::Null).unwrap(),
            Value::Int64(None)
        );
        assert!(ColumnType::Int64.coerce(Value::Null).is_err());
        assert_eq!(
            ColumnType::Default.coerce(Value::Decimal(Some(Decimal::ONE))).unwrap(),
            Value::Decimal(Some(Decimal::ONE))
        );
        assert_eq!(
            ColumnType::Binary.coerce(Value::Blob(Some([7u8].into()))).unwrap(),
            Value::Blob(Some([7u8].into()))
        );
        assert_eq!(ColumnType::UInt8.empty_value(), Value::UInt8(None));
        assert!(ColumnType::NullableBool.is_nullable());
        assert!(!ColumnType::Bool.is_nullable());
        assert_eq!(ColumnType::Timestamp.nullable(), ColumnType::NullableTimestamp);
        assert_eq!(ColumnType::Default.nullable(), ColumnType::Default);
    }
}

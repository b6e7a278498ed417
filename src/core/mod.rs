// Module declarations
pub mod error;
pub mod value;
pub mod row;

// Re-exports for convenience
pub use error::DatabaseError;
pub use value::Value;
pub use row::{Row, RowId};

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Real(3.5).to_string(), "3.5");
        assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Integer(42).as_int(), Some(42));
        assert_eq!(Value::Text("hello".to_string()).as_int(), None);
        assert_eq!(Value::Text("hello".to_string()).as_text(), Some("hello"));
        assert_eq!(Value::Boolean(false).as_bool(), Some(false));
        assert_eq!(Value::Integer(1).as_bool(), None);
    }

    #[test]
    fn test_loose_equality_is_numeric_between_numbers() {
        assert!(Value::Integer(1).loose_eq(&Value::Real(1.0)));
        assert!(!Value::Integer(1).loose_eq(&Value::Integer(2)));
        assert!(Value::Text("5".into()).loose_eq(&Value::Integer(5)));
        assert!(Value::Null.loose_eq(&Value::Null));
        assert!(!Value::Null.loose_eq(&Value::Text("NULL".into())));
    }

    #[test]
    fn test_compare_numeric_vs_lexical() {
        // 10 > 9 numerically, but "10" < "9" lexically
        assert_eq!(Value::Integer(10).compare(&Value::Integer(9)), Some(Ordering::Greater));
        assert_eq!(
            Value::Text("10".into()).compare(&Value::Text("9".into())),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Null.compare(&Value::Integer(1)), None);
    }

    #[test]
    fn test_strict_equality() {
        assert!(Value::Null.strict_eq(&Value::Null));
        assert!(Value::Integer(2).strict_eq(&Value::Real(2.0)));
        assert!(!Value::Text("2".into()).strict_eq(&Value::Integer(2)));
        assert!(!Value::Boolean(true).strict_eq(&Value::Integer(1)));
    }

    #[test]
    fn test_sort_cmp_puts_null_first() {
        let mut values = vec![Value::Integer(3), Value::Null, Value::Integer(1)];
        values.sort_by(Value::sort_cmp);
        assert_eq!(values, vec![Value::Null, Value::Integer(1), Value::Integer(3)]);
    }

    #[test]
    fn test_sort_cmp_ranks_types_before_values() {
        let mut values = vec![
            Value::Text("9".into()),
            Value::Integer(10),
            Value::Real(9.5),
            Value::Boolean(true),
            Value::Text("10".into()),
            Value::Null,
            Value::Integer(9),
        ];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Boolean(true),
                Value::Integer(9),
                Value::Real(9.5),
                Value::Integer(10),
                Value::Text("10".into()),
                Value::Text("9".into()),
            ]
        );
    }

    #[test]
    fn test_sort_cmp_compares_integers_and_reals_exactly() {
        let big = i64::MAX - 1;
        // Rounds up to 2^63 as f64
        assert_eq!(Value::Integer(big).sort_cmp(&Value::Real(big as f64)), Ordering::Less);
        assert_eq!(Value::Integer(2).sort_cmp(&Value::Real(2.0)), Ordering::Equal);
        assert_eq!(Value::Integer(0).sort_cmp(&Value::Real(-0.0)), Ordering::Equal);
        assert_eq!(Value::Integer(-2).sort_cmp(&Value::Real(-1.5)), Ordering::Less);
        assert_eq!(Value::Real(f64::NAN).sort_cmp(&Value::Integer(i64::MAX)), Ordering::Greater);
        assert_eq!(Value::Real(f64::NEG_INFINITY).sort_cmp(&Value::Integer(i64::MIN)), Ordering::Less);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(Value::Text("x".into()).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(Value::from(serde_json::json!(7)), Value::Integer(7));
        assert_eq!(Value::from(serde_json::json!(7.5)), Value::Real(7.5));
        assert_eq!(Value::from(serde_json::json!("x")), Value::Text("x".into()));
        assert_eq!(Value::from(serde_json::json!({"a": 1})), Value::Text("{\"a\":1}".into()));
    }

    #[test]
    fn test_row_id_from_key() {
        assert_eq!(RowId::from_key("12"), RowId::Index(12));
        assert_eq!(RowId::from_key("-Nabc"), RowId::Key("-Nabc".into()));
        assert_eq!(RowId::from_key(""), RowId::Key(String::new()));
        assert_eq!(RowId::from_key("0"), RowId::Index(0));
        assert_eq!(RowId::from_key("007"), RowId::Key("007".into()));
        assert_eq!(RowId::from_key("00"), RowId::Key("00".into()));
    }

    #[test]
    fn test_row_namespacing_builds_new_row() {
        let row = crate::row! { "id" => 1, "name" => "Ohio" };
        let namespaced = row.namespaced("states");

        assert_eq!(namespaced.get("states.id"), Value::Integer(1));
        assert_eq!(namespaced.get("states.name"), Value::Text("Ohio".into()));
        assert!(!namespaced.contains("id"));
        // original untouched
        assert!(row.contains("id"));
    }

    #[test]
    fn test_row_missing_column_is_null() {
        let row = crate::row! { "a" => 1 };
        assert_eq!(row.get("b"), Value::Null);
    }

    #[test]
    fn test_row_patch() {
        let row = crate::row! { "a" => 1, "b" => 2 };
        let patched = row.patched(&crate::row! { "b" => 3, "c" => 4 });
        assert_eq!(patched, crate::row! { "a" => 1, "b" => 3, "c" => 4 });
    }
}

//! Property tests for evaluation determinism and aggregation guarantees.

use std::collections::HashMap;

use proptest::prelude::*;
use verdict::schema::rules::*;
use verdict::{FieldValue, Schema};

fn schema() -> Schema {
    Schema::new()
        .rules("name", "required|min_len:3|max_len:12|alpha")
        .rules("code", "alphanum|in:AB1,CD2,EF3")
        .rules("age", "min:18|max:65")
}

fn builder_schema() -> Schema {
    Schema::new()
        .field("name", [required(), min_len(3), max_len(12), alpha()])
        .field("code", [alphanum(), one_of(["AB1", "CD2", "EF3"])])
        .field("age", [min(18), max(65)])
}

fn field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Int),
        (-1000.0f64..1000.0).prop_map(FieldValue::Float),
        "[a-zA-Z0-9 ]{0,16}".prop_map(FieldValue::Text),
    ]
}

fn record() -> impl Strategy<Value = HashMap<String, FieldValue>> {
    proptest::collection::hash_map(
        prop_oneof![Just("name".to_string()), Just("code".to_string()), Just("age".to_string())],
        field_value(),
        0..=3,
    )
}

proptest! {
    #[test]
    fn evaluation_is_idempotent(record in record()) {
        let schema = schema();
        prop_assert_eq!(schema.evaluate(&record), schema.evaluate(&record));
    }

    #[test]
    fn grammar_and_builder_agree(record in record()) {
        prop_assert_eq!(schema().evaluate(&record), builder_schema().evaluate(&record));
    }

    #[test]
    fn validity_matches_empty_error_map(record in record()) {
        let (valid, errors) = schema().evaluate(&record);
        prop_assert_eq!(valid, errors.is_empty());
        for messages in errors.values() {
            prop_assert!(!messages.is_empty());
        }
    }

    #[test]
    fn missing_required_field_reports_exactly_once(record in record()) {
        let mut record = record;
        record.remove("name");
        let (_, errors) = schema().evaluate(&record);
        prop_assert_eq!(&errors["name"], &vec!["This field is required".to_string()]);
    }

    #[test]
    fn unknown_tokens_never_constrain(value in field_value()) {
        let schema = Schema::new().rules("x", "frobnicate|wibble:3");
        let record = HashMap::from([("x".to_string(), value)]);
        prop_assert!(schema.evaluate(&record).0);
    }
}

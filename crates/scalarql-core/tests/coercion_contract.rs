//! Contract tests for scalar descriptors shared across tasks.

use std::sync::Arc;

use scalarql_core::{
    CoercionErrorKind, CustomId, InternalValue, Literal, ScalarDescriptor, ScalarRegistry,
};
use serde_json::json;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_descriptor_and_registry_are_shareable() {
    assert_send_sync::<ScalarDescriptor>();
    assert_send_sync::<ScalarRegistry>();
    assert_send_sync::<InternalValue>();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_coercion_on_one_descriptor() {
    let descriptor = Arc::new(ScalarDescriptor::of::<CustomId>().unwrap());

    let mut handles = Vec::new();
    for i in 0..32 {
        let descriptor = Arc::clone(&descriptor);
        handles.push(tokio::spawn(async move {
            let raw = format!("id-{i}");
            let wire = descriptor
                .serialize(InternalValue::new(CustomId::new(raw.as_str())))
                .unwrap();
            let parsed = descriptor.parse_value(&wire).unwrap();
            let literal = descriptor
                .parse_literal(&Literal::String(raw.clone()))
                .unwrap();
            (raw, parsed, literal)
        }));
    }

    for handle in handles {
        let (raw, parsed, literal) = handle.await.unwrap();
        assert_eq!(parsed.downcast_ref::<CustomId>(), Some(&CustomId::new(raw.as_str())));
        assert_eq!(literal.downcast_ref::<CustomId>(), Some(&CustomId::new(raw.as_str())));
    }
}

#[test]
fn test_every_failure_is_a_typed_coercion_error() {
    let registry = ScalarRegistry::with_builtins();
    let odd_values = [
        InternalValue::new(vec![1u8, 2, 3]),
        InternalValue::new(Some(5i32)),
        InternalValue::new(json!({"nested": true})),
    ];

    for descriptor in registry.iter() {
        for value in &odd_values {
            let err = descriptor.serialize(value).unwrap_err();
            assert_eq!(err.kind, CoercionErrorKind::UnserializableValue);
            assert_eq!(err.scalar, descriptor.name());
        }
        let err = descriptor.parse_value(json!({"a": 1})).unwrap_err();
        assert_eq!(err.kind, CoercionErrorKind::InvalidVariableValue);
        let err = descriptor
            .parse_literal(&Literal::List(vec![]))
            .unwrap_err();
        assert_eq!(err.kind, CoercionErrorKind::InvalidLiteralValue);
    }
}

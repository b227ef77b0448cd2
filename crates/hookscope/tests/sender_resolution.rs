use hookscope::decode::{Registries, decode_change};
use hookscope::models::{ChangeValue, HasSender, Reference};
use serde_json::json;

fn post(value: serde_json::Value) -> ChangeValue {
    decode_change(Registries::standard(), "feed", &value).expect("post decodes")
}

#[test]
fn nested_from_object_is_the_sender() {
    let decoded = post(json!({
        "item": "post",
        "verb": "add",
        "from": {"id": "1", "name": "Nested"}
    }));
    assert_eq!(
        decoded.sender(),
        Some(Reference {
            id: Some("1".to_string()),
            name: Some("Nested".to_string()),
        })
    );
}

#[test]
fn flat_pair_is_the_sender_when_from_is_absent() {
    let decoded = post(json!({
        "item": "post",
        "verb": "add",
        "sender_id": 2,
        "sender_name": "Flat"
    }));
    assert_eq!(
        decoded.sender(),
        Some(Reference {
            id: Some("2".to_string()),
            name: Some("Flat".to_string()),
        })
    );
}

#[test]
fn nested_object_wins_when_both_shapes_are_present() {
    let decoded = post(json!({
        "item": "status",
        "verb": "add",
        "from": {"id": "1", "name": "Nested"},
        "sender_id": "2",
        "sender_name": "Flat"
    }));
    let ChangeValue::FeedStatus(status) = &decoded else {
        panic!("expected status, got {decoded:?}");
    };
    assert_eq!(status.sender().and_then(|sender| sender.name), Some("Nested".to_string()));
    assert_eq!(status.sender.sender_id.as_deref(), Some("2"));
}

#[test]
fn no_sender_fields_yields_none() {
    assert_eq!(post(json!({"item": "post", "verb": "add"})).sender(), None);
}

#[test]
fn variants_without_a_sender_report_none() {
    let decoded = decode_change(
        Registries::standard(),
        "leadgen",
        &json!({"leadgen_id": 1, "page_id": 2, "form_id": 3}),
    )
    .expect("leadgen decodes");
    assert!(decoded.sender_fields().is_none());
    assert_eq!(decoded.sender(), None);
}

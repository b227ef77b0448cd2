use hookscope::decode::{Registries, decode_change, decode_whatsapp_message};
use hookscope::models::whatsapp::WhatsappContent;
use hookscope::models::ChangeValue;
use serde_json::{Value, json};

fn messages_change(messages: Value) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "metadata": {"display_phone_number": "16505551111", "phone_number_id": 123_456_123},
        "contacts": [{"profile": {"name": "test user name"}, "wa_id": "16315551181"}],
        "messages": messages
    })
}

#[test]
fn image_message_decodes_its_media() {
    let value = messages_change(json!([{
        "from": "16315551181",
        "id": "ABGGFlA5Fpa",
        "timestamp": "1504902988",
        "type": "image",
        "image": {
            "caption": "This is a caption",
            "mime_type": "image/jpeg",
            "sha256": "81d3bd8a8db4868c9520ed47186e8b7c5789e61ff79f7f834be6950b808a90d3",
            "id": "2754859441498128"
        }
    }]));

    let decoded = decode_change(Registries::standard(), "messages", &value).expect("messages decode");
    let ChangeValue::WhatsappMessages(messages) = &decoded else {
        panic!("expected whatsapp messages, got {decoded:?}");
    };
    assert_eq!(messages.messaging_product.as_deref(), Some("whatsapp"));
    assert_eq!(
        messages
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.phone_number_id.as_deref()),
        Some("123456123")
    );
    assert_eq!(messages.contacts.len(), 1);

    let message = &messages.messages[0];
    assert_eq!(message.message_type, "image");
    assert_eq!(message.timestamp, Some(1_504_902_988));
    assert_eq!(message.content.kind(), "image");
    let media = message.media().expect("image content");
    assert_eq!(media.caption.as_deref(), Some("This is a caption"));
    assert_eq!(media.id.as_deref(), Some("2754859441498128"));
    assert!(message.text().is_none());
}

#[test]
fn unsupported_message_keeps_its_errors() {
    let message = decode_whatsapp_message(
        Registries::standard(),
        &json!({
            "from": "16315551181",
            "id": "ABGGFlA5Fpa",
            "timestamp": "1504902988",
            "type": "unsupported",
            "errors": [{
                "code": 131_051,
                "title": "Message type unknown",
                "message": "Message type unknown",
                "error_data": {"details": "Message type is currently not supported."}
            }]
        }),
    )
    .expect("unsupported message decodes");

    assert_eq!(message.message_type, "unsupported");
    assert_eq!(message.errors.len(), 1);
    assert_eq!(message.errors[0].code, Some(131_051));
    let unsupported = message.unsupported().expect("unsupported content");
    assert_eq!(unsupported.unsupported_type, None);
    assert_eq!(unsupported.declared_type, None);
}

#[test]
fn unregistered_type_decodes_as_unsupported_with_the_declared_tag() {
    let message = decode_whatsapp_message(
        Registries::standard(),
        &json!({"from": "1", "id": "x", "type": "poll", "poll": {"question": "?"}}),
    )
    .expect("unknown types never fail");

    assert_eq!(message.message_type, "poll");
    let unsupported = message.unsupported().expect("falls back to unsupported");
    assert_eq!(unsupported.declared_type.as_deref(), Some("poll"));

    let untagged = decode_whatsapp_message(Registries::standard(), &json!({"id": "y"}))
        .expect("missing type never fails");
    assert_eq!(untagged.message_type, "unsupported");
    assert!(untagged.unsupported().is_some());
}

#[test]
fn interactive_reply_and_context() {
    let message = decode_whatsapp_message(
        Registries::standard(),
        &json!({
            "from": "16315551181",
            "id": "wamid.2",
            "type": "interactive",
            "context": {"from": "16505551111", "id": "wamid.1"},
            "interactive": {
                "type": "button_reply",
                "button_reply": {"id": "unique-button-identifier-here", "title": "button-text"}
            }
        }),
    )
    .expect("interactive decodes");

    assert!(message.is_reply());
    let interactive = message.interactive().expect("interactive content");
    assert_eq!(
        interactive.selected().and_then(|option| option.title.as_deref()),
        Some("button-text")
    );
}

#[test]
fn shared_contacts_are_a_list() {
    let message = decode_whatsapp_message(
        Registries::standard(),
        &json!({
            "id": "wamid.3",
            "type": "contacts",
            "contacts": [{
                "name": {"formatted_name": "Ana Lee", "first_name": "Ana"},
                "phones": [{"phone": "+1 650 555 1234", "type": "WORK", "wa_id": "16505551234"}]
            }]
        }),
    )
    .expect("contacts decode");
    let contacts = message.contacts().expect("contacts content");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].phones.len(), 1);
}

#[test]
fn request_welcome_carries_no_body() {
    let message = decode_whatsapp_message(
        Registries::standard(),
        &json!({"from": "1", "id": "w", "type": "request_welcome"}),
    )
    .expect("welcome decodes");
    assert_eq!(message.content, WhatsappContent::RequestWelcome);
}

#[test]
fn statuses_decode_without_messages() {
    let value = json!({
        "messaging_product": "whatsapp",
        "statuses": [{
            "id": "wamid.gBGGSFcCNEOPAgkO_KJ55r4w_ww",
            "status": "delivered",
            "timestamp": "1666771418",
            "recipient_id": 16_315_551_181_i64,
            "conversation": {
                "id": "CONVERSATION_ID",
                "origin": {"type": "business_initiated"},
                "expiration_timestamp": "1666857818"
            },
            "pricing": {"billable": true, "pricing_model": "CBP", "category": "business_initiated"}
        }]
    });

    let decoded = decode_change(Registries::standard(), "messages", &value).expect("statuses decode");
    let ChangeValue::WhatsappMessages(messages) = decoded else {
        panic!("expected whatsapp messages");
    };
    assert!(messages.messages.is_empty());
    let status = &messages.statuses[0];
    assert_eq!(status.status.as_deref(), Some("delivered"));
    assert_eq!(status.recipient_id.as_deref(), Some("16315551181"));
    assert_eq!(
        status
            .conversation
            .as_ref()
            .and_then(|conversation| conversation.origin.as_ref())
            .and_then(|origin| origin.origin_type.as_deref()),
        Some("business_initiated")
    );
    assert_eq!(status.pricing.as_ref().and_then(|pricing| pricing.billable), Some(true));
}

#[test]
fn malformed_message_reports_its_index() {
    let value = messages_change(json!([
        {"id": "ok", "type": "text", "text": {"body": "hi"}},
        {"id": "bad", "type": "text", "text": {"body": ["not", "text"]}}
    ]));
    let error = decode_change(Registries::standard(), "messages", &value)
        .expect_err("array body must fail");
    assert!(
        error.to_string().contains("messages[1].text.body"),
        "unexpected error: {error}"
    );
}

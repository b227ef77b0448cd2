use hookscope::decode::{DecodeError, DecodePolicy, Decoder, ItemPosition, Registries, Surface};
use hookscope::models::EntryPayload;
use hookscope::decode_event_str;
use serde_json::{Value, json};

fn page_envelope() -> Value {
    json!({
        "object": "page",
        "entry": [
            {
                "id": "PAGE_ID",
                "time": 1_458_692_752_478_i64,
                "messaging": [
                    {"sender": {"id": "U1"}, "recipient": {"id": "PAGE_ID"}, "message": {"mid": "m1", "text": "hi"}},
                    {"sender": {"id": "U2"}, "recipient": {"id": "PAGE_ID"}, "read": {"watermark": {"bad": true}}},
                    {"sender": {"id": "U3"}, "recipient": {"id": "PAGE_ID"}, "delivery": {"watermark": 3}}
                ]
            },
            {
                "id": "PAGE_ID",
                "time": 1_458_692_752_999_i64,
                "changes": [
                    {"field": "feed", "value": {"item": "status", "verb": "add", "message": "status update"}},
                    {"field": "live_videos", "value": {"id": "v1", "status": "live"}}
                ]
            }
        ]
    })
}

#[test]
fn fail_fast_stops_at_the_first_bad_item() {
    let error = Decoder::standard()
        .decode_envelope(&page_envelope())
        .expect_err("second messaging item is malformed");

    assert_eq!(
        error.position(),
        Some(ItemPosition::item(0, Surface::Messaging, 1))
    );
    assert!(matches!(error.root_cause(), DecodeError::Structure { path, .. } if path == "read.watermark"));
    assert!(
        error.to_string().starts_with("entry 0, messaging item 1: "),
        "unexpected error: {error}"
    );
}

#[test]
fn best_effort_skips_the_bad_item_and_keeps_its_siblings() {
    let decoder = Decoder::new(Registries::standard(), DecodePolicy::BestEffort);
    let outcome = decoder
        .decode_envelope(&page_envelope())
        .expect("best effort does not abort on items");

    assert!(!outcome.is_clean());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(
        outcome.failures[0].position,
        ItemPosition::item(0, Surface::Messaging, 1)
    );

    let envelope = &outcome.envelope;
    assert_eq!(envelope.object.as_deref(), Some("page"));
    assert_eq!(envelope.entries.len(), 2);
    let senders = envelope
        .messaging_items()
        .filter_map(|item| item.sender_id())
        .collect::<Vec<_>>();
    assert_eq!(senders, ["U1", "U3"]);

    let kinds = envelope
        .changes()
        .map(|change| change.value.kind())
        .collect::<Vec<_>>();
    assert_eq!(kinds, ["feed_status", "unknown"]);
    assert_eq!(
        envelope.entries[1].time_utc().as_deref(),
        Some("2016-03-23T00:25:52.999Z")
    );
}

#[test]
fn empty_sequence_beside_changes_is_ignored() {
    let value = json!({
        "object": "page",
        "entry": [{
            "id": "1",
            "time": 1,
            "changes": [
                {"field": "feed", "value": {"item": "post"}},
                {"field": "conversations"}
            ],
            "messaging": []
        }]
    });

    for policy in [DecodePolicy::FailFast, DecodePolicy::BestEffort] {
        let outcome = Decoder::new(Registries::standard(), policy)
            .decode_envelope(&value)
            .expect("empty messaging does not conflict with changes");
        assert!(outcome.failures.is_empty(), "{policy:?}: {:?}", outcome.failures);
        assert_eq!(outcome.envelope.entries.len(), 1);
        let kinds = outcome.envelope.entries[0]
            .changes()
            .iter()
            .map(|change| change.value.kind())
            .collect::<Vec<_>>();
        assert_eq!(kinds, ["feed_post", "page_conversation"]);
    }
}

#[test]
fn entry_with_two_sequences_is_rejected() {
    let value = json!({
        "object": "page",
        "entry": [
            {
                "id": "1",
                "time": 1,
                "messaging": [{"sender": {"id": "U"}, "delivery": {"watermark": 1}}],
                "standby": [{"sender": {"id": "U"}, "read": {"watermark": 1}}]
            },
            {"id": "2", "time": 2, "standby": [{"sender": {"id": "U"}, "read": {"watermark": 1}}]}
        ]
    });

    let error = Decoder::standard()
        .decode_envelope(&value)
        .expect_err("mixed entry fails fast");
    assert_eq!(error.position(), Some(ItemPosition::entry(0)));
    assert!(matches!(error.root_cause(), DecodeError::EntryShape { .. }));
    assert!(
        error.to_string().contains("messaging and standby"),
        "unexpected error: {error}"
    );

    let outcome = Decoder::new(Registries::standard(), DecodePolicy::BestEffort)
        .decode_envelope(&value)
        .expect("best effort records the entry");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].position, ItemPosition::entry(0));
    assert_eq!(outcome.envelope.entries.len(), 1);
    let entry = &outcome.envelope.entries[0];
    assert!(entry.is_standby());
    assert!(matches!(&entry.payload, EntryPayload::Standby(items) if items.len() == 1));
}

#[test]
fn non_object_envelope_is_a_structural_error_under_both_policies() {
    for policy in [DecodePolicy::FailFast, DecodePolicy::BestEffort] {
        let error = Decoder::new(Registries::standard(), policy)
            .decode_envelope(&json!(["not", "an", "envelope"]))
            .expect_err("array envelope must fail");
        assert!(matches!(error, DecodeError::Structure { .. }), "{policy:?}: {error:?}");
    }
}

#[test]
fn decoding_is_deterministic() {
    let value = page_envelope();
    let decoder = Decoder::new(Registries::standard(), DecodePolicy::BestEffort);

    let first = decoder.decode_envelope(&value).expect("first decode");
    let second = decoder.decode_envelope(&value).expect("second decode");
    assert_eq!(first, second);
}

#[test]
fn registries_are_shared_across_threads() {
    let value = page_envelope();
    let decoder = Decoder::new(Registries::standard(), DecodePolicy::BestEffort);
    let expected = decoder.decode_envelope(&value).expect("baseline decode");

    let outcomes = std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| scope.spawn(|| decoder.decode_envelope(&value)))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("decode thread should not panic"))
            .collect::<Vec<_>>()
    });

    for outcome in outcomes {
        assert_eq!(outcome.expect("threaded decode"), expected);
    }
}

#[test]
fn decode_event_str_parses_and_decodes() {
    let envelope = decode_event_str(
        r#"{"object": "instagram", "entry": [{"id": "IG", "time": 1569262486134, "messaging": [
            {"sender": {"id": "IGSID"}, "recipient": {"id": "IG"}, "timestamp": 1569262485349,
             "message": {"mid": "m", "text": "hello"}}
        ]}]}"#,
    )
    .expect("body decodes");
    assert_eq!(envelope.object.as_deref(), Some("instagram"));
    assert_eq!(
        envelope
            .messaging_items()
            .next()
            .and_then(|item| item.message())
            .and_then(|message| message.text.as_deref()),
        Some("hello")
    );

    let error = decode_event_str("{not json").expect_err("invalid JSON must fail");
    assert!(error.to_string().contains("not valid JSON"));
}

use hookscope::decode::{DecodePolicy, Decoder, Registries};
use hookscope::report::{DecodeReport, ReportStatus, render_text_report};
use serde_json::{Value, json};

fn fixture_envelope() -> Value {
    json!({
        "object": "page",
        "entry": [
            {
                "id": "PAGE_ID",
                "time": 1_458_692_752_478_i64,
                "messaging": [
                    {
                        "sender": {"id": "U1"},
                        "recipient": {"id": "PAGE_ID"},
                        "timestamp": 1_458_692_752_478_i64,
                        "message": {"mid": "m1", "text": "Call me at +1 650 555 1234"}
                    },
                    {"sender": {"id": "U2"}, "game_play": {"game_id": "g"}}
                ]
            },
            {
                "id": "PAGE_ID",
                "time": 1_458_692_752_999_i64,
                "changes": [
                    {
                        "field": "feed",
                        "value": {"item": "status", "verb": "add", "message": "status update", "from": {"id": "7", "name": "Page"}}
                    },
                    {"field": "live_videos", "value": {"id": "v1"}}
                ]
            }
        ]
    })
}

fn build_report(redact: bool) -> DecodeReport {
    let registries = Registries::standard();
    let decoder = Decoder::new(registries, DecodePolicy::BestEffort);
    let outcome = decoder
        .decode_envelope(&fixture_envelope())
        .expect("best effort decode");

    let mut report = DecodeReport::new("fixture.jsonl", DecodePolicy::BestEffort, redact);
    report.record_outcome("line 1", &outcome, registries);
    report.record_document_failure("line 2", "invalid JSON: expected value at line 1 column 1");
    report
}

#[test]
fn text_report_lists_counts_failures_and_excerpts() {
    let report = build_report(false);
    assert_eq!(report.status, ReportStatus::Partial);
    assert_eq!(report.failure_count(), 2);

    insta::assert_snapshot!(render_text_report(&report), @r#"
    hookscope decode report
    source: fixture.jsonl
    policy: best_effort  redacted: no
    status: partial
    documents: 2 (decoded 1)
    entries: 2  changes: 2  messaging items: 1  standby items: 0  whatsapp messages: 0
    fallback changes: 1
    objects:
      page: 1
    change kinds:
      feed_status: 1
      unknown: 1
    unknown change keys:
      live_videos: 1
    messaging kinds:
      message: 1
    failures:
      line 1, entry 0, messaging item 1: messaging item carries none of the known payload keys (keys seen: [game_play, sender])
      line 2: invalid JSON: expected value at line 1 column 1
    excerpts:
      [line 1, entry 0, messaging item 0] message from U1: "Call me at +1 650 555 1234"
      [line 1, entry 1, change 0] feed_status from 7: "status update"
    "#);
}

#[test]
fn redacted_report_masks_text_and_drops_senders() {
    let report = build_report(true);
    let message = &report.excerpts[0];

    assert_eq!(message.text, "Call me at [REDACTED]");
    assert_eq!(message.redaction_classes, ["phone"]);
    assert_eq!(message.sender, None);
    assert_eq!(message.timestamp_utc.as_deref(), Some("2016-03-23T00:25:52.478Z"));
    assert!(report.excerpts.iter().all(|excerpt| excerpt.sender.is_none()));
    assert!(render_text_report(&report).contains("redacted: yes"));
}

#[test]
fn json_report_round_trips_through_serde() {
    let report = build_report(false);
    let rendered = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(rendered["schema_version"], json!("hookscope.report.v1"));
    assert_eq!(rendered["status"], json!("partial"));
    assert_eq!(rendered["unknown_change_keys"]["live_videos"], json!(1));
    assert!(rendered["excerpts"][0].get("redaction_classes").is_none());

    let parsed: DecodeReport = serde_json::from_value(rendered).expect("report parses back");
    assert_eq!(parsed, report);
}

#[test]
fn whatsapp_messages_and_nlp_kinds_are_counted() {
    let envelope = json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "messages": [
                        {"from": "15550001", "id": "w1", "timestamp": "1504902988", "type": "text", "text": {"body": "hello there"}},
                        {"from": "15550001", "id": "w2", "type": "poll"}
                    ]
                }
            }]
        }, {
            "id": "PAGE",
            "messaging": [{
                "sender": {"id": "U"},
                "message": {
                    "mid": "m",
                    "text": "tomorrow",
                    "nlp": {"entities": {
                        "wit$datetime:datetime": [{"value": "2026-10-18T00:00:00.000-07:00", "grain": "day"}],
                        "wit$distance:distance": [{"unit": "mile"}]
                    }}
                }
            }]
        }]
    });

    let registries = Registries::standard();
    let outcome = Decoder::new(registries, DecodePolicy::BestEffort)
        .decode_envelope(&envelope)
        .expect("decode");
    let mut report = DecodeReport::new("wa.json", DecodePolicy::BestEffort, false);
    report.record_outcome("document 1", &outcome, registries);

    assert_eq!(report.status, ReportStatus::Clean);
    assert_eq!(report.whatsapp_messages, 2);
    assert_eq!(report.whatsapp_kinds.get("text"), Some(&1));
    assert_eq!(report.whatsapp_kinds.get("unsupported"), Some(&1));
    assert_eq!(report.nlp_entity_kinds.get("datetime"), Some(&1));
    assert_eq!(report.nlp_reinterpretation_failures, 1);

    let whatsapp = report
        .excerpts
        .iter()
        .find(|excerpt| excerpt.kind == "whatsapp_text")
        .expect("whatsapp excerpt");
    assert_eq!(whatsapp.text, "hello there");
    assert_eq!(whatsapp.sender.as_deref(), Some("15550001"));
    assert_eq!(whatsapp.timestamp_utc.as_deref(), Some("2017-09-08T20:36:28.000Z"));
}

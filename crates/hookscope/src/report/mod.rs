//! Summary of a decode run over one input file.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::{DecodeOutcome, DecodePolicy, ItemPosition, Registries, Surface};
use crate::models::change::ChangeValue;
use crate::models::envelope::{Entry, EntryPayload};
use crate::models::messaging::{MessagingItem, MessagingPayload};
use crate::models::whatsapp::WhatsappMessage;
use crate::utils::content::{DEFAULT_EXCERPT_MAX_CHARS, derive_excerpt};
use crate::utils::redaction::redact_text;
use crate::utils::time::format_epoch;

pub const REPORT_SCHEMA_VERSION: &str = "hookscope.report.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Every document decoded without failures.
    Clean,
    /// Some items or documents failed; the rest decoded.
    Partial,
    /// Nothing decoded.
    Failed,
}

impl ReportStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportFailure {
    /// Document label, e.g. `document 2` or `line 7`.
    pub document: String,
    /// Position inside the envelope, absent for failures of the whole document.
    pub position: Option<String>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportExcerpt {
    pub document: String,
    pub position: String,
    pub kind: String,
    pub sender: Option<String>,
    pub timestamp_utc: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redaction_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DecodeReport {
    pub schema_version: String,
    pub source: String,
    pub policy: String,
    pub redacted: bool,
    pub status: ReportStatus,
    pub documents: usize,
    pub documents_decoded: usize,
    pub entries: usize,
    pub changes: usize,
    pub messaging_items: usize,
    pub standby_items: usize,
    pub whatsapp_messages: usize,
    pub fallback_changes: usize,
    pub shadowed_payloads: usize,
    pub nlp_reinterpretation_failures: usize,
    pub objects: BTreeMap<String, usize>,
    pub change_kinds: BTreeMap<String, usize>,
    pub unknown_change_keys: BTreeMap<String, usize>,
    pub messaging_kinds: BTreeMap<String, usize>,
    pub whatsapp_kinds: BTreeMap<String, usize>,
    pub nlp_entity_kinds: BTreeMap<String, usize>,
    pub failures: Vec<ReportFailure>,
    pub excerpts: Vec<ReportExcerpt>,
}

impl DecodeReport {
    #[must_use]
    pub fn new(source: impl Into<String>, policy: DecodePolicy, redacted: bool) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            source: source.into(),
            policy: policy.as_str().to_string(),
            redacted,
            status: ReportStatus::Clean,
            documents: 0,
            documents_decoded: 0,
            entries: 0,
            changes: 0,
            messaging_items: 0,
            standby_items: 0,
            whatsapp_messages: 0,
            fallback_changes: 0,
            shadowed_payloads: 0,
            nlp_reinterpretation_failures: 0,
            objects: BTreeMap::new(),
            change_kinds: BTreeMap::new(),
            unknown_change_keys: BTreeMap::new(),
            messaging_kinds: BTreeMap::new(),
            whatsapp_kinds: BTreeMap::new(),
            nlp_entity_kinds: BTreeMap::new(),
            failures: Vec::new(),
            excerpts: Vec::new(),
        }
    }

    /// A document that could not be parsed or decoded at all.
    pub fn record_document_failure(&mut self, document: &str, detail: impl Into<String>) {
        self.documents += 1;
        self.failures.push(ReportFailure {
            document: document.to_string(),
            position: None,
            detail: detail.into(),
        });
        self.refresh_status();
    }

    pub fn record_outcome(&mut self, document: &str, outcome: &DecodeOutcome, registries: &Registries) {
        self.documents += 1;
        self.documents_decoded += 1;

        let envelope = &outcome.envelope;
        if let Some(object) = &envelope.object {
            bump(&mut self.objects, object);
        }
        for (entry_index, entry) in envelope.entries.iter().enumerate() {
            self.entries += 1;
            self.record_entry(document, entry_index, entry, registries);
        }

        for failure in &outcome.failures {
            self.failures.push(ReportFailure {
                document: document.to_string(),
                position: Some(failure.position.to_string()),
                detail: failure.error.to_string(),
            });
        }
        self.refresh_status();
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    fn record_entry(&mut self, document: &str, entry_index: usize, entry: &Entry, registries: &Registries) {
        match &entry.payload {
            EntryPayload::Empty => {}
            EntryPayload::Changes(changes) => {
                for (index, change) in changes.iter().enumerate() {
                    self.changes += 1;
                    bump(&mut self.change_kinds, change.value.kind());
                    let position = ItemPosition::item(entry_index, Surface::Change, index);
                    self.record_change(document, position, entry, &change.value);
                }
            }
            EntryPayload::Messaging(items) | EntryPayload::Standby(items) => {
                let surface = if entry.is_standby() {
                    self.standby_items += items.len();
                    Surface::Standby
                } else {
                    self.messaging_items += items.len();
                    Surface::Messaging
                };
                for (index, item) in items.iter().enumerate() {
                    let position = ItemPosition::item(entry_index, surface, index);
                    self.record_messaging_item(document, position, item, registries);
                }
            }
        }
    }

    fn record_change(
        &mut self,
        document: &str,
        position: ItemPosition,
        entry: &Entry,
        value: &ChangeValue,
    ) {
        if let Some(unknown) = value.as_unknown() {
            self.fallback_changes += 1;
            bump(&mut self.unknown_change_keys, &unknown.key().to_string());
        }

        if let ChangeValue::WhatsappMessages(messages) = value {
            for message in &messages.messages {
                self.record_whatsapp_message(document, position, message);
            }
            return;
        }

        if let Some(text) = value.message_text() {
            let sender = value.sender().and_then(|sender| sender.id);
            self.push_excerpt(document, position, value.kind(), sender, entry.time_utc(), text);
        }
    }

    fn record_whatsapp_message(&mut self, document: &str, position: ItemPosition, message: &WhatsappMessage) {
        self.whatsapp_messages += 1;
        bump(&mut self.whatsapp_kinds, message.content.kind());

        let text = message
            .text()
            .and_then(|text| text.body.as_deref())
            .or_else(|| message.media().and_then(|media| media.caption.as_deref()));
        if let Some(text) = text {
            self.push_excerpt(
                document,
                position,
                &format!("whatsapp_{}", message.content.kind()),
                message.from.clone(),
                message.timestamp.and_then(format_epoch),
                text,
            );
        }
    }

    fn record_messaging_item(
        &mut self,
        document: &str,
        position: ItemPosition,
        item: &MessagingItem,
        registries: &Registries,
    ) {
        let payload = item.payload();
        bump(&mut self.messaging_kinds, payload.key());
        if !item.shadowed_payload_keys.is_empty() {
            self.shadowed_payloads += 1;
        }

        if let Some(nlp) = item.message().and_then(|message| message.nlp.as_ref()) {
            for entity in nlp.entities.iter().chain(nlp.traits.iter()) {
                match entity.specialize(registries.nlp()) {
                    Ok(specific) => bump(&mut self.nlp_entity_kinds, specific.tag().as_str()),
                    Err(_) => self.nlp_reinterpretation_failures += 1,
                }
            }
        }

        let text = match payload {
            MessagingPayload::Message(message) => message.text.as_deref(),
            MessagingPayload::MessageEdit(edit) => edit.text.as_deref(),
            MessagingPayload::Postback(postback) => postback.title.as_deref(),
            _ => None,
        };
        if let Some(text) = text {
            self.push_excerpt(
                document,
                position,
                payload.key(),
                item.sender_id().map(str::to_string),
                item.timestamp_utc(),
                text,
            );
        }
    }

    fn push_excerpt(
        &mut self,
        document: &str,
        position: ItemPosition,
        kind: &str,
        sender: Option<String>,
        timestamp_utc: Option<String>,
        text: &str,
    ) {
        let (text, redaction_classes) = if self.redacted {
            let redacted = redact_text(text);
            (redacted.text, redacted.redaction_classes)
        } else {
            (text.to_string(), Vec::new())
        };
        let Some(text) = derive_excerpt(&text, DEFAULT_EXCERPT_MAX_CHARS) else {
            return;
        };
        let sender = if self.redacted { None } else { sender };

        self.excerpts.push(ReportExcerpt {
            document: document.to_string(),
            position: position.to_string(),
            kind: kind.to_string(),
            sender,
            timestamp_utc,
            text,
            redaction_classes,
        });
    }

    fn refresh_status(&mut self) {
        self.status = if self.failures.is_empty() {
            ReportStatus::Clean
        } else if self.documents_decoded == 0 {
            ReportStatus::Failed
        } else {
            ReportStatus::Partial
        };
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    *counts.entry(key.to_string()).or_default() += 1;
}

#[must_use]
pub fn render_text_report(report: &DecodeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "hookscope decode report");
    let _ = writeln!(out, "source: {}", report.source);
    let _ = writeln!(
        out,
        "policy: {}  redacted: {}",
        report.policy,
        if report.redacted { "yes" } else { "no" }
    );
    let _ = writeln!(out, "status: {}", report.status.as_str());
    let _ = writeln!(
        out,
        "documents: {} (decoded {})",
        report.documents, report.documents_decoded
    );
    let _ = writeln!(
        out,
        "entries: {}  changes: {}  messaging items: {}  standby items: {}  whatsapp messages: {}",
        report.entries,
        report.changes,
        report.messaging_items,
        report.standby_items,
        report.whatsapp_messages
    );
    let _ = writeln!(out, "fallback changes: {}", report.fallback_changes);
    if report.shadowed_payloads > 0 {
        let _ = writeln!(out, "items with shadowed payloads: {}", report.shadowed_payloads);
    }
    if report.nlp_reinterpretation_failures > 0 {
        let _ = writeln!(
            out,
            "nlp reinterpretation failures: {}",
            report.nlp_reinterpretation_failures
        );
    }

    write_counts(&mut out, "objects", &report.objects);
    write_counts(&mut out, "change kinds", &report.change_kinds);
    write_counts(&mut out, "unknown change keys", &report.unknown_change_keys);
    write_counts(&mut out, "messaging kinds", &report.messaging_kinds);
    write_counts(&mut out, "whatsapp kinds", &report.whatsapp_kinds);
    write_counts(&mut out, "nlp entity kinds", &report.nlp_entity_kinds);

    if !report.failures.is_empty() {
        let _ = writeln!(out, "failures:");
        for failure in &report.failures {
            match &failure.position {
                Some(position) => {
                    let _ = writeln!(out, "  {}, {position}: {}", failure.document, failure.detail);
                }
                None => {
                    let _ = writeln!(out, "  {}: {}", failure.document, failure.detail);
                }
            }
        }
    }

    if !report.excerpts.is_empty() {
        let _ = writeln!(out, "excerpts:");
        for excerpt in &report.excerpts {
            let sender = excerpt
                .sender
                .as_deref()
                .map(|sender| format!(" from {sender}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  [{}, {}] {}{sender}: {:?}",
                excerpt.document, excerpt.position, excerpt.kind, excerpt.text
            );
        }
    }

    out
}

fn write_counts(out: &mut String, title: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for (key, count) in counts {
        let _ = writeln!(out, "  {key}: {count}");
    }
}

#[must_use]
pub fn json_schema() -> Value {
    let schema = schemars::schema_for!(DecodeReport);
    match serde_json::to_value(schema) {
        Ok(value) => value,
        Err(error) => {
            panic!("failed to serialize generated decode report schema: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeReport, ReportStatus, json_schema};
    use crate::decode::DecodePolicy;

    #[test]
    fn status_tracks_failures_and_decoded_documents() {
        let mut report = DecodeReport::new("input.json", DecodePolicy::BestEffort, false);
        assert_eq!(report.status, ReportStatus::Clean);

        report.record_document_failure("line 1", "invalid JSON: expected value");
        assert_eq!(report.status, ReportStatus::Failed);
        assert_eq!(report.documents, 1);
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn schema_names_the_report_fields() {
        let schema = json_schema();
        let properties = schema
            .get("properties")
            .and_then(|value| value.as_object())
            .expect("schema should list properties");
        for field in ["schema_version", "status", "change_kinds", "failures", "excerpts"] {
            assert!(properties.contains_key(field), "missing {field}");
        }
    }
}

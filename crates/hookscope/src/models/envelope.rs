use serde::Deserialize;
use serde_json::Value;

use crate::decode::coerce;
use crate::models::change::Change;
use crate::models::messaging::MessagingItem;
use crate::utils::time::format_epoch;

/// A single webhook delivery.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventEnvelope {
    /// `page`, `instagram`, `whatsapp_business_account`, ...
    pub object: Option<String>,
    pub entries: Vec<Entry>,
}

impl EventEnvelope {
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.entries.iter().flat_map(|entry| entry.changes())
    }

    /// Messaging and standby items across all entries.
    pub fn messaging_items(&self) -> impl Iterator<Item = &MessagingItem> {
        self.entries.iter().flat_map(|entry| entry.messaging_items())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entry {
    pub id: Option<String>,
    pub time: Option<i64>,
    pub payload: EntryPayload,
}

impl Entry {
    #[must_use]
    pub fn time_utc(&self) -> Option<String> {
        self.time.and_then(format_epoch)
    }

    #[must_use]
    pub fn changes(&self) -> &[Change] {
        match &self.payload {
            EntryPayload::Changes(changes) => changes,
            _ => &[],
        }
    }

    #[must_use]
    pub fn messaging_items(&self) -> &[MessagingItem] {
        match &self.payload {
            EntryPayload::Messaging(items) | EntryPayload::Standby(items) => items,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_standby(&self) -> bool {
        matches!(self.payload, EntryPayload::Standby(_))
    }
}

/// The one sequence an entry carries.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EntryPayload {
    #[default]
    Empty,
    Changes(Vec<Change>),
    Messaging(Vec<MessagingItem>),
    /// Items delivered to a secondary receiver under the handover protocol.
    Standby(Vec<MessagingItem>),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub(crate) struct EnvelopeHeader {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub entry: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub(crate) struct EntryHeader {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub time: Option<i64>,
    #[serde(default)]
    pub changes: Option<Vec<Value>>,
    #[serde(default)]
    pub messaging: Option<Vec<Value>>,
    #[serde(default)]
    pub standby: Option<Vec<Value>>,
}

/// A change before its value is dispatched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ChangeHeader {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

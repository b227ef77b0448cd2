//! Turns raw webhook JSON into typed envelopes.
//!
//! Dispatch happens in three places: changes by `(field, item, verb)`,
//! messaging items by which payload key is present, and WhatsApp messages by
//! their `type` tag. Unregistered change keys fall back to
//! [`ChangeValue::Unknown`] instead of failing.

pub mod coerce;
pub mod error;
pub mod key;
pub mod registry;
pub mod structure;

use serde_json::Value;
use tracing::{debug, warn};

pub use error::{DecodeError, ItemPosition, Surface};
pub use key::{ChangeKey, message_type, normalize_entity_name, probe_payload_keys};
pub use registry::{
    ChangeDecoder, ChangeRegistry, MessagingDecoder, MessagingRegistry, NlpRegistry, Registries,
    RegistriesBuilder, WhatsappDecoder, WhatsappRegistry,
};
pub use structure::{Decoded, decode_child, decode_record, decode_retained};

use crate::models::change::{Change, ChangeValue, UnknownChange};
use crate::models::envelope::{
    ChangeHeader, Entry, EntryHeader, EntryPayload, EnvelopeHeader, EventEnvelope,
};
use crate::models::messaging::{MessagingHeader, MessagingItem};
use crate::models::whatsapp::{
    UnsupportedContent, WhatsappContent, WhatsappMessage, WhatsappMessageHeader,
    WhatsappMessagesHeader, WhatsappMessagesValue,
};

/// What to do when a change or messaging item fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Abort on the first failure.
    #[default]
    FailFast,
    /// Skip the failing item, record it, and keep decoding its siblings.
    BestEffort,
}

impl DecodePolicy {
    #[must_use]
    pub const fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Self::FailFast
        } else {
            Self::BestEffort
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::BestEffort => "best_effort",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeFailure {
    pub position: ItemPosition,
    pub error: DecodeError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome {
    pub envelope: EventEnvelope,
    /// Items skipped under [`DecodePolicy::BestEffort`]. Always empty for fail-fast.
    pub failures: Vec<DecodeFailure>,
}

impl DecodeOutcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registries: &'r Registries,
    policy: DecodePolicy,
}

impl Decoder<'static> {
    /// Standard registries, fail-fast.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(Registries::standard(), DecodePolicy::FailFast)
    }
}

impl<'r> Decoder<'r> {
    #[must_use]
    pub const fn new(registries: &'r Registries, policy: DecodePolicy) -> Self {
        Self { registries, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> DecodePolicy {
        self.policy
    }

    #[must_use]
    pub const fn registries(&self) -> &'r Registries {
        self.registries
    }

    pub fn decode_envelope(&self, value: &Value) -> Result<DecodeOutcome, DecodeError> {
        let header: EnvelopeHeader = decode_record(value)?;
        let fail_fast = self.policy == DecodePolicy::FailFast;

        let mut failures = Vec::new();
        let mut entries = Vec::with_capacity(header.entry.len());
        for (index, raw_entry) in header.entry.iter().enumerate() {
            match self.decode_entry(index, raw_entry, &mut failures) {
                Ok(entry) => entries.push(entry),
                Err(error) if fail_fast => return Err(error),
                Err(error) => {
                    let position = ItemPosition::entry(index);
                    warn!(%position, error = %error.root_cause(), "skipping entry that failed to decode");
                    failures.push(DecodeFailure {
                        position,
                        error: error.root_cause().clone(),
                    });
                }
            }
        }

        Ok(DecodeOutcome {
            envelope: EventEnvelope {
                object: header.object,
                entries,
            },
            failures,
        })
    }

    /// Decodes one entry. Item failures are returned under fail-fast and
    /// appended to `failures` otherwise; entry-level failures are always returned.
    pub fn decode_entry(
        &self,
        index: usize,
        value: &Value,
        failures: &mut Vec<DecodeFailure>,
    ) -> Result<Entry, DecodeError> {
        let position = ItemPosition::entry(index);
        let header: EntryHeader = decode_record(value).map_err(|error| error.at(position))?;

        let sequences = [
            ("changes", Surface::Change, header.changes.as_deref()),
            ("messaging", Surface::Messaging, header.messaging.as_deref()),
            ("standby", Surface::Standby, header.standby.as_deref()),
        ];
        // Empty sequences carry nothing and never conflict with a populated one.
        let populated = sequences
            .iter()
            .filter(|(_, _, items)| items.is_some_and(|items| !items.is_empty()))
            .collect::<Vec<_>>();
        if populated.len() > 1 {
            let names = populated
                .iter()
                .map(|(name, _, _)| *name)
                .collect::<Vec<_>>();
            return Err(DecodeError::EntryShape {
                message: format!(
                    "entry carries {} together; expected at most one",
                    names.join(" and ")
                ),
            }
            .at(position));
        }

        let selected = populated
            .first()
            .copied()
            .or_else(|| sequences.iter().find(|(_, _, items)| items.is_some()))
            .and_then(|(_, surface, items)| items.map(|items| (*surface, items)));

        let payload = match selected {
            Some((Surface::Change, changes)) => EntryPayload::Changes(self.decode_items(
                index,
                Surface::Change,
                changes,
                failures,
                |raw| self.decode_change_record(raw),
            )?),
            Some((Surface::Messaging, items)) => EntryPayload::Messaging(self.decode_items(
                index,
                Surface::Messaging,
                items,
                failures,
                |raw| self.decode_messaging_item(raw),
            )?),
            Some((Surface::Standby, items)) => EntryPayload::Standby(self.decode_items(
                index,
                Surface::Standby,
                items,
                failures,
                |raw| self.decode_messaging_item(raw),
            )?),
            None => EntryPayload::Empty,
        };

        Ok(Entry {
            id: header.id,
            time: header.time,
            payload,
        })
    }

    pub fn decode_change(&self, field: &str, value: &Value) -> Result<ChangeValue, DecodeError> {
        decode_change(self.registries, field, value)
    }

    pub fn decode_messaging_item(&self, value: &Value) -> Result<MessagingItem, DecodeError> {
        decode_messaging_item(self.registries, value)
    }

    pub fn decode_whatsapp_message(&self, value: &Value) -> Result<WhatsappMessage, DecodeError> {
        decode_whatsapp_message(self.registries, value)
    }

    fn decode_change_record(&self, raw: &Value) -> Result<Change, DecodeError> {
        if raw.get("field").is_none_or(Value::is_null) {
            return Err(DecodeError::missing_field("change", "field"));
        }
        let header: ChangeHeader = decode_record(raw)?;
        let value = self.decode_change(&header.field, &header.value)?;
        Ok(Change {
            field: header.field,
            value,
        })
    }

    fn decode_items<T>(
        &self,
        entry: usize,
        surface: Surface,
        raw_items: &[Value],
        failures: &mut Vec<DecodeFailure>,
        decode: impl Fn(&Value) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let fail_fast = self.policy == DecodePolicy::FailFast;
        let mut decoded = Vec::with_capacity(raw_items.len());
        for (index, raw) in raw_items.iter().enumerate() {
            let position = ItemPosition::item(entry, surface, index);
            match decode(raw) {
                Ok(item) => decoded.push(item),
                Err(error) if fail_fast => return Err(error.at(position)),
                Err(error) => {
                    warn!(%position, %error, "skipping item that failed to decode");
                    failures.push(DecodeFailure { position, error });
                }
            }
        }
        Ok(decoded)
    }
}

/// Dispatches a change value by `(field, item, verb)`. Keys without a registered
/// decoder come back as [`ChangeValue::Unknown`] holding the untouched value.
pub fn decode_change(
    registries: &Registries,
    field: &str,
    value: &Value,
) -> Result<ChangeValue, DecodeError> {
    let key = ChangeKey::extract(field, value);
    match registries.changes().resolve(&key) {
        Some(decoder) => decoder(value, registries),
        None => {
            debug!(change_key = %key, "no decoder registered; keeping raw change value");
            Ok(ChangeValue::Unknown(UnknownChange::new(key, value.clone())))
        }
    }
}

/// Decodes a messaging item by the highest-priority payload key it carries.
pub fn decode_messaging_item(
    registries: &Registries,
    value: &Value,
) -> Result<MessagingItem, DecodeError> {
    let header: MessagingHeader = decode_record(value)?;

    let messaging = registries.messaging();
    let mut present = key::present_keys(value, messaging.keys()).into_iter();
    let Some(chosen) = present.next() else {
        let keys_seen = value
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();
        return Err(DecodeError::MissingPayload { keys_seen });
    };
    let shadowed = present.map(str::to_string).collect::<Vec<_>>();
    if !shadowed.is_empty() {
        warn!(
            payload_key = chosen,
            shadowed = ?shadowed,
            "messaging item carries more than one payload key; lower-priority keys ignored"
        );
    }

    let Some(decoder) = messaging.decoder_for(chosen) else {
        return Err(DecodeError::MissingPayload {
            keys_seen: vec![chosen.to_string()],
        });
    };
    let payload = decoder(value)?;
    Ok(MessagingItem::from_parts(header, payload, shadowed))
}

/// Decodes a WhatsApp message by its `type` tag. Types without a registered
/// decoder, and messages without a tag, decode as unsupported content.
pub fn decode_whatsapp_message(
    registries: &Registries,
    value: &Value,
) -> Result<WhatsappMessage, DecodeError> {
    let header: WhatsappMessageHeader = decode_record(value)?;
    let declared = message_type(value);

    let content = match declared.and_then(|tag| registries.whatsapp().decoder_for(tag)) {
        Some(decoder) => decoder(value)?,
        None => {
            debug!(message_type = ?declared, "no decoder registered for message type");
            let mut unsupported: UnsupportedContent =
                decode_child(value, "unsupported")?.unwrap_or_default();
            unsupported.declared_type = declared.map(str::to_string);
            WhatsappContent::Unsupported(unsupported)
        }
    };

    let message_type = declared.unwrap_or("unsupported").to_string();
    Ok(WhatsappMessage::from_parts(header, message_type, content))
}

pub(crate) fn decode_whatsapp_messages_value(
    registries: &Registries,
    value: &Value,
) -> Result<WhatsappMessagesValue, DecodeError> {
    let header: WhatsappMessagesHeader = decode_record(value)?;
    let messages = header
        .messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            decode_whatsapp_message(registries, message)
                .map_err(|error| error.within(&format!("messages[{index}]")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WhatsappMessagesValue {
        messaging_product: header.messaging_product,
        metadata: header.metadata,
        contacts: header.contacts,
        messages,
        statuses: header.statuses,
        errors: header.errors,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DecodePolicy, Decoder, Registries};

    #[test]
    fn policy_maps_from_the_fail_fast_flag() {
        assert_eq!(DecodePolicy::from_fail_fast(true), DecodePolicy::FailFast);
        assert_eq!(DecodePolicy::from_fail_fast(false), DecodePolicy::BestEffort);
        assert_eq!(DecodePolicy::default().as_str(), "fail_fast");
    }

    #[test]
    fn entry_without_a_sequence_is_empty() {
        let outcome = Decoder::standard()
            .decode_envelope(&json!({"object": "page", "entry": [{"id": "1", "time": 1}]}))
            .expect("envelope decodes");
        assert!(outcome.is_clean());
        assert!(outcome.envelope.entries[0].changes().is_empty());
        assert!(outcome.envelope.entries[0].messaging_items().is_empty());
    }

    #[test]
    fn missing_change_field_is_reported() {
        let decoder = Decoder::new(Registries::standard(), DecodePolicy::BestEffort);
        let outcome = decoder
            .decode_envelope(&json!({"entry": [{"changes": [{"value": {}}]}]}))
            .expect("best effort keeps going");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.failures[0].error.to_string(),
            "change is missing required field `field`"
        );
    }
}

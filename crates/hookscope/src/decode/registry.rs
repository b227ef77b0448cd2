//! Immutable lookup tables from dispatch keys to decoders.
//!
//! The standard tables are built once on first use and shared by reference.
//! Callers that need a different table build their own [`Registries`] value
//! through [`Registries::builder`].

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::DecodeError;
use super::key::{ChangeKey, PAYLOAD_KEYS, normalize_entity_name};
use super::structure::{decode_child, decode_record};
use crate::models::change::ChangeValue;
use crate::models::messaging::MessagingPayload;
use crate::models::nlp::{EntityKindTag, EntityRequirements};
use crate::models::whatsapp::WhatsappContent;

/// Decodes a change value. Receives the registries so nested surfaces, such as
/// WhatsApp messages inside a `messages` change, can dispatch further.
pub type ChangeDecoder = fn(&Value, &Registries) -> Result<ChangeValue, DecodeError>;

/// Decodes the payload of a messaging item. Receives the whole item.
pub type MessagingDecoder = fn(&Value) -> Result<MessagingPayload, DecodeError>;

/// Decodes the content of a WhatsApp message. Receives the whole message.
pub type WhatsappDecoder = fn(&Value) -> Result<WhatsappContent, DecodeError>;

static STANDARD: LazyLock<Registries> = LazyLock::new(|| {
    Registries {
        changes: standard_changes(),
        messaging: standard_messaging(),
        whatsapp: standard_whatsapp(),
        nlp: NlpRegistry::standard(),
    }
});

#[derive(Debug, Clone)]
pub struct Registries {
    changes: ChangeRegistry,
    messaging: MessagingRegistry,
    whatsapp: WhatsappRegistry,
    nlp: NlpRegistry,
}

impl Registries {
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Starts from a copy of the standard tables.
    #[must_use]
    pub fn builder() -> RegistriesBuilder {
        RegistriesBuilder {
            registries: Self::standard().clone(),
        }
    }

    #[must_use]
    pub fn changes(&self) -> &ChangeRegistry {
        &self.changes
    }

    #[must_use]
    pub fn messaging(&self) -> &MessagingRegistry {
        &self.messaging
    }

    #[must_use]
    pub fn whatsapp(&self) -> &WhatsappRegistry {
        &self.whatsapp
    }

    #[must_use]
    pub fn nlp(&self) -> &NlpRegistry {
        &self.nlp
    }
}

#[derive(Debug)]
pub struct RegistriesBuilder {
    registries: Registries,
}

impl RegistriesBuilder {
    /// A builder with every table empty.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            registries: Registries {
                changes: ChangeRegistry::default(),
                messaging: MessagingRegistry::default(),
                whatsapp: WhatsappRegistry::default(),
                nlp: NlpRegistry::default(),
            },
        }
    }

    #[must_use]
    pub fn change(mut self, key: ChangeKey, decoder: ChangeDecoder) -> Self {
        self.registries.changes.decoders.insert(key, decoder);
        self
    }

    #[must_use]
    pub fn without_change(mut self, key: &ChangeKey) -> Self {
        self.registries.changes.decoders.remove(key);
        self
    }

    /// Registers a payload key. New keys rank below every existing one; an
    /// existing key keeps its rank and gets the new decoder.
    #[must_use]
    pub fn messaging_payload(mut self, key: impl Into<String>, decoder: MessagingDecoder) -> Self {
        let key = key.into();
        let entries = &mut self.registries.messaging.entries;
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = decoder,
            None => entries.push((key, decoder)),
        }
        self
    }

    #[must_use]
    pub fn whatsapp_type(mut self, message_type: impl Into<String>, decoder: WhatsappDecoder) -> Self {
        self.registries
            .whatsapp
            .decoders
            .insert(message_type.into(), decoder);
        self
    }

    #[must_use]
    pub fn nlp_kind(mut self, entity_name: impl Into<String>, tag: EntityKindTag) -> Self {
        self.registries.nlp.kinds.insert(entity_name.into(), tag);
        self
    }

    #[must_use]
    pub fn entity_requirements(mut self, requirements: EntityRequirements) -> Self {
        self.registries.nlp.requirements = requirements;
        self
    }

    #[must_use]
    pub fn build(self) -> Registries {
        self.registries
    }
}

#[derive(Clone, Default)]
pub struct ChangeRegistry {
    decoders: HashMap<ChangeKey, ChangeDecoder>,
}

impl ChangeRegistry {
    /// The decoder for the most specific registered candidate of `key`.
    #[must_use]
    pub fn resolve(&self, key: &ChangeKey) -> Option<ChangeDecoder> {
        key.lookup_candidates()
            .iter()
            .find_map(|candidate| self.decoders.get(candidate).copied())
    }

    #[must_use]
    pub fn contains(&self, key: &ChangeKey) -> bool {
        self.decoders.contains_key(key)
    }

    /// Registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&ChangeKey> {
        let mut keys = self.decoders.keys().collect::<Vec<_>>();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

/// Payload keys with their decoders, highest priority first.
#[derive(Clone, Default)]
pub struct MessagingRegistry {
    entries: Vec<(String, MessagingDecoder)>,
}

impl MessagingRegistry {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn decoder_for(&self, key: &str) -> Option<MessagingDecoder> {
        self.entries
            .iter()
            .find(|(registered, _)| registered == key)
            .map(|(_, decoder)| *decoder)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct WhatsappRegistry {
    decoders: HashMap<String, WhatsappDecoder>,
}

impl WhatsappRegistry {
    #[must_use]
    pub fn decoder_for(&self, message_type: &str) -> Option<WhatsappDecoder> {
        self.decoders.get(message_type).copied()
    }

    /// Registered message types, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = self.decoders.keys().map(String::as_str).collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

/// Entity names to kinds, plus the per-kind required fields used when
/// specializing.
#[derive(Debug, Clone, Default)]
pub struct NlpRegistry {
    kinds: HashMap<String, EntityKindTag>,
    requirements: EntityRequirements,
}

impl NlpRegistry {
    #[must_use]
    pub fn standard() -> Self {
        let kinds = EntityKindTag::ALL
            .into_iter()
            .filter(|tag| *tag != EntityKindTag::Custom)
            .map(|tag| (tag.as_str().to_string(), tag))
            .collect();
        Self {
            kinds,
            requirements: EntityRequirements::standard().clone(),
        }
    }

    /// Kind for an entity name after normalization; unregistered names are custom.
    #[must_use]
    pub fn kind_for(&self, entity_name: &str) -> EntityKindTag {
        self.kinds
            .get(normalize_entity_name(entity_name))
            .copied()
            .unwrap_or(EntityKindTag::Custom)
    }

    #[must_use]
    pub fn requirements(&self) -> &EntityRequirements {
        &self.requirements
    }

    /// Registered entity names, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = self.kinds.keys().map(String::as_str).collect::<Vec<_>>();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for ChangeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.keys().into_iter().map(ToString::to_string))
            .finish()
    }
}

impl fmt::Debug for MessagingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl fmt::Debug for WhatsappRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

/// A `null` or missing change value decodes as an empty object.
fn change_record<T: DeserializeOwned>(
    value: &Value,
    wrap: fn(T) -> ChangeValue,
) -> Result<ChangeValue, DecodeError> {
    let decoded = match value {
        Value::Null => decode_record(&Value::Object(Map::new())),
        body => decode_record(body),
    };
    decoded.map(wrap)
}

fn standard_changes() -> ChangeRegistry {
    let table: [(ChangeKey, ChangeDecoder); 30] = [
        (ChangeKey::item("feed", "post"), |value, _| {
            change_record(value, ChangeValue::FeedPost)
        }),
        (ChangeKey::item("feed", "status"), |value, _| {
            change_record(value, ChangeValue::FeedStatus)
        }),
        (ChangeKey::item("feed", "comment"), |value, _| {
            change_record(value, ChangeValue::FeedComment)
        }),
        (ChangeKey::item("feed", "reaction"), |value, _| {
            change_record(value, ChangeValue::FeedReaction)
        }),
        (ChangeKey::item("feed", "like"), |value, _| {
            change_record(value, ChangeValue::FeedLike)
        }),
        (ChangeKey::item("feed", "share"), |value, _| {
            change_record(value, ChangeValue::FeedShare)
        }),
        (ChangeKey::item("feed", "event"), |value, _| {
            change_record(value, ChangeValue::FeedEvent)
        }),
        (ChangeKey::exact("feed", "photo", "add"), |value, _| {
            change_record(value, ChangeValue::FeedPhotoAdd)
        }),
        (ChangeKey::exact("feed", "photo", "edited"), |value, _| {
            change_record(value, ChangeValue::FeedPhotoAdd)
        }),
        (ChangeKey::exact("feed", "photo", "remove"), |value, _| {
            change_record(value, ChangeValue::FeedPhotoRemove)
        }),
        (ChangeKey::exact("feed", "video", "add"), |value, _| {
            change_record(value, ChangeValue::FeedVideo)
        }),
        (ChangeKey::exact("feed", "video", "edited"), |value, _| {
            change_record(value, ChangeValue::FeedVideo)
        }),
        (ChangeKey::exact("feed", "video", "remove"), |value, _| {
            change_record(value, ChangeValue::FeedVideoRemove)
        }),
        (ChangeKey::exact("feed", "album", "add"), |value, _| {
            change_record(value, ChangeValue::FeedAlbumAdd)
        }),
        (ChangeKey::exact("feed", "album", "edited"), |value, _| {
            change_record(value, ChangeValue::FeedAlbumEdited)
        }),
        (ChangeKey::item("ratings", "rating"), |value, _| {
            change_record(value, ChangeValue::RatingsRating)
        }),
        (ChangeKey::item("ratings", "comment"), |value, _| {
            change_record(value, ChangeValue::RatingsComment)
        }),
        (ChangeKey::item("ratings", "like"), |value, _| {
            change_record(value, ChangeValue::RatingsLike)
        }),
        (ChangeKey::item("ratings", "reaction"), |value, _| {
            change_record(value, ChangeValue::RatingsReaction)
        }),
        (ChangeKey::item("mention", "post"), |value, _| {
            change_record(value, ChangeValue::Mention)
        }),
        (ChangeKey::item("mention", "comment"), |value, _| {
            change_record(value, ChangeValue::Mention)
        }),
        (ChangeKey::field("conversations"), |value, _| {
            change_record(value, ChangeValue::PageConversation)
        }),
        (ChangeKey::field("leadgen"), |value, _| {
            change_record(value, ChangeValue::Leadgen)
        }),
        (ChangeKey::field("permissions"), |value, _| {
            change_record(value, ChangeValue::Permission)
        }),
        (ChangeKey::field("messages"), |value, registries| {
            super::decode_whatsapp_messages_value(registries, value)
                .map(ChangeValue::WhatsappMessages)
        }),
        (ChangeKey::field("account_update"), |value, _| {
            change_record(value, ChangeValue::WhatsappAccountUpdate)
        }),
        (ChangeKey::field("account_review_update"), |value, _| {
            change_record(value, ChangeValue::WhatsappAccountReview)
        }),
        (ChangeKey::field("phone_number_name_update"), |value, _| {
            change_record(value, ChangeValue::WhatsappPhoneNumberName)
        }),
        (ChangeKey::field("phone_number_quality_update"), |value, _| {
            change_record(value, ChangeValue::WhatsappPhoneNumberQuality)
        }),
        (ChangeKey::field("message_template_status_update"), |value, _| {
            change_record(value, ChangeValue::WhatsappTemplateStatus)
        }),
    ];

    ChangeRegistry {
        decoders: table.into_iter().collect(),
    }
}

fn payload_record<T: DeserializeOwned>(
    item: &Value,
    key: &str,
    wrap: fn(T) -> MessagingPayload,
) -> Result<MessagingPayload, DecodeError> {
    let body = item.get(key).unwrap_or(&Value::Null);
    decode_record(body)
        .map(wrap)
        .map_err(|error| error.within(key))
}

fn standard_messaging() -> MessagingRegistry {
    let decoders: [MessagingDecoder; 16] = [
        |item| payload_record(item, "message", MessagingPayload::Message),
        |item| payload_record(item, "message_edit", MessagingPayload::MessageEdit),
        |item| payload_record(item, "delivery", MessagingPayload::Delivery),
        |item| payload_record(item, "read", MessagingPayload::Read),
        |item| payload_record(item, "postback", MessagingPayload::Postback),
        |item| payload_record(item, "optin", MessagingPayload::Optin),
        |item| payload_record(item, "referral", MessagingPayload::Referral),
        |item| payload_record(item, "account_linking", MessagingPayload::AccountLinking),
        |item| payload_record(item, "policy_enforcement", MessagingPayload::PolicyEnforcement),
        |item| payload_record(item, "payment", MessagingPayload::Payment),
        |item| payload_record(item, "checkout_update", MessagingPayload::CheckoutUpdate),
        |item| payload_record(item, "pass_thread_control", MessagingPayload::PassThreadControl),
        |item| payload_record(item, "take_thread_control", MessagingPayload::TakeThreadControl),
        |item| {
            payload_record(
                item,
                "request_thread_control",
                MessagingPayload::RequestThreadControl,
            )
        },
        |item| payload_record(item, "reaction", MessagingPayload::Reaction),
        |item| payload_record(item, "app_roles", MessagingPayload::AppRoles),
    ];

    MessagingRegistry {
        entries: PAYLOAD_KEYS
            .into_iter()
            .map(str::to_string)
            .zip(decoders)
            .collect(),
    }
}

/// Decodes the object stored under the message's type key. A type whose body is
/// absent decodes as an empty record.
fn content_record<T: DeserializeOwned>(
    message: &Value,
    key: &str,
    wrap: fn(T) -> WhatsappContent,
) -> Result<WhatsappContent, DecodeError> {
    let decoded = match message.get(key) {
        None | Some(Value::Null) => decode_record(&Value::Object(Map::new())),
        Some(body) => decode_record(body).map_err(|error| error.within(key)),
    };
    decoded.map(wrap)
}

fn standard_whatsapp() -> WhatsappRegistry {
    let table: [(&str, WhatsappDecoder); 15] = [
        ("text", |message| {
            content_record(message, "text", WhatsappContent::Text)
        }),
        ("image", |message| {
            content_record(message, "image", WhatsappContent::Image)
        }),
        ("audio", |message| {
            content_record(message, "audio", WhatsappContent::Audio)
        }),
        ("video", |message| {
            content_record(message, "video", WhatsappContent::Video)
        }),
        ("document", |message| {
            content_record(message, "document", WhatsappContent::Document)
        }),
        ("sticker", |message| {
            content_record(message, "sticker", WhatsappContent::Sticker)
        }),
        ("location", |message| {
            content_record(message, "location", WhatsappContent::Location)
        }),
        ("contacts", |message| {
            Ok(WhatsappContent::Contacts(
                decode_child(message, "contacts")?.unwrap_or_default(),
            ))
        }),
        ("button", |message| {
            content_record(message, "button", WhatsappContent::Button)
        }),
        ("interactive", |message| {
            content_record(message, "interactive", WhatsappContent::Interactive)
        }),
        ("reaction", |message| {
            content_record(message, "reaction", WhatsappContent::Reaction)
        }),
        ("order", |message| {
            content_record(message, "order", WhatsappContent::Order)
        }),
        ("system", |message| {
            content_record(message, "system", WhatsappContent::System)
        }),
        ("request_welcome", |_| Ok(WhatsappContent::RequestWelcome)),
        ("unsupported", |message| {
            content_record(message, "unsupported", WhatsappContent::Unsupported)
        }),
    ];

    WhatsappRegistry {
        decoders: table
            .into_iter()
            .map(|(message_type, decoder)| (message_type.to_string(), decoder))
            .collect(),
    }
}

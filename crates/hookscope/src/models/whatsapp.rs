//! WhatsApp Business Account change values and inbound messages.
//!
//! Messages are the one surface in this family with an explicit `type` tag; the
//! content object sits under a key named after the tag (`"image": {...}`).

use serde::Deserialize;
use serde_json::Value;

use crate::decode::coerce;
use crate::models::common::ErrorDetail;

/// Value of a `messages` change: inbound messages, delivery statuses, or both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhatsappMessagesValue {
    pub messaging_product: Option<String>,
    pub metadata: Option<PhoneMetadata>,
    pub contacts: Vec<WhatsappContact>,
    pub messages: Vec<WhatsappMessage>,
    pub statuses: Vec<MessageStatus>,
    pub errors: Vec<ErrorDetail>,
}

/// Everything in a `messages` change value except the messages, which need the
/// type registry and are kept raw here.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub(crate) struct WhatsappMessagesHeader {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub metadata: Option<PhoneMetadata>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub contacts: Vec<WhatsappContact>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub messages: Vec<Value>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub statuses: Vec<MessageStatus>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PhoneMetadata {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub display_phone_number: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WhatsappContact {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub wa_id: Option<String>,
    #[serde(default)]
    pub profile: Option<ContactProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ContactProfile {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MessageStatus {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub conversation: Option<Conversation>,
    #[serde(default)]
    pub pricing: Option<Pricing>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub origin: Option<ConversationOrigin>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub expiration_timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ConversationOrigin {
    #[serde(default, rename = "type")]
    pub origin_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Pricing {
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub billable: Option<bool>,
    #[serde(default)]
    pub pricing_model: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// An inbound WhatsApp message. `content` is selected by `message_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhatsappMessage {
    pub id: Option<String>,
    pub from: Option<String>,
    pub timestamp: Option<i64>,
    pub message_type: String,
    pub context: Option<MessageContext>,
    pub referral: Option<AdReferral>,
    pub errors: Vec<ErrorDetail>,
    pub content: WhatsappContent,
}

/// Fields shared by every message regardless of `type`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub(crate) struct WhatsappMessageHeader {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub context: Option<MessageContext>,
    #[serde(default)]
    pub referral: Option<AdReferral>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub errors: Vec<ErrorDetail>,
}

impl WhatsappMessage {
    pub(crate) fn from_parts(
        header: WhatsappMessageHeader,
        message_type: String,
        content: WhatsappContent,
    ) -> Self {
        Self {
            id: header.id,
            from: header.from,
            timestamp: header.timestamp,
            message_type,
            context: header.context,
            referral: header.referral,
            errors: header.errors,
            content,
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&TextContent> {
        match &self.content {
            WhatsappContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Image, audio, video, document, or sticker content.
    #[must_use]
    pub fn media(&self) -> Option<&MediaContent> {
        match &self.content {
            WhatsappContent::Image(media)
            | WhatsappContent::Audio(media)
            | WhatsappContent::Video(media)
            | WhatsappContent::Document(media)
            | WhatsappContent::Sticker(media) => Some(media),
            _ => None,
        }
    }

    #[must_use]
    pub fn location(&self) -> Option<&LocationContent> {
        match &self.content {
            WhatsappContent::Location(location) => Some(location),
            _ => None,
        }
    }

    #[must_use]
    pub fn contacts(&self) -> Option<&[SharedContact]> {
        match &self.content {
            WhatsappContent::Contacts(contacts) => Some(contacts),
            _ => None,
        }
    }

    #[must_use]
    pub fn interactive(&self) -> Option<&InteractiveContent> {
        match &self.content {
            WhatsappContent::Interactive(interactive) => Some(interactive),
            _ => None,
        }
    }

    #[must_use]
    pub fn reaction(&self) -> Option<&ReactionContent> {
        match &self.content {
            WhatsappContent::Reaction(reaction) => Some(reaction),
            _ => None,
        }
    }

    #[must_use]
    pub fn system(&self) -> Option<&SystemContent> {
        match &self.content {
            WhatsappContent::System(system) => Some(system),
            _ => None,
        }
    }

    /// Present for `type: "unsupported"` and for any type no decoder is registered for.
    #[must_use]
    pub fn unsupported(&self) -> Option<&UnsupportedContent> {
        match &self.content {
            WhatsappContent::Unsupported(unsupported) => Some(unsupported),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_reply(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|context| context.id.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhatsappContent {
    Text(TextContent),
    Image(MediaContent),
    Audio(MediaContent),
    Video(MediaContent),
    Document(MediaContent),
    Sticker(MediaContent),
    Location(LocationContent),
    Contacts(Vec<SharedContact>),
    Button(ButtonContent),
    Interactive(InteractiveContent),
    Reaction(ReactionContent),
    Order(OrderContent),
    System(SystemContent),
    RequestWelcome,
    Unsupported(UnsupportedContent),
}

impl WhatsappContent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Audio(_) => "audio",
            Self::Video(_) => "video",
            Self::Document(_) => "document",
            Self::Sticker(_) => "sticker",
            Self::Location(_) => "location",
            Self::Contacts(_) => "contacts",
            Self::Button(_) => "button",
            Self::Interactive(_) => "interactive",
            Self::Reaction(_) => "reaction",
            Self::Order(_) => "order",
            Self::System(_) => "system",
            Self::RequestWelcome => "request_welcome",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: Option<String>,
}

/// Media reference shared by image, audio, video, document, and sticker messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MediaContent {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub animated: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub voice: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LocationContent {
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SharedContact {
    #[serde(default)]
    pub name: Option<ContactName>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub phones: Vec<ContactPhone>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub emails: Vec<ContactEmail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ContactName {
    #[serde(default)]
    pub formatted_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ContactPhone {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub wa_id: Option<String>,
    #[serde(default, rename = "type")]
    pub phone_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ContactEmail {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "type")]
    pub email_type: Option<String>,
}

/// Quick-reply button tapped on a template message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ButtonContent {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct InteractiveContent {
    #[serde(default, rename = "type")]
    pub interactive_type: Option<String>,
    #[serde(default)]
    pub button_reply: Option<ReplyOption>,
    #[serde(default)]
    pub list_reply: Option<ReplyOption>,
    #[serde(default)]
    pub nfm_reply: Option<FlowReply>,
}

impl InteractiveContent {
    /// Whichever reply option the user picked.
    #[must_use]
    pub fn selected(&self) -> Option<&ReplyOption> {
        self.button_reply.as_ref().or(self.list_reply.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReplyOption {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FlowReply {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub response_json: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReactionContent {
    #[serde(default)]
    pub message_id: Option<String>,
    /// Empty or absent when a reaction is removed.
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct OrderContent {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub catalog_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub product_items: Vec<ProductItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProductItem {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub product_retailer_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub item_price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Platform notices such as a customer changing their number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SystemContent {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "type")]
    pub system_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub new_wa_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub wa_id: Option<String>,
    #[serde(default)]
    pub identity: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
}

/// Content of an unsupported message. The platform may name what it could not
/// deliver under `unsupported.type`; `declared_type` records a `type` tag this
/// library has no decoder for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UnsupportedContent {
    #[serde(default, rename = "type")]
    pub unsupported_type: Option<String>,
    #[serde(skip)]
    pub declared_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MessageContext {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub from: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub forwarded: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub frequently_forwarded: Option<bool>,
    #[serde(default)]
    pub referred_product: Option<ReferredProduct>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReferredProduct {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub catalog_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub product_retailer_id: Option<String>,
}

/// Click-to-WhatsApp ad the conversation started from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AdReferral {
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub ctwa_clid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WhatsappAccountUpdate {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub ban_info: Option<BanInfo>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub restriction_info: Vec<RestrictionInfo>,
    #[serde(default)]
    pub violation_info: Option<ViolationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct BanInfo {
    #[serde(default)]
    pub waba_ban_state: Option<String>,
    #[serde(default)]
    pub waba_ban_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RestrictionInfo {
    #[serde(default)]
    pub restriction_type: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ViolationInfo {
    #[serde(default)]
    pub violation_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WhatsappAccountReview {
    #[serde(default)]
    pub decision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WhatsappPhoneNumberName {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub display_phone_number: Option<String>,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub requested_verified_name: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WhatsappPhoneNumberQuality {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub display_phone_number: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub current_limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct WhatsappTemplateStatus {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub message_template_id: Option<String>,
    #[serde(default)]
    pub message_template_name: Option<String>,
    #[serde(default)]
    pub message_template_language: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

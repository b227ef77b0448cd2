//! Messenger platform items. Each item carries exactly one payload, selected by
//! which of the known payload keys is present.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::decode::coerce;
use crate::models::common::Participant;
use crate::models::nlp::NlpResult;
use crate::utils::time::format_epoch;

#[derive(Debug, Clone, PartialEq)]
pub struct MessagingItem {
    pub sender: Option<Participant>,
    pub recipient: Option<Participant>,
    /// Milliseconds since the epoch, as sent.
    pub timestamp: Option<i64>,
    pub prior_message: Option<PriorMessage>,
    /// Lower-priority payload keys that were present but not decoded.
    pub shadowed_payload_keys: Vec<String>,
    payload: MessagingPayload,
}

/// Everything in a messaging item except its payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub(crate) struct MessagingHeader {
    #[serde(default)]
    pub sender: Option<Participant>,
    #[serde(default)]
    pub recipient: Option<Participant>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub prior_message: Option<PriorMessage>,
}

impl MessagingItem {
    pub(crate) fn from_parts(
        header: MessagingHeader,
        payload: MessagingPayload,
        shadowed_payload_keys: Vec<String>,
    ) -> Self {
        Self {
            sender: header.sender,
            recipient: header.recipient,
            timestamp: header.timestamp,
            prior_message: header.prior_message,
            shadowed_payload_keys,
            payload,
        }
    }

    #[must_use]
    pub fn payload(&self) -> &MessagingPayload {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> MessagingPayload {
        self.payload
    }

    #[must_use]
    pub fn sender_id(&self) -> Option<&str> {
        self.sender.as_ref().and_then(|sender| sender.id.as_deref())
    }

    #[must_use]
    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient
            .as_ref()
            .and_then(|recipient| recipient.id.as_deref())
    }

    #[must_use]
    pub fn timestamp_utc(&self) -> Option<String> {
        self.timestamp.and_then(format_epoch)
    }

    #[must_use]
    pub fn message(&self) -> Option<&MessagePayload> {
        self.payload.as_message()
    }

    #[must_use]
    pub fn message_edit(&self) -> Option<&MessageEditPayload> {
        self.payload.as_message_edit()
    }

    #[must_use]
    pub fn delivery(&self) -> Option<&DeliveryPayload> {
        self.payload.as_delivery()
    }

    #[must_use]
    pub fn read(&self) -> Option<&ReadPayload> {
        self.payload.as_read()
    }

    #[must_use]
    pub fn postback(&self) -> Option<&PostbackPayload> {
        self.payload.as_postback()
    }

    #[must_use]
    pub fn optin(&self) -> Option<&OptinPayload> {
        self.payload.as_optin()
    }

    #[must_use]
    pub fn referral(&self) -> Option<&ReferralPayload> {
        self.payload.as_referral()
    }

    #[must_use]
    pub fn account_linking(&self) -> Option<&AccountLinkingPayload> {
        self.payload.as_account_linking()
    }

    #[must_use]
    pub fn policy_enforcement(&self) -> Option<&PolicyEnforcementPayload> {
        self.payload.as_policy_enforcement()
    }

    #[must_use]
    pub fn payment(&self) -> Option<&PaymentPayload> {
        self.payload.as_payment()
    }

    #[must_use]
    pub fn checkout_update(&self) -> Option<&CheckoutUpdatePayload> {
        self.payload.as_checkout_update()
    }

    #[must_use]
    pub fn pass_thread_control(&self) -> Option<&PassThreadControlPayload> {
        self.payload.as_pass_thread_control()
    }

    #[must_use]
    pub fn take_thread_control(&self) -> Option<&TakeThreadControlPayload> {
        self.payload.as_take_thread_control()
    }

    #[must_use]
    pub fn request_thread_control(&self) -> Option<&RequestThreadControlPayload> {
        self.payload.as_request_thread_control()
    }

    #[must_use]
    pub fn reaction(&self) -> Option<&ReactionPayload> {
        self.payload.as_reaction()
    }

    #[must_use]
    pub fn app_roles(&self) -> Option<&AppRolesPayload> {
        self.payload.as_app_roles()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessagingPayload {
    Message(MessagePayload),
    MessageEdit(MessageEditPayload),
    Delivery(DeliveryPayload),
    Read(ReadPayload),
    Postback(PostbackPayload),
    Optin(OptinPayload),
    Referral(ReferralPayload),
    AccountLinking(AccountLinkingPayload),
    PolicyEnforcement(PolicyEnforcementPayload),
    Payment(PaymentPayload),
    CheckoutUpdate(CheckoutUpdatePayload),
    PassThreadControl(PassThreadControlPayload),
    TakeThreadControl(TakeThreadControlPayload),
    RequestThreadControl(RequestThreadControlPayload),
    Reaction(ReactionPayload),
    AppRoles(AppRolesPayload),
}

macro_rules! payload_accessors {
    ($($variant:ident => $accessor:ident, $record:ty, $key:literal;)+) => {
        impl MessagingPayload {
            /// The wire key this payload was read from.
            #[must_use]
            pub const fn key(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $key,)+
                }
            }

            $(
                #[must_use]
                pub fn $accessor(&self) -> Option<&$record> {
                    match self {
                        Self::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            )+
        }
    };
}

payload_accessors! {
    Message => as_message, MessagePayload, "message";
    MessageEdit => as_message_edit, MessageEditPayload, "message_edit";
    Delivery => as_delivery, DeliveryPayload, "delivery";
    Read => as_read, ReadPayload, "read";
    Postback => as_postback, PostbackPayload, "postback";
    Optin => as_optin, OptinPayload, "optin";
    Referral => as_referral, ReferralPayload, "referral";
    AccountLinking => as_account_linking, AccountLinkingPayload, "account_linking";
    PolicyEnforcement => as_policy_enforcement, PolicyEnforcementPayload, "policy_enforcement";
    Payment => as_payment, PaymentPayload, "payment";
    CheckoutUpdate => as_checkout_update, CheckoutUpdatePayload, "checkout_update";
    PassThreadControl => as_pass_thread_control, PassThreadControlPayload, "pass_thread_control";
    TakeThreadControl => as_take_thread_control, TakeThreadControlPayload, "take_thread_control";
    RequestThreadControl => as_request_thread_control, RequestThreadControlPayload, "request_thread_control";
    Reaction => as_reaction, ReactionPayload, "reaction";
    AppRoles => as_app_roles, AppRolesPayload, "app_roles";
}

/// Set when the user replied from a different conversation surface, e.g. a
/// comment turned into a private reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PriorMessage {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MessagePayload {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub is_echo: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub is_deleted: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub app_id: Option<i64>,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub seq: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub sticker_id: Option<i64>,
    #[serde(default)]
    pub quick_reply: Option<QuickReply>,
    #[serde(default)]
    pub reply_to: Option<ReplyTo>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub nlp: Option<NlpResult>,
}

impl MessagePayload {
    #[must_use]
    pub fn is_echo(&self) -> bool {
        self.is_echo.unwrap_or(false)
    }

    #[must_use]
    pub fn quick_reply_payload(&self) -> Option<&str> {
        self.quick_reply
            .as_ref()
            .and_then(|reply| reply.payload.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct QuickReply {
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReplyTo {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub story: Option<StoryReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StoryReference {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
}

/// An attachment. `payload` varies by `type` and is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Attachment {
    #[serde(default, rename = "type")]
    pub attachment_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl Attachment {
    /// `payload.url`, where media attachments keep their download link.
    #[must_use]
    pub fn payload_url(&self) -> Option<&str> {
        self.payload.as_ref()?.get("url")?.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MessageEditPayload {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub num_edit: Option<i64>,
}

/// Messages up to `watermark` were delivered. `mids` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DeliveryPayload {
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub mids: Vec<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub watermark: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub seq: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReadPayload {
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub watermark: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub seq: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PostbackPayload {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub referral: Option<ReferralPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct OptinPayload {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub user_ref: Option<String>,
    #[serde(default, rename = "type")]
    pub optin_type: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub notification_messages_token: Option<String>,
    #[serde(default)]
    pub notification_messages_frequency: Option<String>,
    #[serde(default)]
    pub notification_messages_status: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub token_expiry_timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReferralPayload {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "type")]
    pub referral_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub ad_id: Option<String>,
    #[serde(default)]
    pub referer_uri: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub is_guest_user: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AccountLinkingPayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub authorization_code: Option<String>,
}

impl AccountLinkingPayload {
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.status.as_deref() == Some("linked")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PolicyEnforcementPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PaymentPayload {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub requested_user_info: Option<Value>,
    #[serde(default)]
    pub payment_credential: Option<PaymentCredential>,
    #[serde(default)]
    pub amount: Option<PaymentAmount>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub shipping_option_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PaymentCredential {
    #[serde(default)]
    pub provider_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub charge_id: Option<String>,
    #[serde(default)]
    pub fb_payment_id: Option<String>,
}

/// Amount as sent: a decimal string, not a float.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PaymentAmount {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CheckoutUpdatePayload {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ShippingAddress {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub street1: Option<String>,
    #[serde(default)]
    pub street2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PassThreadControlPayload {
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub new_owner_app_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub previous_owner_app_id: Option<i64>,
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TakeThreadControlPayload {
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub previous_owner_app_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub new_owner_app_id: Option<i64>,
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RequestThreadControlPayload {
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub requested_owner_app_id: Option<i64>,
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReactionPayload {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub reaction: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// App id to the roles it holds on the page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct AppRolesPayload(pub BTreeMap<String, Vec<String>>);

impl AppRolesPayload {
    #[must_use]
    pub fn roles_for(&self, app_id: &str) -> &[String] {
        self.0.get(app_id).map_or(&[], Vec::as_slice)
    }
}

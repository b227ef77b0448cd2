//! Dispatch key extraction. Every probe here reads a fixed handful of keys and
//! never walks the rest of the payload.

use std::fmt::{Display, Formatter};

use serde_json::Value;

/// Registry key for a change: the enclosing `field` plus the optional `item` and
/// `verb` discriminators read from inside the change value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeKey {
    pub field: String,
    pub item: Option<String>,
    pub verb: Option<String>,
}

impl ChangeKey {
    #[must_use]
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            item: None,
            verb: None,
        }
    }

    #[must_use]
    pub fn item(field: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            item: Some(item.into()),
            verb: None,
        }
    }

    #[must_use]
    pub fn exact(field: impl Into<String>, item: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            item: Some(item.into()),
            verb: Some(verb.into()),
        }
    }

    #[must_use]
    pub fn extract(field: &str, value: &Value) -> Self {
        Self {
            field: field.trim().to_string(),
            item: probe_str(value, "item").map(str::to_string),
            verb: probe_str(value, "verb").map(str::to_string),
        }
    }

    /// Keys to try against a registry, most specific first.
    #[must_use]
    pub fn lookup_candidates(&self) -> Vec<ChangeKey> {
        let mut candidates = vec![self.clone()];
        if self.verb.is_some() && self.item.is_some() {
            candidates.push(Self {
                field: self.field.clone(),
                item: self.item.clone(),
                verb: None,
            });
        }
        if self.item.is_some() || self.verb.is_some() {
            candidates.push(Self::field(self.field.clone()));
        }
        candidates
    }
}

impl Display for ChangeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.field)?;
        if let Some(item) = &self.item {
            write!(f, "/{item}")?;
        }
        if let Some(verb) = &self.verb {
            write!(f, "/{verb}")?;
        }
        Ok(())
    }
}

/// Messaging payload keys, highest priority first. When an item carries more
/// than one, the earliest in this list wins.
pub const PAYLOAD_KEYS: [&str; 16] = [
    "message",
    "message_edit",
    "delivery",
    "read",
    "postback",
    "optin",
    "referral",
    "account_linking",
    "policy_enforcement",
    "payment",
    "checkout_update",
    "pass_thread_control",
    "take_thread_control",
    "request_thread_control",
    "reaction",
    "app_roles",
];

/// The messaging payload keys present in `value`, in priority order.
#[must_use]
pub fn probe_payload_keys(value: &Value) -> Vec<&'static str> {
    present_keys(value, PAYLOAD_KEYS)
}

/// The candidate keys that are present and non-null in `value`, in the order given.
#[must_use]
pub fn present_keys<'k>(value: &Value, candidates: impl IntoIterator<Item = &'k str>) -> Vec<&'k str> {
    candidates
        .into_iter()
        .filter(|key| value.get(*key).is_some_and(|child| !child.is_null()))
        .collect()
}

/// The explicit `type` tag of a WhatsApp message.
#[must_use]
pub fn message_type(value: &Value) -> Option<&str> {
    probe_str(value, "type")
}

/// Strips the `wit$` namespace prefix and `:role` suffix from an NLP entity name.
///
/// `wit$datetime:datetime` and `datetime` both resolve to `datetime`.
#[must_use]
pub fn normalize_entity_name(name: &str) -> &str {
    let trimmed = name.trim();
    let without_prefix = trimmed.strip_prefix("wit$").unwrap_or(trimmed);
    without_prefix
        .split_once(':')
        .map_or(without_prefix, |(head, _)| head)
}

fn probe_str<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    let text = value.get(key)?.as_str()?.trim();
    if text.is_empty() { None } else { Some(text) }
}

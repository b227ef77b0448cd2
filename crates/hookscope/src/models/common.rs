use serde::Deserialize;

use crate::decode::coerce;

/// An `{id, name}` reference to a user or page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Reference {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub name: Option<String>,
}

impl Reference {
    /// Builds a reference from flat `*_id` / `*_name` pairs; `None` when both are absent.
    #[must_use]
    pub fn from_flat(id: Option<&str>, name: Option<&str>) -> Option<Self> {
        if id.is_none() && name.is_none() {
            return None;
        }
        Some(Self {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
        })
    }
}

/// Sender attribution shared by change values.
///
/// Newer API versions send a nested `from` object, older ones flat
/// `sender_id` / `sender_name` strings. Flattened into every change record that
/// can carry a sender.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SenderFields {
    #[serde(default)]
    pub from: Option<Reference>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub sender_id: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub sender_name: Option<String>,
}

impl SenderFields {
    /// The normalized sender: nested `from` when present, otherwise the flat pair.
    #[must_use]
    pub fn resolve(&self) -> Option<Reference> {
        if let Some(from) = &self.from {
            return Some(from.clone());
        }
        Reference::from_flat(self.sender_id.as_deref(), self.sender_name.as_deref())
    }
}

pub trait HasSender {
    fn sender_fields(&self) -> &SenderFields;

    fn sender(&self) -> Option<Reference> {
        self.sender_fields().resolve()
    }
}

/// Sender or recipient of a messaging item. Users reached through the checkbox
/// plugin are identified by `user_ref` instead of `id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Participant {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub user_ref: Option<String>,
}

/// Platform error object, as reported in WhatsApp `errors` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub code: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_data: Option<ErrorData>,
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Reference, SenderFields};
    use crate::decode::decode_record;

    #[test]
    fn flat_pair_requires_at_least_one_side() {
        assert_eq!(Reference::from_flat(None, None), None);
        assert_eq!(
            Reference::from_flat(Some("42"), None),
            Some(Reference {
                id: Some("42".to_string()),
                name: None,
            })
        );
    }

    #[test]
    fn numeric_sender_id_is_read_as_text() {
        let fields: SenderFields =
            decode_record(&json!({"sender_id": 1234567890, "sender_name": "Tester"}))
                .expect("sender fields should decode");
        assert_eq!(
            fields.resolve(),
            Some(Reference {
                id: Some("1234567890".to_string()),
                name: Some("Tester".to_string()),
            })
        );
    }
}

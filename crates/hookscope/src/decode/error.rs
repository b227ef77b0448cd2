use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Which sequence of an entry an item was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Change,
    Messaging,
    Standby,
}

impl Surface {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Messaging => "messaging item",
            Self::Standby => "standby item",
        }
    }
}

/// Location of a decoded item inside an event envelope.
///
/// `item` and `surface` are `None` when the failure concerns the entry itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemPosition {
    pub entry: usize,
    pub surface: Option<Surface>,
    pub item: Option<usize>,
}

impl ItemPosition {
    #[must_use]
    pub const fn entry(entry: usize) -> Self {
        Self {
            entry,
            surface: None,
            item: None,
        }
    }

    #[must_use]
    pub const fn item(entry: usize, surface: Surface, item: usize) -> Self {
        Self {
            entry,
            surface: Some(surface),
            item: Some(item),
        }
    }
}

impl Display for ItemPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry {}", self.entry)?;
        if let (Some(surface), Some(item)) = (self.surface, self.item) {
            write!(f, ", {} {item}", surface.as_str())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A present value had a shape no coercion could accept.
    #[error("field `{path}`: {message}")]
    Structure { path: String, message: String },

    #[error("{kind} is missing required field `{field}`")]
    MissingField { kind: String, field: String },

    #[error(
        "messaging item carries none of the known payload keys (keys seen: [{}])",
        .keys_seen.join(", ")
    )]
    MissingPayload { keys_seen: Vec<String> },

    #[error("entry shape: {message}")]
    EntryShape { message: String },

    #[error("{position}: {source}")]
    AtPosition {
        position: ItemPosition,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    #[must_use]
    pub fn structure(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structure {
            path: path.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn missing_field(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            kind: kind.into(),
            field: field.into(),
        }
    }

    /// Attaches an envelope position. Already-positioned errors keep their original position.
    #[must_use]
    pub fn at(self, position: ItemPosition) -> Self {
        match self {
            Self::AtPosition { .. } => self,
            other => Self::AtPosition {
                position,
                source: Box::new(other),
            },
        }
    }

    /// Prefixes the field path of a structural error with the key it was nested under.
    #[must_use]
    pub fn within(self, segment: &str) -> Self {
        match self {
            Self::Structure { path, message } => Self::Structure {
                path: join_path(segment, &path),
                message,
            },
            other => other,
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<ItemPosition> {
        match self {
            Self::AtPosition { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// The error without any position wrapper.
    #[must_use]
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            Self::AtPosition { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for DecodeError {
    fn from(error: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self::Structure {
            path: error.path().to_string(),
            message: error.inner().to_string(),
        }
    }
}

fn join_path(segment: &str, path: &str) -> String {
    if path.is_empty() || path == "." {
        segment.to_string()
    } else if path.starts_with('[') {
        format!("{segment}{path}")
    } else {
        format!("{segment}.{path}")
    }
}

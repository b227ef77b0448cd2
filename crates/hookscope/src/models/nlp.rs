//! Natural-language annotations attached to inbound messages.
//!
//! Every occurrence is decoded generically first and keeps its raw tree, so it
//! can later be reinterpreted as a specific entity kind without reparsing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::decode::coerce;
use crate::decode::key::normalize_entity_name;
use crate::decode::registry::NlpRegistry;
use crate::decode::structure::{Decoded, decode_retained};
use crate::decode::DecodeError;

/// The `nlp` object of a message.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NlpResult {
    #[serde(default)]
    pub entities: NlpEntities,
    #[serde(default)]
    pub traits: NlpEntities,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub intents: Vec<NlpIntent>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub detected_locales: Vec<DetectedLocale>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NlpIntent {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DetectedLocale {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
}

/// Entity name to its ordered occurrences, keyed by the name as sent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NlpEntities(BTreeMap<String, Vec<NlpEntity>>);

impl NlpEntities {
    /// Occurrences for `name`. Falls back to comparing normalized names, so
    /// `datetime` finds entries sent as `wit$datetime:datetime`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[NlpEntity]> {
        if let Some(found) = self.0.get(name) {
            return Some(found);
        }
        let wanted = normalize_entity_name(name);
        self.0
            .iter()
            .find(|(key, _)| normalize_entity_name(key) == wanted)
            .map(|(_, found)| found.as_slice())
    }

    #[must_use]
    pub fn first(&self, name: &str) -> Option<&NlpEntity> {
        self.get(name).and_then(<[NlpEntity]>::first)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NlpEntity> {
        self.0.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for NlpEntities {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, Option<Vec<Value>>>>::deserialize(deserializer)?
            .unwrap_or_default();

        let mut by_name = BTreeMap::new();
        for (name, occurrences) in raw {
            let mut entities = Vec::new();
            for (index, occurrence) in occurrences.unwrap_or_default().into_iter().enumerate() {
                let entity = NlpEntity::from_raw(&name, occurrence)
                    .map_err(|error| D::Error::custom(format!("{name}[{index}]: {error}")))?;
                entities.push(entity);
            }
            by_name.insert(name, entities);
        }
        Ok(Self(by_name))
    }
}

/// Fields every entity occurrence shares.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EntityFields {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
}

/// One occurrence of a named entity.
#[derive(Debug, Clone, PartialEq)]
pub struct NlpEntity {
    name: String,
    fields: Decoded<EntityFields>,
}

impl NlpEntity {
    pub fn from_raw(name: &str, raw: Value) -> Result<Self, DecodeError> {
        let fields = decode_retained(&raw)?;
        Ok(Self {
            name: name.to_string(),
            fields,
        })
    }

    /// The map key the occurrence was found under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn normalized_name(&self) -> &str {
        normalize_entity_name(&self.name)
    }

    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.fields.value.as_ref()
    }

    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        self.fields.confidence
    }

    #[must_use]
    pub fn entity_type(&self) -> Option<&str> {
        self.fields.entity_type.as_deref()
    }

    #[must_use]
    pub fn raw(&self) -> &Value {
        self.fields.raw()
    }

    /// Decodes the retained tree as kind `K` using the standard requirements.
    pub fn reinterpret<K: EntityKind>(&self) -> Result<K, DecodeError> {
        self.reinterpret_with(EntityRequirements::standard())
    }

    pub fn reinterpret_with<K: EntityKind>(
        &self,
        requirements: &EntityRequirements,
    ) -> Result<K, DecodeError> {
        let raw = self.fields.raw();
        for field in requirements.required(K::TAG) {
            if raw.get(field).is_none_or(Value::is_null) {
                return Err(DecodeError::missing_field(K::TAG.as_str(), field.as_str()));
            }
        }
        let mut decoded: K = self.fields.redecode()?;
        decoded.attach_name(&self.name);
        Ok(decoded)
    }

    /// `Some` when the occurrence reinterprets cleanly as `K`.
    #[must_use]
    pub fn try_as<K: EntityKind>(&self) -> Option<K> {
        self.reinterpret().ok()
    }

    /// Reinterprets as whichever kind the registry assigns to this entity's name.
    pub fn specialize(&self, registry: &NlpRegistry) -> Result<SpecificEntity, DecodeError> {
        let requirements = registry.requirements();
        let specific = match registry.kind_for(&self.name) {
            EntityKindTag::Datetime => SpecificEntity::Datetime(self.reinterpret_with(requirements)?),
            EntityKindTag::Duration => SpecificEntity::Duration(self.reinterpret_with(requirements)?),
            EntityKindTag::Distance => SpecificEntity::Distance(self.reinterpret_with(requirements)?),
            EntityKindTag::Volume => SpecificEntity::Volume(self.reinterpret_with(requirements)?),
            EntityKindTag::Temperature => {
                SpecificEntity::Temperature(self.reinterpret_with(requirements)?)
            }
            EntityKindTag::Quantity => SpecificEntity::Quantity(self.reinterpret_with(requirements)?),
            EntityKindTag::AmountOfMoney => {
                SpecificEntity::AmountOfMoney(self.reinterpret_with(requirements)?)
            }
            EntityKindTag::PhoneNumber => {
                SpecificEntity::PhoneNumber(self.reinterpret_with(requirements)?)
            }
            EntityKindTag::Email => SpecificEntity::Email(self.reinterpret_with(requirements)?),
            EntityKindTag::Url => SpecificEntity::Url(self.reinterpret_with(requirements)?),
            EntityKindTag::Location => SpecificEntity::Location(self.reinterpret_with(requirements)?),
            EntityKindTag::Sentiment => {
                SpecificEntity::Sentiment(self.reinterpret_with(requirements)?)
            }
            EntityKindTag::Greetings => {
                SpecificEntity::Greetings(self.reinterpret_with(requirements)?)
            }
            EntityKindTag::Reminder => SpecificEntity::Reminder(self.reinterpret_with(requirements)?),
            EntityKindTag::Custom => SpecificEntity::Custom(self.reinterpret_with(requirements)?),
        };
        Ok(specific)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKindTag {
    Datetime,
    Duration,
    Distance,
    Volume,
    Temperature,
    Quantity,
    AmountOfMoney,
    PhoneNumber,
    Email,
    Url,
    Location,
    Sentiment,
    Greetings,
    Reminder,
    Custom,
}

impl EntityKindTag {
    pub const ALL: [Self; 15] = [
        Self::Datetime,
        Self::Duration,
        Self::Distance,
        Self::Volume,
        Self::Temperature,
        Self::Quantity,
        Self::AmountOfMoney,
        Self::PhoneNumber,
        Self::Email,
        Self::Url,
        Self::Location,
        Self::Sentiment,
        Self::Greetings,
        Self::Reminder,
        Self::Custom,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::Duration => "duration",
            Self::Distance => "distance",
            Self::Volume => "volume",
            Self::Temperature => "temperature",
            Self::Quantity => "quantity",
            Self::AmountOfMoney => "amount_of_money",
            Self::PhoneNumber => "phone_number",
            Self::Email => "email",
            Self::Url => "url",
            Self::Location => "location",
            Self::Sentiment => "sentiment",
            Self::Greetings => "greetings",
            Self::Reminder => "reminder",
            Self::Custom => "custom",
        }
    }

    /// Exact match on the kind's own name; `None` for anything else.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == key)
    }
}

/// A specific shape an entity occurrence can be reinterpreted as.
pub trait EntityKind: DeserializeOwned {
    const TAG: EntityKindTag;

    /// Called with the occurrence's map key after decoding.
    fn attach_name(&mut self, _name: &str) {}
}

/// Per-kind fields that must be present for a reinterpretation to succeed.
/// Everything else is optional and decodes as empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityRequirements {
    required: BTreeMap<EntityKindTag, Vec<String>>,
}

static STANDARD_REQUIREMENTS: LazyLock<EntityRequirements> = LazyLock::new(|| {
    let mut requirements = EntityRequirements::default();
    for tag in [
        EntityKindTag::Duration,
        EntityKindTag::Distance,
        EntityKindTag::Volume,
        EntityKindTag::Temperature,
        EntityKindTag::Quantity,
        EntityKindTag::AmountOfMoney,
        EntityKindTag::PhoneNumber,
        EntityKindTag::Email,
        EntityKindTag::Url,
        EntityKindTag::Sentiment,
        EntityKindTag::Greetings,
        EntityKindTag::Custom,
    ] {
        requirements.set(tag, ["value"]);
    }
    requirements
});

impl EntityRequirements {
    /// `value` for scalar and measured kinds; nothing for datetime, location and
    /// reminder, which may carry intervals or resolved candidates instead.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD_REQUIREMENTS
    }

    #[must_use]
    pub fn required(&self, tag: EntityKindTag) -> &[String] {
        self.required.get(&tag).map_or(&[], Vec::as_slice)
    }

    pub fn set<I, S>(&mut self, tag: EntityKindTag, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required
            .insert(tag, fields.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn with<I, S>(mut self, tag: EntityKindTag, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(tag, fields);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecificEntity {
    Datetime(DatetimeEntity),
    Duration(DurationEntity),
    Distance(DistanceEntity),
    Volume(VolumeEntity),
    Temperature(TemperatureEntity),
    Quantity(QuantityEntity),
    AmountOfMoney(AmountOfMoneyEntity),
    PhoneNumber(PhoneNumberEntity),
    Email(EmailEntity),
    Url(UrlEntity),
    Location(LocationEntity),
    Sentiment(SentimentEntity),
    Greetings(GreetingsEntity),
    Reminder(ReminderEntity),
    Custom(CustomEntity),
}

impl SpecificEntity {
    #[must_use]
    pub const fn tag(&self) -> EntityKindTag {
        match self {
            Self::Datetime(_) => EntityKindTag::Datetime,
            Self::Duration(_) => EntityKindTag::Duration,
            Self::Distance(_) => EntityKindTag::Distance,
            Self::Volume(_) => EntityKindTag::Volume,
            Self::Temperature(_) => EntityKindTag::Temperature,
            Self::Quantity(_) => EntityKindTag::Quantity,
            Self::AmountOfMoney(_) => EntityKindTag::AmountOfMoney,
            Self::PhoneNumber(_) => EntityKindTag::PhoneNumber,
            Self::Email(_) => EntityKindTag::Email,
            Self::Url(_) => EntityKindTag::Url,
            Self::Location(_) => EntityKindTag::Location,
            Self::Sentiment(_) => EntityKindTag::Sentiment,
            Self::Greetings(_) => EntityKindTag::Greetings,
            Self::Reminder(_) => EntityKindTag::Reminder,
            Self::Custom(_) => EntityKindTag::Custom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DatetimeEntity {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub grain: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub from: Option<DatetimeBound>,
    #[serde(default)]
    pub to: Option<DatetimeBound>,
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub values: Vec<Value>,
}

impl DatetimeEntity {
    #[must_use]
    pub fn is_interval(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DatetimeBound {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub grain: Option<String>,
}

/// `{value, unit}` pair used by interval bounds and normalized forms.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Measure {
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

macro_rules! measured_entity {
    ($($name:ident => $tag:ident),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, PartialEq, Default, Deserialize)]
            pub struct $name {
                #[serde(default, deserialize_with = "coerce::opt_f64")]
                pub value: Option<f64>,
                #[serde(default)]
                pub unit: Option<String>,
                #[serde(default, deserialize_with = "coerce::opt_f64")]
                pub confidence: Option<f64>,
                #[serde(default, rename = "type")]
                pub entity_type: Option<String>,
                #[serde(default)]
                pub from: Option<Measure>,
                #[serde(default)]
                pub to: Option<Measure>,
                #[serde(default)]
                pub normalized: Option<Measure>,
            }

            impl EntityKind for $name {
                const TAG: EntityKindTag = EntityKindTag::$tag;
            }
        )+
    };
}

measured_entity!(
    DurationEntity => Duration,
    DistanceEntity => Distance,
    VolumeEntity => Volume,
    TemperatureEntity => Temperature,
    AmountOfMoneyEntity => AmountOfMoney,
);

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct QuantityEntity {
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PhoneNumberEntity {
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EmailEntity {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UrlEntity {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LocationEntity {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub suggested: Option<bool>,
    #[serde(default)]
    pub resolved: Option<ResolvedPlaces>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResolvedPlaces {
    #[serde(default, deserialize_with = "coerce::null_as_empty")]
    pub values: Vec<ResolvedPlace>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResolvedPlace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub coords: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Coordinates {
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub lat: Option<f64>,
    #[serde(default, rename = "long", deserialize_with = "coerce::opt_f64")]
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SentimentEntity {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
}

/// Greeting detection; the platform sends the flag as `"true"`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GreetingsEntity {
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub value: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ReminderEntity {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub suggested: Option<bool>,
}

/// An app-defined entity. `name` is the map key it was found under.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CustomEntity {
    #[serde(skip)]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::opt_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub confidence: Option<f64>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl EntityKind for CustomEntity {
    const TAG: EntityKindTag = EntityKindTag::Custom;

    fn attach_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

macro_rules! entity_kind {
    ($($name:ident => $tag:ident),+ $(,)?) => {
        $(
            impl EntityKind for $name {
                const TAG: EntityKindTag = EntityKindTag::$tag;
            }
        )+
    };
}

entity_kind!(
    DatetimeEntity => Datetime,
    QuantityEntity => Quantity,
    PhoneNumberEntity => PhoneNumber,
    EmailEntity => Email,
    UrlEntity => Url,
    LocationEntity => Location,
    SentimentEntity => Sentiment,
    GreetingsEntity => Greetings,
    ReminderEntity => Reminder,
);

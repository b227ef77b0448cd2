use hookscope::decode::{Registries, decode_messaging_item};
use hookscope::models::nlp::{
    CustomEntity, DatetimeEntity, DistanceEntity, EntityKindTag, EntityRequirements, LocationEntity,
    SpecificEntity,
};
use hookscope::models::MessagingItem;
use serde_json::json;

fn message_with_nlp(nlp: serde_json::Value) -> MessagingItem {
    let value = json!({
        "sender": {"id": "USER_ID"},
        "recipient": {"id": "PAGE_ID"},
        "timestamp": 1_458_692_752_478_i64,
        "message": {"mid": "m1", "text": "weather tomorrow in Paris, 5 km away", "nlp": nlp}
    });
    decode_messaging_item(Registries::standard(), &value).expect("message decodes")
}

fn sample() -> MessagingItem {
    message_with_nlp(json!({
        "entities": {
            "intend": [{"confidence": 0.914, "value": "weather", "type": "value"}],
            "wit$datetime:datetime": [{
                "confidence": 0.97,
                "value": "2026-10-18T00:00:00.000-07:00",
                "grain": "day",
                "type": "value",
                "values": [{"value": "2026-10-18T00:00:00.000-07:00", "grain": "day"}]
            }],
            "wit$location:location": [{
                "confidence": 0.88,
                "value": "Paris",
                "suggested": true,
                "resolved": {"values": [{"name": "Paris", "coords": {"lat": 48.85, "long": 2.35}}]}
            }],
            "wit$distance:distance": [{"confidence": 0.9, "value": 5, "unit": "kilometre"}]
        },
        "traits": {
            "wit$sentiment": [{"confidence": 0.6, "value": "neutral"}]
        },
        "detected_locales": [{"locale": "en_XX", "confidence": 0.99}]
    }))
}

#[test]
fn custom_entity_keeps_confidence_and_name() {
    let item = sample();
    let nlp = item
        .message()
        .and_then(|message| message.nlp.as_ref())
        .expect("nlp present");

    let intend = nlp.entities.first("intend").expect("intend entity");
    assert!((intend.confidence().unwrap_or_default() - 0.914).abs() < 1e-9);

    let custom: CustomEntity = intend.reinterpret().expect("custom reinterpretation");
    assert_eq!(custom.name, "intend");
    assert_eq!(custom.value.as_deref(), Some("weather"));
    assert!((custom.confidence.unwrap_or_default() - 0.914).abs() < 1e-9);
}

#[test]
fn builtin_names_are_found_after_normalization() {
    let item = sample();
    let nlp = item
        .message()
        .and_then(|message| message.nlp.as_ref())
        .expect("nlp present");

    let datetime = nlp.entities.first("datetime").expect("datetime by short name");
    assert_eq!(datetime.name(), "wit$datetime:datetime");
    assert_eq!(datetime.normalized_name(), "datetime");

    let typed: DatetimeEntity = datetime.reinterpret().expect("datetime kind");
    assert_eq!(typed.grain.as_deref(), Some("day"));
    assert!(!typed.is_interval());
    assert_eq!(typed.values.len(), 1);

    let location: LocationEntity = nlp
        .entities
        .first("location")
        .expect("location by short name")
        .reinterpret()
        .expect("location kind");
    let resolved = location.resolved.expect("resolved places");
    let place = &resolved.values[0];
    assert_eq!(place.coords.as_ref().and_then(|coords| coords.lon), Some(2.35));
}

#[test]
fn specialize_uses_the_registry_kind() {
    let item = sample();
    let nlp = item
        .message()
        .and_then(|message| message.nlp.as_ref())
        .expect("nlp present");
    let registry = Registries::standard().nlp();

    let kinds = nlp
        .entities
        .iter()
        .chain(nlp.traits.iter())
        .map(|entity| {
            entity
                .specialize(registry)
                .map(|specific| specific.tag())
                .expect("every sample entity specializes")
        })
        .collect::<Vec<_>>();
    assert!(kinds.contains(&EntityKindTag::Custom));
    assert!(kinds.contains(&EntityKindTag::Datetime));
    assert!(kinds.contains(&EntityKindTag::Location));
    assert!(kinds.contains(&EntityKindTag::Distance));
    assert!(kinds.contains(&EntityKindTag::Sentiment));

    let distance = nlp.entities.first("distance").expect("distance entity");
    match distance.specialize(registry).expect("distance specializes") {
        SpecificEntity::Distance(DistanceEntity { value, unit, .. }) => {
            assert_eq!(value, Some(5.0));
            assert_eq!(unit.as_deref(), Some("kilometre"));
        }
        other => panic!("expected distance, got {other:?}"),
    }
}

#[test]
fn failed_reinterpretation_leaves_the_generic_entity_intact() {
    let item = message_with_nlp(json!({
        "entities": {"wit$distance:distance": [{"confidence": 0.4, "unit": "mile"}]}
    }));
    let nlp = item
        .message()
        .and_then(|message| message.nlp.as_ref())
        .expect("nlp present");
    let distance = nlp.entities.first("distance").expect("distance entity");

    let error = distance
        .specialize(Registries::standard().nlp())
        .expect_err("distance requires a value");
    assert_eq!(
        error.to_string(),
        "distance is missing required field `value`"
    );
    assert!(distance.try_as::<DistanceEntity>().is_none());
    assert_eq!(distance.confidence(), Some(0.4));
    assert_eq!(distance.raw()["unit"], json!("mile"));

    let relaxed = EntityRequirements::default();
    let typed: DistanceEntity = distance.reinterpret_with(&relaxed).expect("no requirement");
    assert_eq!(typed.value, None);
}

#[test]
fn null_and_missing_nlp_sections_are_empty() {
    let item = message_with_nlp(json!({"entities": null}));
    let nlp = item
        .message()
        .and_then(|message| message.nlp.as_ref())
        .expect("nlp present");
    assert!(nlp.entities.is_empty());
    assert!(nlp.traits.is_empty());
    assert!(nlp.intents.is_empty());
}

use popsynth::{AttributeDefinition, AttributeDictionary, DataType, SynthesisError};

use crate::utils::init_logging;

const CENSUS: &str = r#"[
    {"name": "age_band", "role": "mapped", "referent": "age",
     "values": ["child", "adult", "senior"],
     "mapping": [
        {"values": ["child"], "referent_values": ["0-14"]},
        {"values": ["adult"], "referent_values": ["15-39", "40-64"]},
        {"values": ["senior"], "referent_values": ["65+"]}
     ]},
    {"name": "age", "role": "range", "values": ["0-14", "15-39", "40-64", "65+"]},
    {"name": "sex", "values": ["F", "M"], "models": ["female", "male"]},
    {"name": "household", "role": "record", "referent": "sex"}
]"#;

fn census() -> AttributeDictionary {
    let definitions: Vec<AttributeDefinition> = serde_json::from_str(CENSUS).unwrap();
    AttributeDictionary::from_definitions(&definitions).unwrap()
}

#[test]
fn test_mapped_round_trip_through_definitions() {
    init_logging();
    let dict = census();
    let age = dict.attribute_id("age").unwrap();
    let band = dict.attribute_id("age_band").unwrap();

    let adult = dict.value_of(band, "adult").unwrap();
    let ages = dict.find_mapped_attribute_values(adult, age).unwrap();
    assert_eq!(ages.len(), 2);
    for value in &ages {
        let back = dict.find_mapped_attribute_values(*value, band).unwrap();
        assert!(back.contains(&adult));
    }
}

#[test]
fn test_models_and_ranges() {
    let dict = census();
    let sex = dict.attribute_id("sex").unwrap();
    let female = dict.value_of(sex, "F").unwrap();
    assert_eq!(dict.value(female).unwrap().model(), "female");

    let age = dict.attribute_id("age").unwrap();
    assert_eq!(dict.attribute(age).unwrap().data_type(), DataType::Range);
    let forty = dict.value_for_number(age, 40.0).unwrap();
    assert_eq!(dict.value(forty).unwrap().input(), "40-64");
    let negative = dict.value_for_number(age, -3.0).unwrap();
    assert!(dict.value(negative).unwrap().is_empty());
}

#[test]
fn test_record_attribute_resolves_to_empty() {
    let dict = census();
    let household = dict.attribute_id("household").unwrap();
    let value = dict.value_of(household, "anything").unwrap();
    assert!(dict.value(value).unwrap().is_empty());
}

#[test]
fn test_longer_cycle_rejected() {
    let definitions = vec![
        AttributeDefinition::unique("a", &["1"]).with_referent("c"),
        AttributeDefinition::unique("b", &["1"]).with_referent("a"),
        AttributeDefinition::unique("c", &["1"]).with_referent("b"),
    ];
    match AttributeDictionary::from_definitions(&definitions) {
        Err(SynthesisError::CyclicReference { chain }) => {
            assert_eq!(chain.first(), chain.last());
            assert_eq!(chain.len(), 4);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_unknown_referent_rejected() {
    let definitions = vec![AttributeDefinition::unique("a", &["1"]).with_referent("missing")];
    assert!(matches!(
        AttributeDictionary::from_definitions(&definitions),
        Err(SynthesisError::UnknownAttribute(_))
    ));
}

#[test]
fn test_unparsable_range_rejected() {
    let mut dict = AttributeDictionary::new();
    assert!(matches!(
        dict.add_range("age", &["young"]),
        Err(SynthesisError::InvalidRange { .. })
    ));
}

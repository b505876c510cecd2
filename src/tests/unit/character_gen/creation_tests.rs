//! Character creation: default grants and identity validation

use rstest::rstest;

use crate::core::character_gen::{CharacterGenError, ErrorKind, SpecialRules};
use crate::tests::common::*;

#[rstest]
#[case("Dwarf", "Fighter", "Medium", 25, "d10")]
#[case("Halfling", "Rogue", "Small", 25, "d8")]
#[case("Elf", "Wizard", "Medium", 30, "d6")]
#[case("Half-Orc", "Cleric", "Medium", 30, "d8")]
fn test_race_and_role_are_copied(
    #[case] race: &str,
    #[case] role: &str,
    #[case] size: &str,
    #[case] speed: u32,
    #[case] hit_die: &str,
) {
    let builder = test_builder();
    let c = builder.create_character("Hero", race, role, None).unwrap();

    assert_eq!(c.race(), race);
    assert_eq!(c.role(), role);
    assert_eq!(c.size(), size);
    assert_eq!(c.speed(), speed);
    assert_eq!(c.hit_die(), hit_die);
    assert_eq!(c.level(), 1);
    assert_eq!(c.experience(), 0);
    assert_eq!(c.proficiency_bonus(), 2);
}

#[test]
fn test_proficiencies_merge_all_sources() {
    let builder = test_builder();
    let c = builder
        .create_character("Gimli", "Dwarf", "Fighter", Some("Soldier"))
        .unwrap();
    let profs = c.proficiencies();

    assert!(profs["Weapons"].contains(&"Warhammer".to_string()));
    assert!(profs["Weapons"].contains(&"Martial Weapons".to_string()));
    assert!(profs["Skills"].contains(&"Athletics".to_string()));
    assert_eq!(
        profs["Tools"],
        vec!["Smith's Tools".to_string(), "Dice Set".to_string(), "Vehicles (Land)".to_string()]
    );
    // Every taxonomy entry exists even when nothing was granted
    assert!(profs.contains_key("Armor"));
    assert!(profs.contains_key("Saving Throws"));
}

#[test]
fn test_equipment_role_then_background() {
    let builder = test_builder();
    let rules = builder.rules();
    let c = builder
        .create_character("Vex", "Human", "Rogue", Some("Criminal"))
        .unwrap();

    let mut expected = rules.role("Rogue").unwrap().equipment.clone();
    expected.extend(rules.background("Criminal").unwrap().equipment.iter().cloned());
    assert_eq!(c.equipment(), expected.as_slice());
}

#[test]
fn test_special_rule_buckets_seeded() {
    let builder = test_builder();
    let c = builder
        .create_character("Sister Ama", "Human", "Cleric", Some("Acolyte"))
        .unwrap();
    let rules = c.special_rules();

    assert!(rules.get(SpecialRules::RACE_RULES).is_empty());
    assert_eq!(
        rules.get(SpecialRules::ROLE_RULES),
        ["Spellcasting".to_string(), "Divine Domain".to_string()]
    );
    assert_eq!(rules.get(SpecialRules::ROLE_ABILITIES), ["Cantrips Known: 3".to_string()]);
    assert_eq!(
        rules.get(SpecialRules::BACKGROUND_FEATURE),
        ["Shelter of the Faithful".to_string()]
    );
    assert!(rules.get(SpecialRules::OTHER).is_empty());
}

#[rstest]
#[case("Gnome", "Fighter", None)]
#[case("Elf", "Bard", None)]
#[case("Elf", "Wizard", Some("Noble"))]
fn test_unknown_identity_is_lookup_error(
    #[case] race: &str,
    #[case] role: &str,
    #[case] background: Option<&str>,
) {
    let builder = test_builder();
    let err = builder
        .create_character("Nobody", race, role, background)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn test_catalog_race_without_stats_fails_on_use() {
    let rules = edited_rules(|catalog, _, _| {
        catalog["Races"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!("Tiefling"));
    });
    assert!(rules.race_names().iter().any(|r| r == "Tiefling"));

    let builder = crate::core::character_gen::CharacterBuilder::new(rules, Default::default());
    let err = builder
        .create_character("Nyx", "Tiefling", "Wizard", None)
        .unwrap_err();
    assert!(matches!(err, CharacterGenError::UnknownRace(ref r) if r == "Tiefling"));
}

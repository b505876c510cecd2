//! Derived statistics and level progression

use rstest::rstest;

use crate::core::character_gen::{
    ability_modifier, CharacterBuilder, CharacterGenError, ErrorKind, GenerationConfig, SpecialRules,
};
use crate::tests::common::*;

#[rstest]
#[case(10, 0)]
#[case(11, 0)]
#[case(7, -2)]
#[case(20, 5)]
#[case(9, -1)]
#[case(3, -4)]
#[case(30, 10)]
fn test_modifier_table(#[case] score: i32, #[case] expected: i32) {
    assert_eq!(ability_modifier(score), expected);
}

#[rstest]
#[case("Fighter", 10)]
#[case("Cleric", 8)]
#[case("Rogue", 8)]
#[case("Wizard", 6)]
fn test_starting_hit_points(#[case] role: &str, #[case] base: i32) {
    let builder = test_builder();
    let mut c = builder.create_character("Hero", "Human", role, None).unwrap();
    c.set_attribute("Constitution", 14).unwrap();
    builder.derive_stats(&mut c).unwrap();
    assert_eq!(c.hit_points(), base + 2);
}

#[test]
fn test_hit_points_need_constitution() {
    let rules = edited_rules(|catalog, _, _| {
        let attributes = catalog["Attributes"].as_array_mut().unwrap();
        attributes.retain(|a| a != "Constitution");
    });
    let builder = CharacterBuilder::new(rules, GenerationConfig::default());
    let mut c = builder.create_character("Frail", "Elf", "Wizard", None).unwrap();
    c.set_hit_points(3);

    let err = builder.derive_stats(&mut c).unwrap_err();
    assert!(matches!(err, CharacterGenError::UnknownAttribute(ref a) if a == "Constitution"));
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(c.hit_points(), 3);
}

#[test]
fn test_armor_class_tracks_dexterity() {
    let builder = test_builder();
    let mut c = builder.create_character("Quick", "Halfling", "Rogue", None).unwrap();
    for (dex, ac) in [(8, 9), (10, 10), (13, 11), (18, 14)] {
        c.set_attribute("Dexterity", dex).unwrap();
        assert_eq!(c.armor_class(), ac);
    }
}

#[test]
fn test_fighter_level_up_hit_point_range() {
    let builder = test_builder();
    for seed in 0..40 {
        let mut c = builder.create_character("Brann", "Human", "Fighter", None).unwrap();
        c.set_attribute("Constitution", 13).unwrap();
        builder.derive_stats(&mut c).unwrap();
        let old = c.hit_points();

        builder.level_up(&mut c, &mut seeded_rng(seed)).unwrap();
        assert!((old + 2..=old + 11).contains(&c.hit_points()));
        assert_eq!(c.level(), 2);
    }
}

#[test]
fn test_level_up_to_table_end() {
    let builder = test_builder();
    let mut c = finished_character(&builder, "Dwarf", "Cleric", 12);
    let mut rng = seeded_rng(12);
    let max = builder.rules().role("Cleric").unwrap().max_level().unwrap();

    let mut level = c.level();
    while level < max {
        let report = builder.level_up(&mut c, &mut rng).unwrap();
        assert_eq!(report.level, level + 1);
        assert_eq!(c.level(), level + 1);
        assert_eq!(
            c.proficiency_bonus(),
            builder.rules().role("Cleric").unwrap().level(report.level).unwrap().proficiency_bonus
        );
        assert_eq!(c.special_rules().get(SpecialRules::ROLE_ABILITIES), report.abilities.as_slice());
        level = c.level();
    }

    let before_hp = c.hit_points();
    let before_rules = c.special_rules().clone();
    let err = builder.level_up(&mut c, &mut rng).unwrap_err();
    assert!(matches!(err, CharacterGenError::MissingLevel { level, .. } if level == max + 1));
    assert_eq!(c.level(), max);
    assert_eq!(c.hit_points(), before_hp);
    assert_eq!(c.special_rules(), &before_rules);
}

#[test]
fn test_level_up_role_rules_accumulate() {
    let builder = test_builder();
    let mut c = finished_character(&builder, "Elf", "Rogue", 3);
    let mut rng = seeded_rng(3);
    for _ in 0..4 {
        builder.level_up(&mut c, &mut rng).unwrap();
    }

    let rules = c.special_rules().get(SpecialRules::ROLE_RULES);
    assert_eq!(&rules[..2], ["Expertise".to_string(), "Thieves' Cant".to_string()]);
    assert!(rules.contains(&"Cunning Action".to_string()));
    assert!(rules.contains(&"Uncanny Dodge".to_string()));
    assert_eq!(
        c.special_rules().get(SpecialRules::ROLE_ABILITIES),
        ["Sneak Attack: 3d6".to_string()]
    );
    assert_eq!(c.proficiency_bonus(), 3);
}

#[test]
fn test_unparseable_hit_die() {
    let rules = edited_rules(|_, stats, _| {
        stats["RoleStats"]["Wizard"]["Hit Die"] = serde_json::json!("six");
    });
    let builder = CharacterBuilder::new(rules, GenerationConfig::default());
    let mut c = builder.create_character("Oops", "Human", "Wizard", None).unwrap();
    c.set_attribute("Constitution", 12).unwrap();

    let err = builder.level_up(&mut c, &mut seeded_rng(0)).unwrap_err();
    assert!(matches!(err, CharacterGenError::InvalidHitDie { .. }));
    assert_eq!(c.level(), 1);
}

#[test]
fn test_oversized_hit_die_is_rejected() {
    let rules = edited_rules(|_, stats, _| {
        stats["RoleStats"]["Fighter"]["Hit Die"] = serde_json::json!("d4000000000");
    });
    let builder = CharacterBuilder::new(rules, GenerationConfig::default());
    let mut c = builder.create_character("Giant", "Human", "Fighter", None).unwrap();
    c.set_attribute("Constitution", 12).unwrap();
    builder.derive_stats(&mut c).unwrap();
    let hit_points = c.hit_points();

    let err = builder.level_up(&mut c, &mut seeded_rng(0)).unwrap_err();
    assert!(matches!(err, CharacterGenError::InvalidHitDie { .. }));
    assert_eq!(c.level(), 1);
    assert_eq!(c.hit_points(), hit_points);
}

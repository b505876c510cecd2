//! Score generation: dice sessions, standard array and point buy

use rstest::rstest;

use crate::core::character_gen::{CharacterGenError, ErrorKind, ScoreMethod};
use crate::tests::common::*;

// ============================================================================
// Point Buy
// ============================================================================

#[test]
fn test_point_buy_raise_to_fifteen_costs_nine() {
    let builder = test_builder();
    let mut session = builder.point_buy().unwrap();

    assert_eq!(session.remaining(), 27);
    assert_eq!(session.set_score(0, 15).unwrap(), 18);
    assert_eq!(session.scores()[0], 15);
}

#[rstest]
#[case(16)]
#[case(7)]
#[case(3)]
#[case(18)]
fn test_point_buy_rejects_out_of_range(#[case] score: i32) {
    let builder = test_builder();
    let mut session = builder.point_buy().unwrap();
    session.set_score(2, 12).unwrap();
    let before = (session.scores().to_vec(), session.remaining());

    let err = session.set_score(2, score).unwrap_err();
    assert!(matches!(err, CharacterGenError::ScoreOutOfRange { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!((session.scores().to_vec(), session.remaining()), before);
}

#[test]
fn test_point_buy_lowering_refunds() {
    let builder = test_builder();
    let mut session = builder.point_buy().unwrap();
    session.set_score(0, 14).unwrap();
    assert_eq!(session.remaining(), 20);
    session.set_score(0, 9).unwrap();
    assert_eq!(session.remaining(), 26);
}

#[test]
fn test_point_buy_cannot_overspend() {
    let builder = test_builder();
    let mut session = builder.point_buy().unwrap();
    for slot in 0..3 {
        session.set_score(slot, 15).unwrap();
    }
    assert_eq!(session.remaining(), 0);

    assert!(matches!(
        session.raise(3),
        Err(CharacterGenError::InsufficientPoints { needed: 1, available: 0 })
    ));
    assert_eq!(session.finish(), vec![15, 15, 15, 8, 8, 8]);
}

#[test]
fn test_point_buy_gap_in_cost_table() {
    let rules = edited_rules(|_, stats, _| {
        stats["PointsCost"].as_object_mut().unwrap().remove("12");
    });
    let builder = crate::core::character_gen::CharacterBuilder::new(rules, Default::default());
    let mut session = builder.point_buy().unwrap();

    assert!(matches!(
        session.set_score(0, 12),
        Err(CharacterGenError::ScoreOutOfRange { score: 12, .. })
    ));
    assert_eq!(session.set_score(0, 13).unwrap(), 22);
}

#[test]
fn test_point_buy_floor_with_cost_keeps_full_budget() {
    let rules = edited_rules(|_, stats, _| {
        stats["PointsCost"] = serde_json::json!({"8": 1, "9": 2, "10": 3, "15": 11});
        stats["PointsTotal"] = serde_json::json!(10);
    });
    let builder = crate::core::character_gen::CharacterBuilder::new(rules, Default::default());
    let mut session = builder.point_buy().unwrap();

    assert_eq!(session.scores(), &[8; 6]);
    assert_eq!(session.remaining(), 10);
    assert_eq!(session.set_score(0, 10).unwrap(), 8);
    assert_eq!(session.raise(1).unwrap(), 7);
    assert!(matches!(
        session.set_score(2, 15),
        Err(CharacterGenError::InsufficientPoints { needed: 10, available: 7 })
    ));
    assert_eq!(session.lower(0).unwrap(), 8);
    assert_eq!(session.finish(), vec![9, 9, 8, 8, 8, 8]);
}

#[test]
fn test_point_buy_unavailable_without_table() {
    let rules = edited_rules(|_, stats, _| {
        let stats = stats.as_object_mut().unwrap();
        stats.remove("PointsCost");
        stats.remove("PointsTotal");
    });
    let builder = crate::core::character_gen::CharacterBuilder::new(rules, Default::default());
    let err = builder.point_buy().unwrap_err();
    assert!(matches!(err, CharacterGenError::PointBuyUnavailable));
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

// ============================================================================
// Standard Array and Dice
// ============================================================================

#[test]
fn test_standard_array_sorted() {
    let builder = test_builder();
    let scores = builder
        .generate_scores(&ScoreMethod::Standard, &mut seeded_rng(0))
        .unwrap();
    assert_eq!(scores, STANDARD_POOL.to_vec());
}

#[test]
fn test_standard_array_unavailable() {
    let rules = edited_rules(|_, stats, _| {
        stats.as_object_mut().unwrap().remove("StandardPoints");
    });
    let builder = crate::core::character_gen::CharacterBuilder::new(rules, Default::default());
    assert!(matches!(
        builder.generate_scores(&ScoreMethod::Standard, &mut seeded_rng(0)),
        Err(CharacterGenError::StandardArrayUnavailable)
    ));
}

#[test]
fn test_roll_session_honours_configured_budget() {
    let builder = builder_with(crate::core::character_gen::GenerationConfig {
        rerolls: 1,
        ..Default::default()
    });
    let mut rng = seeded_rng(21);
    let mut session = builder.roll_session(&mut rng);
    assert_eq!(session.rerolls_remaining(), 1);

    session.reroll(&mut rng).unwrap();
    let kept = session.scores().to_vec();
    let err = session.reroll(&mut rng).unwrap_err();
    assert!(matches!(err, CharacterGenError::RerollsExhausted));
    assert_eq!(session.scores(), kept.as_slice());
}

#[test]
fn test_rolled_scores_within_bounds() {
    let builder = test_builder();
    let mut rng = seeded_rng(77);
    for _ in 0..50 {
        let scores = builder.generate_scores(&ScoreMethod::Roll, &mut rng).unwrap();
        assert_eq!(scores.len(), 6);
        assert!(scores.iter().all(|s| (3..=18).contains(s)));
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}

//! The per-stage roll resolution engine
//!
//! One evaluator resolves one stage for one ordered (attacker, defender)
//! pair: draw a d6, fold the filtered roll modifiers over it, check for
//! auto-success, judge the result against the bound strategy, and grant
//! at most one reroll. The same machine serves all five stages; only the
//! strategy and the filtered rule subsets differ.

use std::fmt;

use rand::Rng;

use crate::combatant::Combatant;
use crate::core::error::Result;
use crate::rules::{Rule, Stage};
use crate::strategy::RollStrategy;

/// Single six-sided die
fn roll_d6<R: Rng>(rng: &mut R) -> i32 {
    rng.gen_range(1..=6)
}

/// Resolves one stage for one (attacker, defender) pair
///
/// Construction filters both rule lists down to the capabilities relevant
/// to the stage, attacker's rules ahead of the defender's; that
/// concatenation order is both the modifier fold order and the reroll
/// scan order. Target numbers are resolved up front so a matchup with a
/// missing statistic fails before any die is drawn; after construction,
/// resolution itself cannot fail.
pub struct RollEvaluator<'a> {
    stage: Stage,
    attacker: &'a Combatant,
    defender: &'a Combatant,
    strategy: &'a dyn RollStrategy,
    roll_modifiers: Vec<&'a Rule>,
    reroll_modifiers: Vec<&'a Rule>,
    auto_success: Vec<&'a Rule>,
    /// Wound-stage target number; resolved only when an auto-success rule
    /// needs it as the floor of its supplementary draw
    auto_floor: i32,
}

impl fmt::Debug for RollEvaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollEvaluator")
            .field("stage", &self.stage)
            .field("attacker", &self.attacker)
            .field("defender", &self.defender)
            .field("roll_modifiers", &self.roll_modifiers)
            .field("reroll_modifiers", &self.reroll_modifiers)
            .field("auto_success", &self.auto_success)
            .field("auto_floor", &self.auto_floor)
            .finish_non_exhaustive()
    }
}

impl<'a> RollEvaluator<'a> {
    pub fn new(stage: Stage, attacker: &'a Combatant, defender: &'a Combatant) -> Result<Self> {
        let filtered = |pred: &dyn Fn(&Rule) -> bool| -> Vec<&'a Rule> {
            attacker
                .offensive_rules()
                .iter()
                .chain(defender.defensive_rules().iter())
                .filter(|rule| pred(rule))
                .collect()
        };

        let roll_modifiers = filtered(&|rule| rule.modifies_roll(stage));
        let reroll_modifiers = filtered(&|rule| rule.rerolls(stage));
        let auto_success = filtered(&|rule| rule.auto_success(stage));

        let strategy = attacker.strategy(stage);
        strategy.target_number(attacker, defender)?;

        let auto_floor = if auto_success.is_empty() {
            1
        } else {
            attacker
                .strategy(Stage::Wound)
                .target_number(attacker, defender)?
        };

        Ok(Self {
            stage,
            attacker,
            defender,
            strategy,
            roll_modifiers,
            reroll_modifiers,
            auto_success,
            auto_floor,
        })
    }

    /// Run one trial of this stage
    pub fn resolve<R: Rng>(&self, rng: &mut R) -> Result<bool> {
        // Draw and fold modifiers in list order.
        let roll = self.roll_and_modify(rng);

        // An auto-success rule bypasses the die check; the drawn value is
        // discarded.
        for rule in &self.auto_success {
            if rule.roll_auto_success(self.stage, self.auto_floor, rng) {
                return Ok(true);
            }
        }

        if self.strategy.evaluate(self.attacker, self.defender, roll)? {
            return Ok(true);
        }

        // One reroll at most; its evaluation is final.
        if self.should_reroll(roll) {
            let roll = self.roll_and_modify(rng);
            return self.strategy.evaluate(self.attacker, self.defender, roll);
        }

        Ok(false)
    }

    fn roll_and_modify<R: Rng>(&self, rng: &mut R) -> i32 {
        let mut roll = roll_d6(rng);
        for rule in &self.roll_modifiers {
            roll = rule.modify_roll(self.stage, roll);
        }
        roll
    }

    fn should_reroll(&self, roll: i32) -> bool {
        self.reroll_modifiers
            .iter()
            .any(|rule| rule.grants_reroll(self.stage, roll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{fixtures, Combatant, Profile, Statistic};
    use crate::core::error::SimError;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn success_rate(evaluator: &RollEvaluator<'_>, trials: u32, seed: u64) -> f64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let successes = (0..trials)
            .filter(|_| evaluator.resolve(&mut rng).unwrap())
            .count();
        successes as f64 / trials as f64
    }

    #[test]
    fn test_bare_evaluator_matches_base_threshold() {
        // Equal weapon skill: target 4, success 3/6.
        let attacker = fixtures::swordsman();
        let defender = fixtures::swordsman();
        let evaluator = RollEvaluator::new(Stage::Hit, &attacker, &defender).unwrap();
        let rate = success_rate(&evaluator, 20_000, 1);
        assert!((rate - 0.5).abs() < 0.02, "got {rate}");
    }

    #[test]
    fn test_save_stage_is_certain_without_modifiers() {
        let attacker = fixtures::swordsman();
        let defender = fixtures::swordsman();
        let evaluator = RollEvaluator::new(Stage::ArmourSave, &attacker, &defender).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..200 {
            assert!(evaluator.resolve(&mut rng).unwrap());
        }
    }

    #[test]
    fn test_unachievable_target_never_succeeds() {
        // S2 vs T8 is more than five apart: wound target 7.
        let attacker = Combatant::new(
            "Weakling",
            Profile {
                weapon_skill: Some(2),
                strength: Some(2),
                ..Profile::default()
            },
            1.0,
        );
        let defender = Combatant::new(
            "Monolith",
            Profile {
                weapon_skill: Some(2),
                toughness: Some(8),
                ..Profile::default()
            },
            1.0,
        );
        let evaluator = RollEvaluator::new(Stage::Wound, &attacker, &defender).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            assert!(!evaluator.resolve(&mut rng).unwrap());
        }
    }

    #[test]
    fn test_armour_stack_can_make_piercing_impossible() {
        // Four save modifiers totalling -6 push every roll below 1.
        let attacker = fixtures::swordsman();
        let mut defender = fixtures::swordsman();
        defender.add_defensive_rule(Rule::HeavyArmour);
        defender.add_defensive_rule(Rule::HeavyArmour);
        defender.add_defensive_rule(Rule::Shield);
        defender.add_defensive_rule(Rule::Shield);
        let evaluator = RollEvaluator::new(Stage::ArmourSave, &attacker, &defender).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..500 {
            assert!(!evaluator.resolve(&mut rng).unwrap());
        }
    }

    #[test]
    fn test_armour_piercing_counters_armour() {
        // Heavy armour alone: pierce needs a raw 3+. With +2 piercing the
        // net modifier is zero and piercing is certain again.
        let mut attacker = fixtures::swordsman();
        attacker.add_offensive_rule(Rule::ArmourPiercing(2));
        let mut defender = fixtures::swordsman();
        defender.add_defensive_rule(Rule::HeavyArmour);
        let evaluator = RollEvaluator::new(Stage::ArmourSave, &attacker, &defender).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            assert!(evaluator.resolve(&mut rng).unwrap());
        }
    }

    #[test]
    fn test_single_reroll_rate() {
        // Equal skill with Hatred: p = 1/2 on the first roll, plus one
        // retry, 0.75 overall. A cascade would push this to 0.875+; no
        // reroll at all would leave it at 0.5.
        let mut attacker = fixtures::swordsman();
        attacker.add_offensive_rule(Rule::Hatred);
        let defender = fixtures::swordsman();
        let evaluator = RollEvaluator::new(Stage::Hit, &attacker, &defender).unwrap();
        let rate = success_rate(&evaluator, 20_000, 6);
        assert!((rate - 0.75).abs() < 0.02, "got {rate}");
    }

    #[test]
    fn test_reroll_ignored_on_other_stages() {
        // Hatred is a hit-stage rule; an equal-skill wound evaluator
        // stays at its bare rate.
        let mut attacker = fixtures::swordsman();
        attacker.add_offensive_rule(Rule::Hatred);
        let defender = fixtures::swordsman();
        let evaluator = RollEvaluator::new(Stage::Wound, &attacker, &defender).unwrap();
        let rate = success_rate(&evaluator, 20_000, 7);
        assert!((rate - 0.5).abs() < 0.02, "got {rate}");
    }

    #[test]
    fn test_auto_success_overrides_impossible_save() {
        // The defender's armour stack blocks every ordinary pierce, but
        // the attacker's wound target is 6+ (S3 vs T8 via bonus), so the
        // cleaving draw interval collapses to a certain 6.
        let mut attacker = fixtures::swordsman();
        attacker.add_offensive_rule(Rule::CleavingBlow);
        let mut defender = fixtures::swordsman();
        defender.add_defensive_rule(Rule::ToughnessBonus(5));
        defender.add_defensive_rule(Rule::HeavyArmour);
        defender.add_defensive_rule(Rule::HeavyArmour);
        defender.add_defensive_rule(Rule::Shield);
        defender.add_defensive_rule(Rule::Shield);
        let evaluator = RollEvaluator::new(Stage::ArmourSave, &attacker, &defender).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..500 {
            assert!(evaluator.resolve(&mut rng).unwrap());
        }
    }

    #[test]
    fn test_auto_success_rate_from_wound_interval() {
        // Equal strength and toughness: wound target 4, cleaving draw on
        // [4, 6], success 1/3, independent of the blocked ordinary roll.
        let mut attacker = fixtures::swordsman();
        attacker.add_offensive_rule(Rule::CleavingBlow);
        let mut defender = fixtures::swordsman();
        defender.add_defensive_rule(Rule::HeavyArmour);
        defender.add_defensive_rule(Rule::HeavyArmour);
        defender.add_defensive_rule(Rule::Shield);
        defender.add_defensive_rule(Rule::Shield);
        let evaluator = RollEvaluator::new(Stage::ArmourSave, &attacker, &defender).unwrap();
        let rate = success_rate(&evaluator, 20_000, 9);
        assert!((rate - 1.0 / 3.0).abs() < 0.02, "got {rate}");
    }

    #[test]
    fn test_missing_statistic_fails_before_any_trial() {
        let attacker = Combatant::new("Blank", Profile::default(), 1.0);
        let defender = fixtures::swordsman();
        let err = RollEvaluator::new(Stage::Hit, &attacker, &defender).unwrap_err();
        match err {
            SimError::MissingStatistic { statistic, stage } => {
                assert_eq!(statistic, Statistic::WeaponSkill);
                assert_eq!(stage, Stage::Hit);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_bare_hit_rate_converges_to_table(ws_a in 1i32..=10, ws_b in 1i32..=10) {
            // With no modifiers the measured rate converges to
            // (7 - target) / 6, clipped to [0, 1].
            let attacker = Combatant::new(
                "A",
                Profile { weapon_skill: Some(ws_a), ..Profile::default() },
                1.0,
            );
            let defender = Combatant::new(
                "D",
                Profile { weapon_skill: Some(ws_b), ..Profile::default() },
                1.0,
            );
            let evaluator = RollEvaluator::new(Stage::Hit, &attacker, &defender).unwrap();
            let target = attacker
                .strategy(Stage::Hit)
                .target_number(&attacker, &defender)
                .unwrap();
            let expected = (f64::from(7 - target) / 6.0).clamp(0.0, 1.0);
            let seed = (ws_a * 16 + ws_b) as u64;
            let rate = success_rate(&evaluator, 6_000, seed);
            prop_assert!((rate - expected).abs() < 0.03, "rate {rate}, expected {expected}");
        }
    }

    #[test]
    fn test_cleaving_needs_a_wound_target() {
        // An armour-save evaluator normally never touches strength or
        // toughness, but an auto-success rule drags the wound target in.
        let mut attacker = Combatant::new(
            "Headsman",
            Profile {
                weapon_skill: Some(3),
                ..Profile::default()
            },
            1.0,
        );
        attacker.add_offensive_rule(Rule::CleavingBlow);
        let defender = fixtures::swordsman();
        let err = RollEvaluator::new(Stage::ArmourSave, &attacker, &defender).unwrap_err();
        assert!(matches!(
            err,
            SimError::MissingStatistic {
                statistic: Statistic::Strength,
                stage: Stage::Wound,
            }
        ));
    }
}

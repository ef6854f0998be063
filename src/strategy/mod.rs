//! Per-stage roll evaluation strategies
//!
//! A strategy computes the target number for a stage from the two
//! profiles and judges a modified roll against it. Strategies are
//! stateless; one instance is bound per stage per combatant.

use crate::combatant::{Combatant, Statistic};
use crate::core::error::Result;
use crate::rules::Stage;

/// Policy computing a stage's target number and judging modified rolls
pub trait RollStrategy: Send + Sync {
    /// Minimum post-modifier die value required for success
    fn target_number(&self, attacker: &Combatant, defender: &Combatant) -> Result<i32>;

    /// Judge a modified roll; meet-or-beat the target number by default
    fn evaluate(&self, attacker: &Combatant, defender: &Combatant, roll: i32) -> Result<bool> {
        Ok(roll >= self.target_number(attacker, defender)?)
    }
}

/// Weapon-skill matchup table for rolls to hit
///
/// Base target number 5, then three sequential checks. The checks are
/// independent conditionals, not a ranked branch: a later match overrides
/// an earlier one.
pub struct DefaultHitStrategy;

impl RollStrategy for DefaultHitStrategy {
    fn target_number(&self, attacker: &Combatant, defender: &Combatant) -> Result<i32> {
        let attacker_ws = attacker.require(Statistic::WeaponSkill, Stage::Hit)?;
        let defender_ws = defender.require(Statistic::WeaponSkill, Stage::Hit)?;

        let mut target = 5;
        if defender_ws <= attacker_ws * 2 {
            target = 4;
        }
        if defender_ws < attacker_ws {
            target = 3;
        }
        // Strictly below half the attacker's skill, kept fractional:
        // 2*t < a rather than t < a/2 under integer division.
        if defender_ws * 2 < attacker_ws {
            target = 2;
        }
        Ok(target)
    }
}

/// Strength-versus-toughness table for rolls to wound
///
/// Effective strength and toughness fold in the stat-modifying rules
/// carried by the attacker (offensive) and defender (defensive). A gap of
/// more than five in the defender's favour yields an unachievable 7.
pub struct DefaultWoundStrategy;

impl RollStrategy for DefaultWoundStrategy {
    fn target_number(&self, attacker: &Combatant, defender: &Combatant) -> Result<i32> {
        let strength = attacker.require(Statistic::Strength, Stage::Wound)?
            + attacker
                .offensive_rules()
                .iter()
                .map(|rule| rule.strength_delta())
                .sum::<i32>();
        let toughness = defender.require(Statistic::Toughness, Stage::Wound)?
            + defender
                .defensive_rules()
                .iter()
                .map(|rule| rule.toughness_delta())
                .sum::<i32>();

        let target = if toughness > strength + 5 {
            7
        } else if toughness > strength + 1 {
            6
        } else if toughness > strength {
            5
        } else if toughness == strength {
            4
        } else if toughness > strength - 2 {
            3
        } else {
            2
        };
        Ok(target)
    }
}

/// Baseline policy for all three save stages
///
/// Target number 1: the attacker pierces on any unmodified roll, and only
/// roll modifiers (armour, regeneration thresholds) can push the
/// effective roll below the target.
pub struct DefaultSaveStrategy;

impl RollStrategy for DefaultSaveStrategy {
    fn target_number(&self, _attacker: &Combatant, _defender: &Combatant) -> Result<i32> {
        Ok(1)
    }
}

//! Rule modifiers: composable units of behaviour keyed by stage and role
//!
//! A rule participates in one or more stages in one or more roles:
//! adjusting the die roll, granting the single reroll, or bypassing the
//! die check entirely. Evaluators never inspect concrete variants; they
//! query capabilities per stage.

pub mod registry;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The five resolution steps of an attack sequence, in causal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Hit,
    Wound,
    ArmourSave,
    WardSave,
    RegenerationSave,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Hit,
        Stage::Wound,
        Stage::ArmourSave,
        Stage::WardSave,
        Stage::RegenerationSave,
    ];
}

/// A concrete rule carried by a combatant's offensive or defensive list
///
/// Variants are immutable and at most carry one validated integer; the
/// registry is the only constructor path for configuration input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Armour save roll -1
    LightArmour,
    /// Armour save roll -2
    HeavyArmour,
    /// Armour save roll -1, stacks with worn armour
    Shield,
    /// Armour save roll +n for the attacker, 1..=6
    ArmourPiercing(i32),
    /// Regeneration save roll -(t - 5), threshold t in 1..=6
    Regeneration(i32),
    /// Signed delta added to effective strength in the wound table
    StrengthBonus(i32),
    /// Signed delta added to effective toughness in the wound table
    ToughnessBonus(i32),
    /// Bypasses armour and regeneration saves on a supplementary 6
    CleavingBlow,
    /// Grants the single reroll on a failed roll to hit
    Hatred,
}

impl Rule {
    /// Does this rule adjust the die roll for `stage`?
    pub fn modifies_roll(&self, stage: Stage) -> bool {
        matches!(
            (self, stage),
            (Rule::LightArmour, Stage::ArmourSave)
                | (Rule::HeavyArmour, Stage::ArmourSave)
                | (Rule::Shield, Stage::ArmourSave)
                | (Rule::ArmourPiercing(_), Stage::ArmourSave)
                | (Rule::Regeneration(_), Stage::RegenerationSave)
        )
    }

    /// Fold one roll adjustment. Identity for stages this rule ignores.
    pub fn modify_roll(&self, stage: Stage, roll: i32) -> i32 {
        match (self, stage) {
            (Rule::LightArmour, Stage::ArmourSave) => roll - 1,
            (Rule::HeavyArmour, Stage::ArmourSave) => roll - 2,
            (Rule::Shield, Stage::ArmourSave) => roll - 1,
            (Rule::ArmourPiercing(n), Stage::ArmourSave) => roll + n,
            (Rule::Regeneration(t), Stage::RegenerationSave) => roll - (t - 5),
            _ => roll,
        }
    }

    /// Does this rule carry the reroll capability for `stage`?
    pub fn rerolls(&self, stage: Stage) -> bool {
        matches!((self, stage), (Rule::Hatred, Stage::Hit))
    }

    /// Decide whether the failed `roll` earns the single reroll
    pub fn grants_reroll(&self, stage: Stage, _roll: i32) -> bool {
        match self {
            Rule::Hatred => stage == Stage::Hit,
            _ => false,
        }
    }

    /// Does this rule carry the auto-success capability for `stage`?
    pub fn auto_success(&self, stage: Stage) -> bool {
        matches!(
            (self, stage),
            (Rule::CleavingBlow, Stage::ArmourSave)
                | (Rule::CleavingBlow, Stage::RegenerationSave)
        )
    }

    /// Resolve one auto-success attempt
    ///
    /// `wound_target` is the wound-stage target number for this matchup;
    /// a cleaving draw is uniform on [wound_target, 6] and succeeds only
    /// on the maximal face. The floor is clamped into [1, 6] so an
    /// unachievable wound target degenerates to a certain 6 rather than
    /// an empty range.
    pub fn roll_auto_success<R: Rng>(
        &self,
        stage: Stage,
        wound_target: i32,
        rng: &mut R,
    ) -> bool {
        if !self.auto_success(stage) {
            return false;
        }
        match self {
            Rule::CleavingBlow => {
                let floor = wound_target.clamp(1, 6);
                rng.gen_range(floor..=6) == 6
            }
            _ => false,
        }
    }

    /// Contribution to effective strength in the wound table
    pub fn strength_delta(&self) -> i32 {
        match self {
            Rule::StrengthBonus(d) => *d,
            _ => 0,
        }
    }

    /// Contribution to effective toughness in the wound table
    pub fn toughness_delta(&self) -> i32 {
        match self {
            Rule::ToughnessBonus(d) => *d,
            _ => 0,
        }
    }
}

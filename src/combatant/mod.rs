//! Combat profiles and the entity contract consumed by the evaluators
//!
//! A `Combatant` is assembled once from configuration and is read-only for
//! the duration of a run: rule lists keep their configured order (that
//! order decides modifier application and reroll precedence), and exactly
//! one strategy is bound per stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::rules::registry;
use crate::rules::{Rule, Stage};
use crate::strategy::RollStrategy;

/// Named statistic slots on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    WeaponSkill,
    Strength,
    Toughness,
    Initiative,
    Attacks,
    Wounds,
}

/// Raw statistic block
///
/// Entries may be absent in the roster; absence only becomes an error when
/// a strategy (or the aggregator) actually needs the value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Profile {
    pub weapon_skill: Option<i32>,
    pub strength: Option<i32>,
    pub toughness: Option<i32>,
    pub initiative: Option<i32>,
    pub attacks: Option<i32>,
    pub wounds: Option<i32>,
}

impl Profile {
    pub fn get(&self, statistic: Statistic) -> Option<i32> {
        match statistic {
            Statistic::WeaponSkill => self.weapon_skill,
            Statistic::Strength => self.strength,
            Statistic::Toughness => self.toughness,
            Statistic::Initiative => self.initiative,
            Statistic::Attacks => self.attacks,
            Statistic::Wounds => self.wounds,
        }
    }
}

/// One bound strategy per stage
pub struct StageStrategies {
    hit: Box<dyn RollStrategy>,
    wound: Box<dyn RollStrategy>,
    armour_save: Box<dyn RollStrategy>,
    ward_save: Box<dyn RollStrategy>,
    regeneration_save: Box<dyn RollStrategy>,
}

impl Default for StageStrategies {
    fn default() -> Self {
        let default_for = |stage| {
            registry::build_strategy(stage, "default")
                .expect("default strategy registered for every stage")
        };
        Self {
            hit: default_for(Stage::Hit),
            wound: default_for(Stage::Wound),
            armour_save: default_for(Stage::ArmourSave),
            ward_save: default_for(Stage::WardSave),
            regeneration_save: default_for(Stage::RegenerationSave),
        }
    }
}

impl StageStrategies {
    pub fn get(&self, stage: Stage) -> &dyn RollStrategy {
        match stage {
            Stage::Hit => self.hit.as_ref(),
            Stage::Wound => self.wound.as_ref(),
            Stage::ArmourSave => self.armour_save.as_ref(),
            Stage::WardSave => self.ward_save.as_ref(),
            Stage::RegenerationSave => self.regeneration_save.as_ref(),
        }
    }

    pub fn set(&mut self, stage: Stage, strategy: Box<dyn RollStrategy>) {
        match stage {
            Stage::Hit => self.hit = strategy,
            Stage::Wound => self.wound = strategy,
            Stage::ArmourSave => self.armour_save = strategy,
            Stage::WardSave => self.ward_save = strategy,
            Stage::RegenerationSave => self.regeneration_save = strategy,
        }
    }
}

/// One entity's combat profile, rule lists and strategy bindings
pub struct Combatant {
    name: String,
    profile: Profile,
    points: f64,
    offensive: Vec<Rule>,
    defensive: Vec<Rule>,
    strategies: StageStrategies,
}

impl Combatant {
    pub fn new(name: impl Into<String>, profile: Profile, points: f64) -> Self {
        Self {
            name: name.into(),
            profile,
            points,
            offensive: Vec::new(),
            defensive: Vec::new(),
            strategies: StageStrategies::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    /// Rules this entity contributes when attacking, in configured order
    pub fn offensive_rules(&self) -> &[Rule] {
        &self.offensive
    }

    /// Rules this entity contributes when defending, in configured order
    pub fn defensive_rules(&self) -> &[Rule] {
        &self.defensive
    }

    pub fn strategy(&self, stage: Stage) -> &dyn RollStrategy {
        self.strategies.get(stage)
    }

    /// Fetch a statistic a strategy needs, or fail naming it and the stage
    pub fn require(&self, statistic: Statistic, stage: Stage) -> Result<i32> {
        self.profile
            .get(statistic)
            .ok_or(SimError::MissingStatistic { statistic, stage })
    }

    // Configuration-time mutators; never called during a run.

    pub fn add_offensive_rule(&mut self, rule: Rule) {
        self.offensive.push(rule);
    }

    pub fn add_defensive_rule(&mut self, rule: Rule) {
        self.defensive.push(rule);
    }

    pub fn set_strategy(&mut self, stage: Stage, strategy: Box<dyn RollStrategy>) {
        self.strategies.set(stage, strategy);
    }
}

impl fmt::Debug for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combatant")
            .field("name", &self.name)
            .field("profile", &self.profile)
            .field("points", &self.points)
            .field("offensive", &self.offensive)
            .field("defensive", &self.defensive)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stat = |v: Option<i32>| v.map_or("-".to_string(), |v| v.to_string());
        write!(
            f,
            "{} (WS {}, S {}, T {}, I {}, A {}, W {}, {} pts)",
            self.name,
            stat(self.profile.weapon_skill),
            stat(self.profile.strength),
            stat(self.profile.toughness),
            stat(self.profile.initiative),
            stat(self.profile.attacks),
            stat(self.profile.wounds),
            self.points,
        )
    }
}

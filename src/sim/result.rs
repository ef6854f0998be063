//! Aggregate statistics for one ordered matchup

use serde::Serialize;

use crate::combatant::Combatant;
use crate::core::error::{Result, SimError};

/// Rate statistics produced by one simulation run
///
/// Raw rates are standalone per-stage success frequencies; the unprefixed
/// rates compound the causal chain (hit that wounds that goes unsaved,
/// unwarded and unregenerated) and are scaled by the attacker's attack
/// count. Built once per ordered pair and never mutated.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CombatResult {
    pub hit_rate: f64,
    pub raw_wound_rate: f64,
    pub wound_rate: f64,
    pub raw_unsaved_rate: f64,
    pub unsaved_rate: f64,
    pub raw_unwarded_rate: f64,
    pub unwarded_rate: f64,
    pub raw_unregenerated_rate: f64,
    pub unregenerated_rate: f64,
    /// Expected kills per attack sequence
    pub kill_rate: f64,
}

impl CombatResult {
    /// Points-normalized exchange value
    ///
    /// Expected kills weighted by how expensive the victim is relative to
    /// the attacker; the reporting layer scales this by 100.
    pub fn efficiency(&self, attacker: &Combatant, target: &Combatant) -> Result<f64> {
        if attacker.points() <= 0.0 {
            return Err(SimError::Domain(format!(
                "attacker '{}' has non-positive points cost",
                attacker.name()
            )));
        }
        Ok(self.kill_rate * target.points() / attacker.points())
    }
}

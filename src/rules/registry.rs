//! Closed identifier registries for rules and strategies
//!
//! Configuration names map to constructors through exhaustive matches, so
//! an unknown identifier or out-of-range parameter is rejected when the
//! roster is loaded, never defaulted. Errors are plain reason strings; the
//! roster loader wraps them with the offending unit and field.

use toml::value::Table;

use crate::rules::{Rule, Stage};
use crate::strategy::{
    DefaultHitStrategy, DefaultSaveStrategy, DefaultWoundStrategy, RollStrategy,
};

/// Construct a rule from its identifier and optional parameter table
pub fn build_rule(name: &str, params: Option<&Table>) -> Result<Rule, String> {
    match name {
        "light_armour" => parameterless(name, Rule::LightArmour, params),
        "heavy_armour" => parameterless(name, Rule::HeavyArmour, params),
        "shield" => parameterless(name, Rule::Shield, params),
        "cleaving_blow" => parameterless(name, Rule::CleavingBlow, params),
        "hatred" => parameterless(name, Rule::Hatred, params),
        "armour_piercing" => {
            let value = int_param(name, params, "value")?;
            check_die_range(name, "value", value)?;
            Ok(Rule::ArmourPiercing(value))
        }
        "regeneration" => {
            let threshold = int_param(name, params, "threshold")?;
            check_die_range(name, "threshold", threshold)?;
            Ok(Rule::Regeneration(threshold))
        }
        "strength_bonus" => Ok(Rule::StrengthBonus(int_param(name, params, "delta")?)),
        "toughness_bonus" => Ok(Rule::ToughnessBonus(int_param(name, params, "delta")?)),
        _ => Err(format!("unknown rule '{name}'")),
    }
}

/// Construct a strategy for `stage` from its identifier
pub fn build_strategy(stage: Stage, name: &str) -> Result<Box<dyn RollStrategy>, String> {
    match (stage, name) {
        (Stage::Hit, "default") => Ok(Box::new(DefaultHitStrategy)),
        (Stage::Wound, "default") => Ok(Box::new(DefaultWoundStrategy)),
        (Stage::ArmourSave | Stage::WardSave | Stage::RegenerationSave, "default") => {
            Ok(Box::new(DefaultSaveStrategy))
        }
        _ => Err(format!("unknown strategy '{name}' for {stage:?}")),
    }
}

fn parameterless(name: &str, rule: Rule, params: Option<&Table>) -> Result<Rule, String> {
    match params {
        Some(table) if table.keys().any(|k| k != "rule") => {
            Err(format!("rule '{name}' takes no parameters"))
        }
        _ => Ok(rule),
    }
}

fn int_param(rule: &str, params: Option<&Table>, key: &str) -> Result<i32, String> {
    let table = params.ok_or_else(|| format!("rule '{rule}' requires parameter '{key}'"))?;

    if let Some(extra) = table.keys().find(|k| *k != "rule" && *k != key) {
        return Err(format!("rule '{rule}' has unknown parameter '{extra}'"));
    }

    let value = table
        .get(key)
        .ok_or_else(|| format!("rule '{rule}' requires parameter '{key}'"))?;
    let value = value
        .as_integer()
        .ok_or_else(|| format!("parameter '{key}' of rule '{rule}' must be an integer"))?;
    i32::try_from(value).map_err(|_| format!("parameter '{key}' of rule '{rule}' out of range"))
}

fn check_die_range(rule: &str, key: &str, value: i32) -> Result<(), String> {
    if (1..=6).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "parameter '{key}' of rule '{rule}' must be in 1..=6, got {value}"
        ))
    }
}

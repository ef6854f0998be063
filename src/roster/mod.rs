//! Load combatant rosters from TOML files
//!
//! A roster is a list of `[[units]]` tables. Statistic fields are plain
//! integers, `offensive`/`defensive` are ordered rule lists (bare
//! identifier strings or inline tables with parameters), and an optional
//! `[units.strategies]` table overrides the per-stage defaults. Every
//! identifier and parameter is resolved through the closed registries at
//! load time; unknown fields are errors, never silently stored.

use std::path::Path;

use crate::combatant::{Combatant, Profile};
use crate::core::error::{Result, SimError};
use crate::rules::registry;
use crate::rules::Stage;

const UNIT_FIELDS: [&str; 11] = [
    "name",
    "weapon_skill",
    "strength",
    "toughness",
    "initiative",
    "attacks",
    "wounds",
    "points",
    "offensive",
    "defensive",
    "strategies",
];

const STAGE_FIELDS: [(&str, Stage); 5] = [
    ("hit", Stage::Hit),
    ("wound", Stage::Wound),
    ("armour_save", Stage::ArmourSave),
    ("ward_save", Stage::WardSave),
    ("regeneration_save", Stage::RegenerationSave),
];

/// Load all units from a roster file on disk
pub fn load_roster(path: &Path) -> Result<Vec<Combatant>> {
    let content = std::fs::read_to_string(path)?;
    parse_roster(&content)
}

/// Parse a roster from TOML text
pub fn parse_roster(content: &str) -> Result<Vec<Combatant>> {
    let root: toml::Value = content
        .parse()
        .map_err(|e| SimError::Toml(format!("invalid roster TOML: {e}")))?;

    let units = root
        .get("units")
        .and_then(|v| v.as_array())
        .ok_or_else(|| SimError::Toml("roster has no [[units]] array".into()))?;

    units.iter().map(parse_unit).collect()
}

fn parse_unit(value: &toml::Value) -> Result<Combatant> {
    let table = value
        .as_table()
        .ok_or_else(|| SimError::Toml("unit entry is not a table".into()))?;

    let name = table
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| config_error("<unnamed>", "name", "unit is missing a name"))?
        .to_string();

    if let Some(unknown) = table.keys().find(|k| !UNIT_FIELDS.contains(&k.as_str())) {
        return Err(config_error(&name, unknown, "unknown field"));
    }

    let profile = Profile {
        weapon_skill: stat_field(&name, table, "weapon_skill")?,
        strength: stat_field(&name, table, "strength")?,
        toughness: stat_field(&name, table, "toughness")?,
        initiative: stat_field(&name, table, "initiative")?,
        attacks: stat_field(&name, table, "attacks")?,
        wounds: stat_field(&name, table, "wounds")?,
    };

    let points = table
        .get("points")
        .ok_or_else(|| config_error(&name, "points", "missing points cost"))?;
    let points = points
        .as_float()
        .or_else(|| points.as_integer().map(|v| v as f64))
        .ok_or_else(|| config_error(&name, "points", "points must be numeric"))?;

    let mut combatant = Combatant::new(&name, profile, points);

    for rule in parse_rule_list(&name, table, "offensive")? {
        combatant.add_offensive_rule(rule);
    }
    for rule in parse_rule_list(&name, table, "defensive")? {
        combatant.add_defensive_rule(rule);
    }

    if let Some(strategies) = table.get("strategies") {
        let strategies = strategies
            .as_table()
            .ok_or_else(|| config_error(&name, "strategies", "must be a table"))?;
        for key in strategies.keys() {
            if !STAGE_FIELDS.iter().any(|(field, _)| *field == key.as_str()) {
                return Err(config_error(&name, key, "unknown stage"));
            }
        }
        for (field, stage) in STAGE_FIELDS {
            if let Some(id) = strategies.get(field) {
                let id = id
                    .as_str()
                    .ok_or_else(|| config_error(&name, field, "strategy must be a string"))?;
                let strategy = registry::build_strategy(stage, id)
                    .map_err(|reason| config_error(&name, field, &reason))?;
                combatant.set_strategy(stage, strategy);
            }
        }
    }

    Ok(combatant)
}

fn parse_rule_list(
    unit: &str,
    table: &toml::value::Table,
    field: &str,
) -> Result<Vec<crate::rules::Rule>> {
    let Some(value) = table.get(field) else {
        return Ok(Vec::new());
    };
    let entries = value
        .as_array()
        .ok_or_else(|| config_error(unit, field, "must be an array of rules"))?;

    entries
        .iter()
        .map(|entry| match entry {
            toml::Value::String(id) => {
                registry::build_rule(id, None).map_err(|reason| config_error(unit, field, &reason))
            }
            toml::Value::Table(params) => {
                let id = params
                    .get("rule")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| config_error(unit, field, "rule entry needs a 'rule' key"))?;
                registry::build_rule(id, Some(params))
                    .map_err(|reason| config_error(unit, field, &reason))
            }
            _ => Err(config_error(
                unit,
                field,
                "rule entries are identifier strings or tables",
            )),
        })
        .collect()
}

fn stat_field(unit: &str, table: &toml::value::Table, field: &str) -> Result<Option<i32>> {
    match table.get(field) {
        None => Ok(None),
        Some(value) => {
            let value = value
                .as_integer()
                .ok_or_else(|| config_error(unit, field, "must be an integer"))?;
            i32::try_from(value)
                .map(Some)
                .map_err(|_| config_error(unit, field, "out of range"))
        }
    }
}

fn config_error(unit: &str, field: &str, reason: &str) -> SimError {
    SimError::Configuration {
        unit: unit.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

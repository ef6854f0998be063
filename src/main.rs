//! Mathhammer - Entry Point
//!
//! Loads a unit roster, simulates every ordered pairing (or one requested
//! pair), and prints a matchup report with per-stage rates, points
//! efficiency and a winner verdict.

use std::path::PathBuf;

use clap::Parser;

use mathhammer::combatant::Combatant;
use mathhammer::core::config::SimulationConfig;
use mathhammer::core::error::{Result, SimError};
use mathhammer::roster::load_roster;
use mathhammer::sim::{simulate, CombatResult};

/// Matchups closer than this efficiency ratio are called a tie
const TIE_THRESHOLD: f64 = 0.05;

#[derive(Parser)]
#[command(name = "mathhammer", about = "Simulate wargame combat matchups")]
struct Cli {
    /// Path to the unit roster
    #[arg(long, default_value = "roster.toml")]
    roster: PathBuf,

    /// Trials per stage per matchup
    #[arg(long, default_value_t = 10_000)]
    sample_size: u32,

    /// Fixed seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Only simulate this attacker (requires --target)
    #[arg(long, requires = "target")]
    attacker: Option<String>,

    /// Only simulate against this target (requires --attacker)
    #[arg(long, requires = "attacker")]
    target: Option<String>,

    /// Emit raw results as JSON instead of the report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mathhammer=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = SimulationConfig {
        sample_size: cli.sample_size,
        seed: cli.seed,
        ..SimulationConfig::default()
    };

    let units = load_roster(&cli.roster)?;
    tracing::info!(count = units.len(), roster = %cli.roster.display(), "roster loaded");

    let pairs = select_pairs(&units, cli.attacker.as_deref(), cli.target.as_deref())?;

    if cli.json {
        print_json(&pairs, &config)
    } else {
        print_report(&units, &pairs, &config)
    }
}

/// Every unordered pairing once (self-matchups included), or the one
/// requested pair
fn select_pairs<'a>(
    units: &'a [Combatant],
    attacker: Option<&str>,
    target: Option<&str>,
) -> Result<Vec<(&'a Combatant, &'a Combatant)>> {
    match (attacker, target) {
        (Some(attacker), Some(target)) => {
            let attacker = find_unit(units, attacker)?;
            let target = find_unit(units, target)?;
            Ok(vec![(attacker, target)])
        }
        _ => {
            let mut pairs = Vec::new();
            for (i, a) in units.iter().enumerate() {
                for b in &units[i..] {
                    pairs.push((a, b));
                }
            }
            Ok(pairs)
        }
    }
}

fn find_unit<'a>(units: &'a [Combatant], name: &str) -> Result<&'a Combatant> {
    units
        .iter()
        .find(|u| u.name() == name)
        .ok_or_else(|| SimError::Domain(format!("no unit named '{name}' in the roster")))
}

fn print_report(
    units: &[Combatant],
    pairs: &[(&Combatant, &Combatant)],
    config: &SimulationConfig,
) -> Result<()> {
    for unit in units {
        println!("{unit}");
    }

    for &(left, right) in pairs {
        let left_result = simulate(left, right, config)?;
        let left_efficiency = left_result.efficiency(left, right)? * 100.0;
        let right_result = simulate(right, left, config)?;
        let right_efficiency = right_result.efficiency(right, left)? * 100.0;

        println!("\n{:=<60}", "");
        println!("Combat Simulation: {} vs {}", left.name(), right.name());
        println!("{:-<60}", "");
        print_rates(left.name(), right.name(), &left_result);
        println!("{:-<60}", "");
        print_rates(right.name(), left.name(), &right_result);

        let verdict = verdict(left, left_efficiency, right, right_efficiency);
        println!(
            "Efficiency {}: {:.1}  vs  {}: {:.1}",
            left.name(),
            left_efficiency,
            right.name(),
            right_efficiency
        );
        println!("{:-<60}", "");
        println!("{verdict:^60}");
        println!("{:=<60}", "");
    }
    Ok(())
}

fn print_rates(attacker: &str, target: &str, result: &CombatResult) {
    println!("{attacker} attacking {target}:");
    println!("  Hit Rate          : {:.2}", result.hit_rate);
    println!(
        "  Wound Rate        : {:.2} (Raw: {:.2})",
        result.wound_rate, result.raw_wound_rate
    );
    println!(
        "  Unsaved Rate      : {:.2} (Raw: {:.2})",
        result.unsaved_rate, result.raw_unsaved_rate
    );
    println!(
        "  Unwarded Rate     : {:.2} (Raw: {:.2})",
        result.unwarded_rate, result.raw_unwarded_rate
    );
    println!(
        "  Unregenerated Rate: {:.2} (Raw: {:.2})",
        result.unregenerated_rate, result.raw_unregenerated_rate
    );
    println!("  Kill Rate         : {:.3}", result.kill_rate);
}

fn verdict(
    left: &Combatant,
    left_efficiency: f64,
    right: &Combatant,
    right_efficiency: f64,
) -> String {
    if right_efficiency == 0.0 {
        return if left_efficiency == 0.0 {
            "It's a TIE!".to_string()
        } else {
            format!("{} WINS!", left.name())
        };
    }
    let advantage = left_efficiency / right_efficiency;
    if (advantage - 1.0).abs() <= TIE_THRESHOLD {
        "It's a TIE!".to_string()
    } else if advantage > 1.0 {
        format!("{} WINS!", left.name())
    } else {
        format!("{} WINS!", right.name())
    }
}

fn print_json(pairs: &[(&Combatant, &Combatant)], config: &SimulationConfig) -> Result<()> {
    let mut matchups = Vec::new();
    for &(left, right) in pairs {
        let left_result = simulate(left, right, config)?;
        let right_result = simulate(right, left, config)?;
        matchups.push(serde_json::json!({
            "attacker": left.name(),
            "target": right.name(),
            "attacker_result": left_result,
            "target_result": right_result,
            "attacker_efficiency": left_result.efficiency(left, right)?,
            "target_efficiency": right_result.efficiency(right, left)?,
        }));
    }
    let report = serde_json::json!({ "matchups": matchups });
    println!(
        "{}",
        serde_json::to_string_pretty(&report)
            .map_err(|e| SimError::Domain(format!("JSON encoding failed: {e}")))?
    );
    Ok(())
}

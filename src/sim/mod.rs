//! Pipeline aggregation: many independent trials reduced to rate statistics
//!
//! Every trial runs all five stage evaluators independently; a trial's
//! wound roll happens whether or not its hit roll succeeded. Compound
//! rates are therefore products of independently measured raw rates, not
//! a measured joint distribution. That independence assumption is a
//! deliberate modelling approximation: the stages share no state, so the
//! product converges to the joint probability of the causal chain.
//!
//! Trials are split into fixed-size chunks, each with its own counter
//! and its own random stream derived from the master seed, so a run is
//! reproducible for a fixed seed whether the chunks execute serially or
//! across rayon workers. Counts are only merged after all chunks finish.

pub mod result;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::combatant::{Combatant, Statistic};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::engine::RollEvaluator;
use crate::rules::Stage;

pub use result::CombatResult;

/// Trials per random stream; also the parallel work unit
const TRIALS_PER_CHUNK: u32 = 1_024;

/// Success tallies for one worker's share of the trials
#[derive(Debug, Default, Clone, Copy)]
struct StageCounts {
    hits: u64,
    wounds: u64,
    unsaved: u64,
    unwarded: u64,
    unregenerated: u64,
}

impl StageCounts {
    fn merge(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            wounds: self.wounds + other.wounds,
            unsaved: self.unsaved + other.unsaved,
            unwarded: self.unwarded + other.unwarded,
            unregenerated: self.unregenerated + other.unregenerated,
        }
    }
}

/// Estimate the damage statistics for `attacker` striking `defender`
///
/// Runs `config.sample_size` independent trials of each stage and reduces
/// them to the ten rate statistics. With a fixed `config.seed` the result
/// is bit-reproducible; unseeded runs draw a master seed from OS entropy.
pub fn simulate(
    attacker: &Combatant,
    defender: &Combatant,
    config: &SimulationConfig,
) -> Result<CombatResult> {
    config.validate()?;

    // Resolve all five evaluators up front; a bad matchup fails here,
    // before any trial runs.
    let evaluators = [
        RollEvaluator::new(Stage::Hit, attacker, defender)?,
        RollEvaluator::new(Stage::Wound, attacker, defender)?,
        RollEvaluator::new(Stage::ArmourSave, attacker, defender)?,
        RollEvaluator::new(Stage::WardSave, attacker, defender)?,
        RollEvaluator::new(Stage::RegenerationSave, attacker, defender)?,
    ];

    let attacks = attacker.profile().get(Statistic::Attacks).ok_or_else(|| {
        SimError::Domain(format!(
            "attacker '{}' has no attacks statistic",
            attacker.name()
        ))
    })?;
    let wounds = defender.profile().get(Statistic::Wounds).ok_or_else(|| {
        SimError::Domain(format!(
            "target '{}' has no wounds statistic",
            defender.name()
        ))
    })?;
    if wounds == 0 {
        return Err(SimError::Domain(format!(
            "target '{}' has a zero wounds characteristic; kill rate is undefined",
            defender.name()
        )));
    }

    let master_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());

    // Fixed chunking keeps the stream assignment independent of worker
    // count; the last chunk absorbs the remainder.
    let chunk_sizes: Vec<(u64, u32)> = (0..config.sample_size)
        .step_by(TRIALS_PER_CHUNK as usize)
        .enumerate()
        .map(|(index, start)| {
            (
                index as u64,
                TRIALS_PER_CHUNK.min(config.sample_size - start),
            )
        })
        .collect();

    let counts = if config.sample_size >= config.parallel_threshold {
        chunk_sizes
            .par_iter()
            .map(|&(stream, trials)| run_chunk(&evaluators, master_seed, stream, trials))
            .try_reduce(StageCounts::default, |a, b| Ok(a.merge(b)))?
    } else {
        let mut total = StageCounts::default();
        for &(stream, trials) in &chunk_sizes {
            total = total.merge(run_chunk(&evaluators, master_seed, stream, trials)?);
        }
        total
    };

    let result = compound(counts, config.sample_size, attacks, wounds);
    tracing::debug!(
        attacker = attacker.name(),
        defender = defender.name(),
        sample_size = config.sample_size,
        kill_rate = result.kill_rate,
        "matchup simulated"
    );
    Ok(result)
}

/// Run one chunk of trials on its own random stream
fn run_chunk(
    evaluators: &[RollEvaluator<'_>; 5],
    master_seed: u64,
    stream: u64,
    trials: u32,
) -> Result<StageCounts> {
    let mut rng = ChaCha8Rng::seed_from_u64(master_seed);
    rng.set_stream(stream);

    let mut counts = StageCounts::default();
    for _ in 0..trials {
        // Stage order fixes the draw order within a trial; the stages
        // never gate each other.
        counts.hits += evaluators[0].resolve(&mut rng)? as u64;
        counts.wounds += evaluators[1].resolve(&mut rng)? as u64;
        counts.unsaved += evaluators[2].resolve(&mut rng)? as u64;
        counts.unwarded += evaluators[3].resolve(&mut rng)? as u64;
        counts.unregenerated += evaluators[4].resolve(&mut rng)? as u64;
    }
    Ok(counts)
}

/// Reduce tallies to the ten rate statistics
fn compound(counts: StageCounts, sample_size: u32, attacks: i32, wounds: i32) -> CombatResult {
    let n = f64::from(sample_size);
    let attacks = f64::from(attacks);

    let raw_hit = counts.hits as f64 / n;
    let raw_wound = counts.wounds as f64 / n;
    let raw_unsaved = counts.unsaved as f64 / n;
    let raw_unwarded = counts.unwarded as f64 / n;
    let raw_unregenerated = counts.unregenerated as f64 / n;

    let hit_rate = raw_hit * attacks;
    let wound_rate = raw_hit * raw_wound * attacks;
    let unsaved_rate = raw_hit * raw_wound * raw_unsaved * attacks;
    let unwarded_rate = raw_hit * raw_wound * raw_unsaved * raw_unwarded * attacks;
    let unregenerated_rate =
        raw_hit * raw_wound * raw_unsaved * raw_unwarded * raw_unregenerated * attacks;

    CombatResult {
        hit_rate,
        raw_wound_rate: raw_wound,
        wound_rate,
        raw_unsaved_rate: raw_unsaved,
        unsaved_rate,
        raw_unwarded_rate: raw_unwarded,
        unwarded_rate,
        raw_unregenerated_rate: raw_unregenerated,
        unregenerated_rate,
        kill_rate: unregenerated_rate / f64::from(wounds),
    }
}

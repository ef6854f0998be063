use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mathhammer::combatant::{Combatant, Profile};
use mathhammer::core::config::SimulationConfig;
use mathhammer::rules::Rule;
use mathhammer::sim::simulate;

fn champion() -> Combatant {
    let mut unit = Combatant::new(
        "Champion",
        Profile {
            weapon_skill: Some(5),
            strength: Some(4),
            toughness: Some(4),
            initiative: Some(5),
            attacks: Some(2),
            wounds: Some(1),
        },
        18.0,
    );
    unit.add_offensive_rule(Rule::Hatred);
    unit.add_defensive_rule(Rule::HeavyArmour);
    unit.add_defensive_rule(Rule::Shield);
    unit
}

fn troll() -> Combatant {
    let mut unit = Combatant::new(
        "Troll",
        Profile {
            weapon_skill: Some(3),
            strength: Some(5),
            toughness: Some(4),
            initiative: Some(1),
            attacks: Some(3),
            wounds: Some(3),
        },
        35.0,
    );
    unit.add_defensive_rule(Rule::Regeneration(5));
    unit
}

fn bench_simulate(c: &mut Criterion) {
    let attacker = champion();
    let defender = troll();

    let mut group = c.benchmark_group("simulate");
    for &sample_size in &[1_000u32, 10_000] {
        let config = SimulationConfig {
            sample_size,
            seed: Some(1),
            ..SimulationConfig::default()
        };
        group.bench_function(format!("{sample_size}_trials"), |b| {
            b.iter(|| simulate(black_box(&attacker), black_box(&defender), &config).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_simulate);
criterion_main!(benches);

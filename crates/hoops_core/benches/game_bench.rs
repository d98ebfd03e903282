use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hoops_core::engine::{GameConfig, GameConfigOverride};
use hoops_core::models::{PlayerData, Ratings, TeamData};
use hoops_core::simulate_single;

fn team_data(id: u32, rating: u8) -> TeamData {
    TeamData {
        id,
        name: format!("Team {id}"),
        abbrev: format!("T{id}"),
        pace: 100.0,
        primary_color: String::new(),
        secondary_color: String::new(),
        players: (0..8)
            .map(|i| PlayerData {
                id: id * 100 + i,
                name: format!("Player {i}"),
                age: 26,
                ratings: Ratings::uniform(rating),
                previously_injured: false,
            })
            .collect(),
    }
}

fn bench_full_game(c: &mut Criterion) {
    let config = GameConfig::default();

    c.bench_function("simulate_full_game", |b| {
        b.iter(|| {
            let result = simulate_single(
                team_data(0, 60),
                team_data(1, 58),
                config.clone(),
                false,
                black_box(1_700_000_000_000),
                None,
                0,
            )
            .unwrap();
            black_box(result.score())
        })
    });
}

fn bench_full_game_with_rotations(c: &mut Criterion) {
    let overrides = GameConfigOverride {
        allow_fouls: Some(true),
        allow_substitutions: Some(true),
        use_injuries: Some(true),
        base_injury_rate: Some(0.001),
        ..Default::default()
    };
    let config = GameConfig::from_override(&overrides).unwrap();

    c.bench_function("simulate_full_game_with_rotations", |b| {
        b.iter(|| {
            let result = simulate_single(
                team_data(0, 60),
                team_data(1, 58),
                config.clone(),
                false,
                black_box(1_700_000_000_000),
                None,
                0,
            )
            .unwrap();
            black_box(result.score())
        })
    });
}

criterion_group!(benches, bench_full_game, bench_full_game_with_rotations);
criterion_main!(benches);

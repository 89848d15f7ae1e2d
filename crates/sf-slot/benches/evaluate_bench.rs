//! Payline evaluation and grid generation benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sf_slot::{GameConfig, GameEngine, PayoutCalculator, Player, ReelGenerator};

fn bench_generate_grid(c: &mut Criterion) {
    let config = GameConfig::classic();
    let generator = ReelGenerator::new(&config.catalog).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    c.bench_function("generate_grid_5x3", |b| {
        b.iter(|| black_box(generator.generate_grid(5, 3, &mut rng)))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let config = GameConfig::classic();
    let generator = ReelGenerator::new(&config.catalog).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let grids: Vec<_> = (0..256).map(|_| generator.generate_grid(5, 3, &mut rng)).collect();
    let calc = PayoutCalculator::new(&config.catalog, &config.paytable);

    c.bench_function("evaluate_5_lines", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % grids.len();
            black_box(calc.evaluate(&grids[i], &config.paylines, 5, 1))
        })
    });
}

fn bench_spin(c: &mut Criterion) {
    let mut engine =
        GameEngine::seeded(GameConfig::classic(), Player::new("bench", u64::MAX / 2), 3).unwrap();

    c.bench_function("engine_spin", |b| b.iter(|| black_box(engine.spin(1, 5))));
}

criterion_group!(benches, bench_generate_grid, bench_evaluate, bench_spin);
criterion_main!(benches);

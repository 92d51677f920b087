use chess_mcts::{MctsConfig, NoEvaluator};
use chess_selfplay::{play_game, SelfPlayConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Benchmark a short self-play game with different MCTS simulation counts
fn bench_single_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_game");
    group.sample_size(10);

    for num_sims in [1, 10, 30].iter() {
        let config = SelfPlayConfig::default().with_max_moves(20).with_mcts(
            MctsConfig::default()
                .with_simulations(*num_sims)
                .with_dirichlet_noise(0.3, 0.25),
        );

        group.bench_with_input(BenchmarkId::from_parameter(num_sims), num_sims, |b, _| {
            b.iter(|| {
                let record =
                    play_game(black_box(&NoEvaluator), black_box(&config)).expect("Game failed");
                black_box(record)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_game);
criterion_main!(benches);

//! `xiangqi::ai` の性能計測（初期局面での最善手探索）。

use core::hint::black_box;
use criterion::BenchmarkId;
use criterion::Criterion;
use tabletop_core::xiangqi::{self, Side};

/// `cargo bench` の引数を取り込みつつ `Criterion` を生成する。
fn criterion_configured() -> Criterion {
    let base = Criterion::default();
    base.configure_from_args()
}

/// `find_best_move` を深さ別に計測する。
fn bench_find_best_move(criterion: &mut Criterion) {
    let board = xiangqi::Game::initial().board().clone();
    let mut group = criterion.benchmark_group("xiangqi/find_best_move");
    group.sample_size(10);
    for depth in [0_u8, 1, 2] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |bench, &depth| {
            bench.iter(|| black_box(xiangqi::ai::find_best_move(&board, Side::Red, depth)));
        });
    }
    group.finish();
}

/// 合法手生成を計測する。
fn bench_legal_moves(criterion: &mut Criterion) {
    let board = xiangqi::Game::initial().board().clone();
    criterion.bench_function("xiangqi/legal_moves_initial", |bench| {
        bench.iter(|| black_box(xiangqi::rules::legal_moves(&board, Side::Red)));
    });
}

/// ベンチマークのエントリーポイント。
fn main() {
    let mut criterion = criterion_configured();

    bench_find_best_move(&mut criterion);
    bench_legal_moves(&mut criterion);

    criterion.final_summary();
}

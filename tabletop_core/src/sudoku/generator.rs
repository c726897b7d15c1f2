use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::sudoku::grid::{CELLS, Grid, split_index};
use crate::sudoku::solver::solve;

/// 問題を作るときに空けるマス数の既定値。
pub const DEFAULT_REMOVALS: usize = 40;

/// 生成した問題と、その元になった解答。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Puzzle {
    /// 問題（空きマスあり）。
    pub puzzle: Grid,
    /// 解答（全マス埋まっている）。
    pub solution: Grid,
}

/// [`DEFAULT_REMOVALS`] マスを空けた問題を生成する。
#[inline]
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Puzzle {
    generate_with(rng, DEFAULT_REMOVALS)
}

/// 空の盤面を解いた解答から、異なる `removals` マスを一様に選んで空ける。
///
/// 解答は探索順で決まるため毎回同じで、問題の違いは空けるマスの選び方だけから生じる。
/// 解の一意性は保証しない。
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, removals: usize) -> Puzzle {
    let mut solution = Grid::empty();
    let solved = solve(&mut solution);

    let mut puzzle = solution;
    for cell in index::sample(rng, CELLS, removals.min(CELLS)) {
        let (row, col) = split_index(cell);
        puzzle.set(row, col, None);
    }

    debug!(solved, removals, givens = puzzle.filled(), "sudoku puzzle generated");
    Puzzle { puzzle, solution }
}

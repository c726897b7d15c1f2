use tracing::debug;

use crate::sudoku::grid::Grid;

/// バックトラックで盤面を解く。解けたら `true` を返し、`grid` は解答になる。
///
/// 空きマスを行優先で探し、1〜9 を昇順に試す。
/// 解けなかった場合、`grid` は呼び出し前の状態に戻る。
pub fn solve(grid: &mut Grid) -> bool {
    let mut steps = 0_u64;
    let solved = backtrack(grid, &mut steps);
    debug!(solved, steps, "sudoku solver finished");
    solved
}

/// 解答を新しい盤面として返す。解けなければ `None`。
#[inline]
#[must_use]
pub fn solved(grid: &Grid) -> Option<Grid> {
    let mut work = *grid;
    solve(&mut work).then_some(work)
}

/// 再帰本体。失敗時は試したマスを空に戻してから返る。
fn backtrack(grid: &mut Grid, steps: &mut u64) -> bool {
    let Some((row, col)) = grid.first_empty() else {
        return true;
    };

    for digit in 1..=9_u8 {
        if !grid.is_valid_placement(row, col, digit) {
            continue;
        }
        *steps = steps.saturating_add(1);
        grid.set(row, col, Some(digit));
        if backtrack(grid, steps) {
            return true;
        }
        grid.set(row, col, None);
    }
    false
}

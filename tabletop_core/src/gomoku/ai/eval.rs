use crate::gomoku::board::{Board, Point, Stone, all_points};
use crate::gomoku::rules::{DIRECTIONS, WIN_LENGTH};

use super::WIN_SCORE;

/// 同色だけの窓に含まれる石数ごとの点数（添字 = 石数）。
const PATTERN_SCORES: [i32; WIN_LENGTH + 1] = [0, 10, 100, 1_000, 10_000, WIN_SCORE];

/// 連続5交点の窓。
type Window = [Point; WIN_LENGTH];

/// `player` から見た盤面全体の評価値。
///
/// 4方向すべての窓について、片方の色だけを含む窓に石数に応じた点数を与え、
/// `player` の窓は加点、相手の窓は減点して合計する。
#[must_use]
pub fn evaluate_board(board: &Board, player: Stone) -> i32 {
    all_points()
        .flat_map(|start| {
            DIRECTIONS
                .iter()
                .filter_map(move |&direction| window_from(start, direction))
        })
        .fold(0_i32, |total, window| {
            total.saturating_add(score_window(board, &window, player))
        })
}

/// `point` を含む全ての窓の評価値の合計。
///
/// 1交点の変化による評価値の差分は、変化前後のこの値の差に等しい。
pub(super) fn score_through(board: &Board, point: Point, player: Stone) -> i32 {
    windows_through(point).fold(0_i32, |total, window| {
        total.saturating_add(score_window(board, &window, player))
    })
}

/// 1つの窓の評価値。色が混在する窓と空の窓は 0。
fn score_window(board: &Board, window: &Window, player: Stone) -> i32 {
    let mut own = 0_usize;
    let mut other = 0_usize;
    for &point in window {
        match board.get(point) {
            Some(stone) if stone == player => own = own.saturating_add(1),
            Some(_) => other = other.saturating_add(1),
            None => {}
        }
    }

    match (own, other) {
        (count, 0) => PATTERN_SCORES.get(count).copied().unwrap_or(0),
        (0, count) => PATTERN_SCORES.get(count).copied().unwrap_or(0).saturating_neg(),
        _ => 0,
    }
}

/// `start` から `direction` 方向に5交点並ぶ窓。盤からはみ出すなら `None`。
fn window_from(start: Point, (d_row, d_col): (isize, isize)) -> Option<Window> {
    let mut window = [start; WIN_LENGTH];
    let mut current = start;
    for cell in window.iter_mut().skip(1) {
        current = current.offset(d_row, d_col)?;
        *cell = current;
    }
    Some(window)
}

/// `point` を含む窓（最大 4方向 × 5）。
fn windows_through(point: Point) -> impl Iterator<Item = Window> {
    DIRECTIONS.into_iter().flat_map(move |(d_row, d_col)| {
        (0..WIN_LENGTH).filter_map(move |back| {
            let back = isize::try_from(back).ok()?.wrapping_neg();
            let start = point.offset(d_row.wrapping_mul(back), d_col.wrapping_mul(back))?;
            window_from(start, (d_row, d_col))
        })
    })
}

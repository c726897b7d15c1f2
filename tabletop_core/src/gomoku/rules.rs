use crate::gomoku::board::{Board, Point, Stone};

/// 勝ちに必要な連の長さ。
pub const WIN_LENGTH: usize = 5;

/// 連を数える4方向（横、縦、右下がり、右上がり）。
pub(crate) const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// `(row, col)` を通る `stone` の連が5以上あるかを返す。
///
/// 4方向それぞれ、その点から両側へ同色が続く数を数える。その点自体に `stone` が
/// 置かれている前提で、置かれていなければ `false`。
#[must_use]
pub fn check_win(board: &Board, row: usize, col: usize, stone: Stone) -> bool {
    let origin = Point::new(row, col);
    if board.get(origin) != Some(stone) {
        return false;
    }

    DIRECTIONS.iter().any(|&(d_row, d_col)| {
        let forward = run_length(board, origin, d_row, d_col, stone);
        let backward = run_length(board, origin, d_row.wrapping_neg(), d_col.wrapping_neg(), stone);
        forward.saturating_add(backward).saturating_add(1) >= WIN_LENGTH
    })
}

/// 盤上に5連を持つ色を返す（双方にある場合は黒を優先）。
#[must_use]
pub fn winner(board: &Board) -> Option<Stone> {
    board
        .stones()
        .find(|&(point, stone)| check_win(board, point.row, point.col, stone))
        .map(|(_, stone)| stone)
}

/// `origin` の隣から `(d_row, d_col)` 方向に `stone` が続く数（`origin` 自体は含まない）。
fn run_length(board: &Board, origin: Point, d_row: isize, d_col: isize, stone: Stone) -> usize {
    let mut count = 0_usize;
    let mut current = origin.offset(d_row, d_col);
    while let Some(point) = current {
        if board.get(point) != Some(stone) {
            break;
        }
        count = count.saturating_add(1);
        current = point.offset(d_row, d_col);
    }
    count
}

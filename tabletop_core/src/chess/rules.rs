//! 駒ごとの移動ルール。
//!
//! 自玉が王手に晒される手も合法として扱う（キャスリング・アンパッサン・成りは無し）。

use crate::chess::board::{Board, Color, Coord, Kind, Move, all_coords};

/// `from` → `to` の移動が合法かを返す。
///
/// 盤外、移動なし、空マスからの移動、自駒を取る移動は不正。
#[must_use]
pub fn is_legal(board: &Board, from: Coord, to: Coord) -> bool {
    if !from.is_inside() || !to.is_inside() {
        return false;
    }
    if from == to {
        return false;
    }

    let Some(piece) = board.get(from) else {
        return false;
    };
    if board.get(to).is_some_and(|target| target.color == piece.color) {
        return false;
    }

    match piece.kind {
        Kind::Pawn => is_pawn_move(board, piece.color, from, to),
        Kind::Rook => is_rook_move(board, from, to),
        Kind::Knight => is_knight_move(from, to),
        Kind::Bishop => is_bishop_move(board, from, to),
        Kind::Queen => is_rook_move(board, from, to) || is_bishop_move(board, from, to),
        Kind::King => is_king_move(from, to),
    }
}

/// 指定色の合法手を（移動元, 移動先）の行優先で列挙する。
#[must_use]
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    board
        .pieces_of(color)
        .flat_map(|(from, _piece)| {
            all_coords()
                .filter(move |&to| is_legal(board, from, to))
                .map(move |to| Move::new(from, to))
        })
        .collect()
}

/// ポーン：1マス前進、初期位置から2マス前進、斜め前の敵駒を取る。
fn is_pawn_move(board: &Board, color: Color, from: Coord, to: Coord) -> bool {
    let direction = color.forward();
    let d_row = to.row.wrapping_sub(from.row);
    let d_col = to.col.wrapping_sub(from.col);
    let target_empty = board.get(to).is_none();

    if d_col == 0 && target_empty && d_row == direction {
        return true;
    }

    if d_col == 0
        && target_empty
        && from.row == color.pawn_start_row()
        && d_row == direction.wrapping_mul(2)
        && board.get(from.offset(direction, 0)).is_none()
    {
        return true;
    }

    if d_col.unsigned_abs() == 1 && d_row == direction {
        return board
            .get(to)
            .is_some_and(|target| target.color != color);
    }

    false
}

/// ルーク：縦横の直線移動。途中のマスは空でなければならない。
fn is_rook_move(board: &Board, from: Coord, to: Coord) -> bool {
    if from.row != to.row && from.col != to.col {
        return false;
    }
    is_path_clear(board, from, to)
}

/// ビショップ：斜めの直線移動。途中のマスは空でなければならない。
fn is_bishop_move(board: &Board, from: Coord, to: Coord) -> bool {
    let d_row = to.row.wrapping_sub(from.row).unsigned_abs();
    let d_col = to.col.wrapping_sub(from.col).unsigned_abs();
    if d_row != d_col {
        return false;
    }
    is_path_clear(board, from, to)
}

/// ナイト：(2,1) / (1,2) の跳躍。経路は見ない。
fn is_knight_move(from: Coord, to: Coord) -> bool {
    let d_row = to.row.wrapping_sub(from.row).unsigned_abs();
    let d_col = to.col.wrapping_sub(from.col).unsigned_abs();
    (d_row == 2 && d_col == 1) || (d_row == 1 && d_col == 2)
}

/// キング：全方向に1マス。
fn is_king_move(from: Coord, to: Coord) -> bool {
    let d_row = to.row.wrapping_sub(from.row).unsigned_abs();
    let d_col = to.col.wrapping_sub(from.col).unsigned_abs();
    d_row <= 1 && d_col <= 1
}

/// `from` と `to` の間（両端を除く）が空かを返す。直線・斜め上にあること。
fn is_path_clear(board: &Board, from: Coord, to: Coord) -> bool {
    let step_row = to.row.wrapping_sub(from.row).signum();
    let step_col = to.col.wrapping_sub(from.col).signum();
    let mut current = from.offset(step_row, step_col);

    while current != to {
        if !current.is_inside() || board.get(current).is_some() {
            return false;
        }
        current = current.offset(step_row, step_col);
    }

    true
}

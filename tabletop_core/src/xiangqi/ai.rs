use core::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument};

use crate::ai::Ai;
use crate::xiangqi::board::{Board, Kind, Side};
use crate::xiangqi::rules::{Move, apply, candidate_moves, is_king_in_check};

/// ルート手の後に読む深さの既定値。
pub const DEFAULT_DEPTH: u8 = 2;

/// 駒の価値。
const fn piece_value(kind: Kind) -> i32 {
    match kind {
        Kind::Chariot => 90,
        Kind::Horse => 40,
        Kind::Elephant | Kind::Advisor => 20,
        Kind::General => 10_000,
        Kind::Cannon => 45,
        Kind::Soldier => 10,
    }
}

/// `player` から見た駒得（自駒の価値 − 相手駒の価値）。
#[must_use]
pub fn evaluate(board: &Board, player: Side) -> i32 {
    board.pieces().iter().fold(0_i32, |score, piece| {
        let value = piece_value(piece.kind);
        if piece.side == player {
            score.saturating_add(value)
        } else {
            score.saturating_sub(value)
        }
    })
}

/// 駒得評価のアルファベータ探索で手を選ぶAI。
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct Agent {
    /// ルート手の後に読む深さ。
    depth: u8,
}

impl Agent {
    /// 探索深さを指定して初期化する。
    #[inline]
    #[must_use]
    pub const fn new(depth: u8) -> Self {
        Self { depth }
    }
}

impl Default for Agent {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl Ai for Agent {
    type Board = Board;
    type Move = Move;
    type Player = Side;

    #[inline]
    fn select_move(&mut self, board: &Board, player: Side) -> Option<Move> {
        find_best_move(board, player, self.depth)
    }

    #[inline]
    fn select_move_until(&mut self, board: &Board, player: Side, stop: &AtomicBool) -> Option<Move> {
        find_best_move_until(board, player, self.depth, stop)
    }
}

/// 停止指示により探索を中断する。
#[derive(Clone, Copy, Debug)]
struct SearchAbort;

/// 最善手を返す。動かせる手が無ければ `None`。
///
/// ルートでは自陣の帥を王手に晒す手を除く。探索内部では除かない。
/// 同点なら生成順で先に見つかった手を採る。
#[inline]
#[must_use]
pub fn find_best_move(board: &Board, player: Side, depth: u8) -> Option<Move> {
    find_best_move_until(board, player, depth, &AtomicBool::new(false))
}

/// [`find_best_move`] と同じだが、`stop` が立ったら探索を打ち切って `None` を返す。
#[instrument(skip(board, stop), fields(pieces = board.pieces().len()))]
#[must_use]
pub fn find_best_move_until(board: &Board, player: Side, depth: u8, stop: &AtomicBool) -> Option<Move> {
    let mut best: Option<(i32, Move)> = None;
    let mut alpha = i32::MIN;
    let mut considered = 0_usize;

    for (piece, to) in candidate_moves(board, player) {
        let next = apply(board, piece.id, to);
        if is_king_in_check(player, &next) {
            continue;
        }
        considered = considered.saturating_add(1);

        let Ok(score) = minimax(&next, stop, depth, false, alpha, i32::MAX, player) else {
            debug!(considered, "xiangqi search aborted");
            return None;
        };
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, Move::new(piece.point(), to)));
            alpha = alpha.max(score);
        }
    }

    debug!(considered, best = ?best, "xiangqi search finished");
    best.map(|(_, mv)| mv)
}

/// 駒得評価のミニマックス（アルファベータ枝刈り付き）。
///
/// 終局判定はせず、手が無い局面は最悪値を返す。
fn minimax(
    board: &Board,
    stop: &AtomicBool,
    depth: u8,
    maximizing: bool,
    mut alpha: i32,
    mut beta: i32,
    player: Side,
) -> Result<i32, SearchAbort> {
    if stop.load(Ordering::Relaxed) {
        return Err(SearchAbort);
    }
    if depth == 0 {
        return Ok(evaluate(board, player));
    }

    let next_depth = depth.saturating_sub(1);
    if maximizing {
        let mut best = i32::MIN;
        for (piece, to) in candidate_moves(board, player) {
            let score = minimax(&apply(board, piece.id, to), stop, next_depth, false, alpha, beta, player)?;
            best = best.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                return Ok(best);
            }
        }
        Ok(best)
    } else {
        let mut best = i32::MAX;
        for (piece, to) in candidate_moves(board, player.opponent()) {
            let score = minimax(&apply(board, piece.id, to), stop, next_depth, true, alpha, beta, player)?;
            best = best.min(score);
            beta = beta.min(score);
            if beta <= alpha {
                return Ok(best);
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::AtomicBool;

    use super::{Agent, evaluate, find_best_move, find_best_move_until};
    use crate::ai::Ai as _;
    use crate::xiangqi::board::{Board, Kind, Piece, Point, Side};
    use crate::xiangqi::rules::{Move, is_valid_move};

    #[test]
    fn initial_material_is_balanced() {
        assert_eq!(evaluate(&Board::initial(), Side::Red), 0);
        assert_eq!(evaluate(&Board::initial(), Side::Black), 0);
    }

    #[test]
    fn takes_a_free_chariot() {
        let board = Board::from_pieces(vec![
            Piece::new(1, Kind::General, Side::Red, 3, 0),
            Piece::new(2, Kind::Chariot, Side::Red, 0, 4),
            Piece::new(3, Kind::General, Side::Black, 5, 9),
            Piece::new(4, Kind::Chariot, Side::Black, 6, 4),
        ]);
        let chosen = find_best_move(&board, Side::Red, 2);
        assert_eq!(chosen, Some(Move::new(Point::new(0, 4), Point::new(6, 4))));
    }

    #[test]
    fn chosen_move_is_valid_from_the_start() {
        let board = Board::initial();
        let mut agent = Agent::new(1);
        let chosen = agent.select_move(&board, Side::Black);
        assert!(chosen.is_some());
        if let Some(mv) = chosen {
            let piece = board.piece_at(mv.from.x, mv.from.y);
            assert_eq!(piece.map(|p| p.side), Some(Side::Black));
            assert!(piece.is_some_and(|p| is_valid_move(p, mv.to.x, mv.to.y, &board)));
        }
    }

    #[test]
    fn no_move_when_checkmated() {
        let board = Board::from_pieces(vec![
            Piece::new(1, Kind::General, Side::Red, 4, 0),
            Piece::new(2, Kind::Chariot, Side::Red, 0, 9),
            Piece::new(3, Kind::General, Side::Black, 4, 9),
        ]);
        assert_eq!(find_best_move(&board, Side::Black, 2), None);
    }

    #[test]
    fn raised_stop_flag_aborts_the_search() {
        let stopped = AtomicBool::new(true);
        assert_eq!(find_best_move_until(&Board::initial(), Side::Red, 2, &stopped), None);
        assert_eq!(Agent::new(1).select_move_until(&Board::initial(), Side::Red, &stopped), None);
        assert!(find_best_move_until(&Board::initial(), Side::Red, 0, &AtomicBool::new(false)).is_some());
    }
}

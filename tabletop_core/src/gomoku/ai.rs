use core::sync::atomic::AtomicBool;

use tracing::{debug, instrument};

use crate::ai::Ai;
use crate::gomoku::board::{Board, Point, Stone};

/// 窓ごとの評価関数。
pub mod eval;
mod search;

/// ルート手の後に読む深さの既定値。
pub const DEFAULT_DEPTH: u8 = 3;

/// 5連を含む窓の点数。評価値の絶対値がこれ以上なら勝敗が決している。
pub const WIN_SCORE: i32 = 1_000_000;

/// 候補手を生成する際、既存の石からの距離（チェビシェフ距離）の上限。
const SEARCH_RADIUS: usize = 2;

/// 窓パターン評価のアルファベータ探索で手を選ぶAI。
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct Agent {
    /// ルート手の後に読む深さ。
    depth: u8,
}

impl Agent {
    /// 探索深さを返す。
    #[inline]
    #[must_use]
    pub const fn depth(self) -> u8 {
        self.depth
    }

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
    type Move = Point;
    type Player = Stone;

    #[inline]
    fn select_move(&mut self, board: &Board, player: Stone) -> Option<Point> {
        find_best_move(board, player, self.depth)
    }

    #[inline]
    fn select_move_until(&mut self, board: &Board, player: Stone, stop: &AtomicBool) -> Option<Point> {
        find_best_move_until(board, player, self.depth, stop)
    }
}

/// 候補手：既存の石から半径2以内の空点を行優先で返す。盤が空なら天元のみ。
#[must_use]
pub fn candidate_moves(board: &Board) -> Vec<Point> {
    search::Scratch::new(board, Stone::Black).candidates()
}

/// 最善手を返す。空点が無ければ `None`。
#[inline]
#[must_use]
pub fn find_best_move(board: &Board, player: Stone, depth: u8) -> Option<Point> {
    find_best_move_until(board, player, depth, &AtomicBool::new(false))
}

/// [`find_best_move`] と同じだが、`stop` が立ったら探索を打ち切って `None` を返す。
#[instrument(skip(board, stop), fields(stones = board.stones().count()))]
#[must_use]
pub fn find_best_move_until(board: &Board, player: Stone, depth: u8, stop: &AtomicBool) -> Option<Point> {
    let Ok(result) = search::search_root(board, player, depth, stop) else {
        debug!("gomoku search aborted");
        return None;
    };
    debug!(?result, "gomoku search finished");
    result.map(|(point, _)| point)
}

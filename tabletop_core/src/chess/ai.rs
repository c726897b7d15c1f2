use rand::rngs::SmallRng;
use rand::seq::SliceRandom as _;
use tracing::debug;

use crate::ai::{Ai, seeded_rng};
use crate::chess::board::{Board, Color, Move};
use crate::chess::rules::legal_moves;

/// 合法手から一様ランダムに1手を選択するAI。
#[derive(Debug)]
#[non_exhaustive]
pub struct Agent {
    /// 乱数生成器。
    rng: SmallRng,
}

impl Agent {
    /// `seed` を用いて初期化する。
    #[inline]
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seeded_rng(seed),
        }
    }
}

impl Ai for Agent {
    type Board = Board;
    type Move = Move;
    type Player = Color;

    #[inline]
    fn select_move(&mut self, board: &Board, player: Color) -> Option<Move> {
        let moves = legal_moves(board, player);
        let choice = moves.choose(&mut self.rng).copied();
        debug!(candidates = moves.len(), ?choice, "chess move selected");
        choice
    }
}

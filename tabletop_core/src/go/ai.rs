use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom as _;
use tracing::debug;

use crate::ai::{Ai, seeded_rng};
use crate::go::board::{Board, Point, SIZE, Stone, all_points};
use crate::go::game::Move;
use crate::go::group::find_group;
use crate::go::rules::place;

/// 石1個を取る手の加点。
const CAPTURE_WEIGHT: i64 = 100;

/// 盤の中心（天元）の座標。
const CENTER: usize = SIZE.div_euclid(2);

/// 空点ごとに1手先だけを評価する貪欲なAI。打てる点が無ければパスする。
#[derive(Debug)]
#[non_exhaustive]
pub struct Agent {
    /// 候補が並んだときの予備選択に使う乱数生成器。
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
    type Player = Stone;

    #[inline]
    fn select_move(&mut self, board: &Board, player: Stone) -> Option<Move> {
        Some(select_point(board, player, &mut self.rng).map_or(Move::Pass, Move::Place))
    }
}

/// 着手点を選ぶ。合法な着手点が無ければ `None`。
///
/// 評価値 = 取った石 × 100 ＋ 自分の連の呼吸点 − 天元からのマンハッタン距離。
/// 行優先で最初に見つかった最大値を採る。
pub fn select_point<R: Rng + ?Sized>(board: &Board, player: Stone, rng: &mut R) -> Option<Point> {
    let mut candidates: Vec<Point> = Vec::new();
    let mut best: Option<(i64, Point)> = None;

    for point in all_points() {
        let Some(placement) = place(board, point, player) else {
            continue;
        };
        candidates.push(point);

        let score = evaluate(&placement.board, point, player, placement.captured);
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, point));
        }
    }

    let chosen = best
        .map(|(_, point)| point)
        .or_else(|| candidates.choose(rng).copied());
    debug!(candidates = candidates.len(), ?chosen, "go move selected");
    chosen
}

/// 着手後の盤面に対する評価値。
fn evaluate(after: &Board, point: Point, player: Stone, captured: u32) -> i64 {
    let liberties = find_group(point.x, point.y, after, player).liberties.len();
    let distance = point.x.abs_diff(CENTER).saturating_add(point.y.abs_diff(CENTER));

    i64::from(captured)
        .saturating_mul(CAPTURE_WEIGHT)
        .saturating_add(i64::try_from(liberties).unwrap_or(i64::MAX))
        .saturating_sub(i64::try_from(distance).unwrap_or(i64::MAX))
}

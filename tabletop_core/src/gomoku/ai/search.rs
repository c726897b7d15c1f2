use core::sync::atomic::{AtomicBool, Ordering};

use crate::gomoku::board::{Board, Point, SIZE, Stone, all_points};

use super::eval::{evaluate_board, score_through};
use super::{SEARCH_RADIUS, WIN_SCORE};

/// 探索の窓の上限（`-INF` と対で使う）。
const INF: i32 = i32::MAX;

/// 探索用の作業盤面。
///
/// 石を置く・取り除くたびに評価値と近傍の石数を差分更新する。
/// `score` は常に `evaluate_board(&board, player)` と一致する。
#[derive(Clone, Debug)]
pub(super) struct Scratch {
    /// 作業中の盤面。
    board: Board,
    /// 各交点から半径 `SEARCH_RADIUS`（チェビシェフ距離）以内にある石の数。
    near: [[u16; SIZE]; SIZE],
    /// 評価の基準となる側（AI の色）。
    player: Stone,
    /// `player` から見た現在の評価値。
    score: i32,
    /// 盤上の石の数。
    stones: usize,
}

impl Scratch {
    /// 盤面を複製して作業盤面を作る。
    pub(super) fn new(board: &Board, player: Stone) -> Self {
        let mut scratch = Self {
            board: board.clone(),
            near: [[0; SIZE]; SIZE],
            player,
            score: evaluate_board(board, player),
            stones: 0,
        };
        for (point, _) in board.stones() {
            scratch.add_near(point, true);
            scratch.stones = scratch.stones.saturating_add(1);
        }
        scratch
    }

    /// 作業中の盤面を返す。
    #[cfg(test)]
    pub(super) const fn board(&self) -> &Board {
        &self.board
    }

    /// 候補手：既存の石から半径2以内の空点（行優先）。石が無ければ天元のみ。
    pub(super) fn candidates(&self) -> Vec<Point> {
        if self.stones == 0 {
            return vec![Point::CENTER];
        }
        all_points()
            .filter(|&point| self.board.get(point).is_none() && self.near_count(point) > 0)
            .collect()
    }

    /// 空点に石を置く。
    pub(super) fn place(&mut self, point: Point, stone: Stone) {
        self.replace(point, Some(stone));
        self.add_near(point, true);
        self.stones = self.stones.saturating_add(1);
    }

    /// 置いた石を取り除く。
    pub(super) fn remove(&mut self, point: Point) {
        self.replace(point, None);
        self.add_near(point, false);
        self.stones = self.stones.saturating_sub(1);
    }

    /// 現在の評価値を返す。
    pub(super) const fn score(&self) -> i32 {
        self.score
    }

    /// `point` の周囲（自身を含む 5×5）の近傍石数を増減する。
    fn add_near(&mut self, point: Point, increment: bool) {
        let rows = point.row.saturating_sub(SEARCH_RADIUS)..=point.row.saturating_add(SEARCH_RADIUS);
        for row in rows {
            let Some(line) = self.near.get_mut(row) else {
                continue;
            };
            let cols = point.col.saturating_sub(SEARCH_RADIUS)..=point.col.saturating_add(SEARCH_RADIUS);
            for col in cols {
                if let Some(count) = line.get_mut(col) {
                    *count = if increment {
                        count.saturating_add(1)
                    } else {
                        count.saturating_sub(1)
                    };
                }
            }
        }
    }

    /// `point` の近傍石数。
    fn near_count(&self, point: Point) -> u16 {
        self.near
            .get(point.row)
            .and_then(|line| line.get(point.col))
            .copied()
            .unwrap_or(0)
    }

    /// 1交点を書き換え、評価値を差分更新する。
    fn replace(&mut self, point: Point, stone: Option<Stone>) {
        let before = score_through(&self.board, point, self.player);
        self.board.set(point, stone);
        let after = score_through(&self.board, point, self.player);
        self.score = self.score.saturating_add(after.saturating_sub(before));
    }
}

/// 停止指示により探索を中断する。
#[derive(Clone, Copy, Debug)]
pub(super) struct SearchAbort;

/// ルート探索。候補が無ければ `None`。
///
/// ルートで AI の石を置き、残り `depth` 手を相手番から読む。
/// 評価値が厳密に上回ったときだけ更新するので、同点は行優先で先の候補が残る。
///
/// # Errors
///
/// `stop` が立った場合は `SearchAbort` を返す。
pub(super) fn search_root(
    board: &Board,
    player: Stone,
    depth: u8,
    stop: &AtomicBool,
) -> Result<Option<(Point, i32)>, SearchAbort> {
    let mut scratch = Scratch::new(board, player);
    let mut best: Option<(Point, i32)> = None;
    let mut alpha = INF.wrapping_neg();

    for point in scratch.candidates() {
        scratch.place(point, player);
        let score = minimax(&mut scratch, stop, depth, alpha, INF, false)?;
        scratch.remove(point);

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((point, score));
            alpha = alpha.max(score);
        }
    }

    Ok(best)
}

/// ミニマックス（アルファベータ枝刈り付き）。
///
/// 深さ0、またはどちらかに5連がある（`|score| >= WIN_SCORE`）局面はその評価値を返す。
/// 候補手が無い（盤が埋まった）局面も評価値を返す。
/// 中断時は作業盤面を元に戻さないので、呼び出し側はその盤面を捨てること。
pub(super) fn minimax(
    scratch: &mut Scratch,
    stop: &AtomicBool,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
) -> Result<i32, SearchAbort> {
    if stop.load(Ordering::Relaxed) {
        return Err(SearchAbort);
    }
    let score = scratch.score();
    if depth == 0 || score.saturating_abs() >= WIN_SCORE {
        return Ok(score);
    }

    let moves = scratch.candidates();
    if moves.is_empty() {
        return Ok(score);
    }

    let next_depth = depth.saturating_sub(1);
    if maximizing {
        let stone = scratch.player;
        let mut best = INF.wrapping_neg();
        for point in moves {
            scratch.place(point, stone);
            let value = minimax(scratch, stop, next_depth, alpha, beta, false)?;
            scratch.remove(point);
            best = best.max(value);
            alpha = alpha.max(value);
            if beta <= alpha {
                break;
            }
        }
        Ok(best)
    } else {
        let stone = scratch.player.opponent();
        let mut best = INF;
        for point in moves {
            scratch.place(point, stone);
            let value = minimax(scratch, stop, next_depth, alpha, beta, true)?;
            scratch.remove(point);
            best = best.min(value);
            beta = beta.min(value);
            if beta <= alpha {
                break;
            }
        }
        Ok(best)
    }
}

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::gomoku::board::{Board, Point, Stone};
use crate::gomoku::rules::{check_win, winner};
use crate::history::History;
use crate::persistence::{self, InvalidSnapshot};
use crate::session::TurnBased;

/// 局面スナップショット。保存形式でもある。
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 盤面。
    pub board: Board,
    /// 次に打つ側。
    pub current_player: Stone,
}

impl Snapshot {
    /// 初期局面（空の盤、黒番）。
    #[inline]
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            board: Board::empty(),
            current_player: Stone::Black,
        }
    }
}

impl persistence::Snapshot for Snapshot {
    fn validate(&self) -> Result<(), InvalidSnapshot> {
        // 盤の大きさは配列の型で保証される。
        Ok(())
    }
}

/// ゲームの状態。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Status {
    /// 盤が埋まり、どちらも5連を作れなかった。
    Draw,
    /// 進行中。
    InProgress,
    /// 5連を作った側の勝ち。
    Won(Stone),
}

/// 手の適用に失敗した理由。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PlayError {
    /// すでに決着している。
    GameOver,
    /// 石のある点、または盤外。
    Occupied,
}

/// 1ゲームの進行を管理する構造体。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    /// 局面の履歴。
    history: History<Snapshot>,
}

impl Game {
    /// 現在の盤面を返す。
    #[inline]
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.history.current().board
    }

    /// 履歴を返す。
    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    /// 初期局面からゲームを開始する。
    #[inline]
    #[must_use]
    pub fn initial() -> Self {
        Self {
            history: History::new(Snapshot::initial()),
        }
    }

    /// 決着しているかどうかを返す。
    #[inline]
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.status() != Status::InProgress
    }

    /// 現手番の石を `point` に置く。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `PlayError::GameOver`: すでに決着している場合
    /// - `PlayError::Occupied`: 指定点に石がある、または盤外の場合
    ///
    pub fn play(&mut self, point: Point) -> Result<Status, PlayError> {
        if self.is_game_over() {
            return Err(PlayError::GameOver);
        }

        let current = self.history.current();
        if !current.board.is_empty_at(point) {
            return Err(PlayError::Occupied);
        }

        let stone = current.current_player;
        let board = current.board.clone().with(point, stone);
        let status = if check_win(&board, point.row, point.col, stone) {
            Status::Won(stone)
        } else if board.is_full() {
            Status::Draw
        } else {
            Status::InProgress
        };

        self.history.push(Snapshot {
            board,
            current_player: stone.opponent(),
        });
        if status != Status::InProgress {
            info!(?status, moves = self.history.len().saturating_sub(1), "gomoku game finished");
        }
        Ok(status)
    }

    /// 初期局面に戻す。
    #[inline]
    pub fn reset(&mut self) {
        self.history.replace(Snapshot::initial());
    }

    /// 読み込んだ局面で履歴を置き換える。
    #[inline]
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.history.replace(snapshot);
    }

    /// 現手番を返す。
    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Stone {
        self.history.current().current_player
    }

    /// 現在の局面を返す。
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        self.history.current()
    }

    /// 現在のゲーム状態を盤面から求める。
    #[must_use]
    pub fn status(&self) -> Status {
        let board = self.board();
        if let Some(stone) = winner(board) {
            Status::Won(stone)
        } else if board.is_full() {
            Status::Draw
        } else {
            Status::InProgress
        }
    }

    /// 最大 `steps` 手戻す。実際に戻した手数を返す。
    #[inline]
    pub fn undo(&mut self, steps: usize) -> usize {
        self.history.undo(steps)
    }
}

impl Default for Game {
    #[inline]
    fn default() -> Self {
        Self::initial()
    }
}

impl TurnBased for Game {
    type Board = Board;
    type Error = PlayError;
    type Move = Point;
    type Player = Stone;
    type Snapshot = Snapshot;

    #[inline]
    fn ai_board(&self) -> Board {
        self.board().clone()
    }

    #[inline]
    fn is_finished(&self) -> bool {
        self.is_game_over()
    }

    #[inline]
    fn play_move(&mut self, mv: Point) -> Result<(), PlayError> {
        self.play(mv).map(|_status| ())
    }

    #[inline]
    fn reset(&mut self) {
        Self::reset(self);
    }

    #[inline]
    fn restore(&mut self, snapshot: Snapshot) {
        Self::restore(self, snapshot);
    }

    #[inline]
    fn side_to_move(&self) -> Stone {
        Self::side_to_move(self)
    }

    #[inline]
    fn snapshot(&self) -> &Snapshot {
        Self::snapshot(self)
    }

    #[inline]
    fn undo(&mut self, steps: usize) -> usize {
        Self::undo(self, steps)
    }
}

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::go::board::{Board, Point, Stone};
use crate::go::group::calculate_score;
use crate::go::rules::place;
use crate::history::History;
use crate::persistence::{self, InvalidSnapshot};
use crate::session::TurnBased;

/// コミ（白に加える点数）。
pub const KOMI: f64 = 6.5;

/// 1手（着手またはパス）。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Move {
    /// パス。
    Pass,
    /// 指定交点に打つ。
    Place(Point),
}

/// 局面スナップショット。保存形式でもある。
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 盤面。
    pub board: Board,
    /// 黒が取り上げた白石の数。
    pub captured_by_black: u32,
    /// 白が取り上げた黒石の数。
    pub captured_by_white: u32,
    /// 次に打つ側。
    pub current_player: Stone,
    /// 直前の手がパスだったか。
    pub last_move_was_pass: bool,
}

impl Snapshot {
    /// 初期局面（空の盤、黒番）。
    #[inline]
    #[must_use]
    pub fn initial() -> Self {
        Self {
            board: Board::empty(),
            captured_by_black: 0,
            captured_by_white: 0,
            current_player: Stone::Black,
            last_move_was_pass: false,
        }
    }
}

impl persistence::Snapshot for Snapshot {
    fn validate(&self) -> Result<(), InvalidSnapshot> {
        if self.board.has_standard_size() {
            Ok(())
        } else {
            Err(InvalidSnapshot::new("go board must be 19x19"))
        }
    }
}

/// 終局時の点数（陣地＋アゲハマ、白はコミ込み）。
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FinalScore {
    /// 黒の点数。
    pub black: f64,
    /// 白の点数。
    pub white: f64,
}

impl FinalScore {
    /// 勝者を返す（コミが半目なので引き分けは無い）。
    #[inline]
    #[must_use]
    pub fn winner(self) -> Stone {
        if self.black > self.white {
            Stone::Black
        } else {
            Stone::White
        }
    }
}

/// ゲームの状態。
#[derive(Copy, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Status {
    /// 進行中。
    InProgress,
    /// 終局（双方が続けてパス）。
    Over(FinalScore),
}

/// 手の適用に失敗した理由。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PlayError {
    /// すでに終局している。
    GameOver,
    /// 石のある点、または盤外。
    Occupied,
    /// 自殺手。
    Suicide,
}

/// 1ゲームの進行を管理する構造体。
#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    /// 終局時の点数。進行中は `None`。
    final_score: Option<FinalScore>,
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

    /// 現在の盤面と取った石の数から最終点数を計算する。
    #[must_use]
    pub fn score(&self) -> FinalScore {
        let current = self.history.current();
        let territory = calculate_score(&current.board);
        FinalScore {
            black: f64::from(territory.black) + f64::from(current.captured_by_black),
            white: f64::from(territory.white) + f64::from(current.captured_by_white) + KOMI,
        }
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
            final_score: None,
            history: History::new(Snapshot::initial()),
        }
    }

    /// 終局しているかどうかを返す。
    #[inline]
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.final_score.is_some()
    }

    /// パスする。直前もパスなら終局し、点数を確定する。
    ///
    /// # Errors
    ///
    /// `PlayError::GameOver`: すでにゲームが終局している場合
    ///
    pub fn pass(&mut self) -> Result<Status, PlayError> {
        if self.is_game_over() {
            return Err(PlayError::GameOver);
        }

        let current = self.history.current();
        if current.last_move_was_pass {
            let score = self.score();
            self.final_score = Some(score);
            info!(black = score.black, white = score.white, "go game finished");
            return Ok(Status::Over(score));
        }

        let next = Snapshot {
            current_player: current.current_player.opponent(),
            last_move_was_pass: true,
            ..current.clone()
        };
        self.history.push(next);
        Ok(Status::InProgress)
    }

    /// 1手（着手またはパス）を適用する。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `PlayError::GameOver`: すでにゲームが終局している場合
    /// - `PlayError::Occupied`: 指定点に石がある、または盤外の場合
    /// - `PlayError::Suicide`: 自殺手の場合
    ///
    pub fn play(&mut self, mv: Move) -> Result<Status, PlayError> {
        match mv {
            Move::Pass => self.pass(),
            Move::Place(point) => self.play_at(point),
        }
    }

    /// 指定交点に打つ。
    ///
    /// # Errors
    ///
    /// [`Game::play`] と同じ。
    ///
    pub fn play_at(&mut self, point: Point) -> Result<Status, PlayError> {
        if self.is_game_over() {
            return Err(PlayError::GameOver);
        }

        let current = self.history.current();
        if !current.board.is_empty_at(point) {
            return Err(PlayError::Occupied);
        }
        let stone = current.current_player;
        let Some(placement) = place(&current.board, point, stone) else {
            return Err(PlayError::Suicide);
        };

        let (captured_by_black, captured_by_white) = match stone {
            Stone::Black => (
                current.captured_by_black.saturating_add(placement.captured),
                current.captured_by_white,
            ),
            Stone::White => (
                current.captured_by_black,
                current.captured_by_white.saturating_add(placement.captured),
            ),
        };

        self.history.push(Snapshot {
            board: placement.board,
            captured_by_black,
            captured_by_white,
            current_player: stone.opponent(),
            last_move_was_pass: false,
        });
        Ok(Status::InProgress)
    }

    /// 初期局面に戻す。
    #[inline]
    pub fn reset(&mut self) {
        self.final_score = None;
        self.history.replace(Snapshot::initial());
    }

    /// 読み込んだ局面で履歴を置き換える。
    #[inline]
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.final_score = None;
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

    /// 現在のゲーム状態を返す。
    #[inline]
    #[must_use]
    pub fn status(&self) -> Status {
        self.final_score.map_or(Status::InProgress, Status::Over)
    }

    /// 最大 `steps` 手戻す。実際に戻した手数を返す。
    ///
    /// 終局後は戻せない（0 を返す）。
    #[inline]
    pub fn undo(&mut self, steps: usize) -> usize {
        if self.is_game_over() {
            return 0;
        }
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
    type Move = Move;
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
    fn play_move(&mut self, mv: Move) -> Result<(), PlayError> {
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

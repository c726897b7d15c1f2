use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chess::board::{Board, Color, Kind, Move};
use crate::chess::rules::{is_legal, legal_moves};
use crate::history::History;
use crate::persistence::{self, InvalidSnapshot};
use crate::session::TurnBased;

/// 局面スナップショット（盤面＋手番）。保存形式でもある。
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 盤面。
    pub board: Board,
    /// 次に指す側。
    pub current_player: Color,
}

impl Snapshot {
    /// 初期局面（白番）。
    #[inline]
    #[must_use]
    pub fn initial() -> Self {
        Self {
            board: Board::initial(),
            current_player: Color::White,
        }
    }
}

impl persistence::Snapshot for Snapshot {
    fn validate(&self) -> Result<(), InvalidSnapshot> {
        for color in [Color::White, Color::Black] {
            let kings = self
                .board
                .pieces_of(color)
                .filter(|&(_, piece)| piece.kind == Kind::King)
                .count();
            if kings != 1 {
                return Err(InvalidSnapshot::new(format!(
                    "{color:?} has {kings} kings"
                )));
            }
            if self.board.pieces_of(color).count() > 16 {
                return Err(InvalidSnapshot::new(format!(
                    "{color:?} has more than 16 pieces"
                )));
            }
        }
        Ok(())
    }
}

/// ゲームの状態。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Status {
    /// 進行中。
    InProgress,
    /// キングが取られた（自殺手が許されるため起こりうる）。
    KingCaptured {
        /// 勝った側。
        winner: Color,
    },
    /// 手番側に指せる手が無い。
    NoMoves {
        /// 手詰まりになった側。
        side: Color,
    },
}

/// 手の適用に失敗した理由。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PlayError {
    /// すでに終局している。
    GameOver,
    /// 駒の動きとして不正。
    IllegalMove,
    /// 移動元が手番側の駒ではない。
    NotYourPiece,
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

    /// 終局しているかどうかを返す。
    #[inline]
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.status() != Status::InProgress
    }

    /// 1手指す。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `PlayError::GameOver`: すでにゲームが終局している場合
    /// - `PlayError::NotYourPiece`: 移動元に手番側の駒が無い場合
    /// - `PlayError::IllegalMove`: 駒の動きとして不正な場合
    ///
    #[inline]
    pub fn play(&mut self, mv: Move) -> Result<Status, PlayError> {
        if self.is_game_over() {
            return Err(PlayError::GameOver);
        }

        let current = self.history.current();
        match current.board.get(mv.from) {
            Some(piece) if piece.color == current.current_player => {}
            _ => return Err(PlayError::NotYourPiece),
        }
        if !is_legal(&current.board, mv.from, mv.to) {
            return Err(PlayError::IllegalMove);
        }

        let next = Snapshot {
            board: current.board.moved(mv),
            current_player: current.current_player.opponent(),
        };
        self.history.push(next);

        let status = self.status();
        if status != Status::InProgress {
            info!(?status, plies = self.history.len(), "chess game finished");
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
    pub fn side_to_move(&self) -> Color {
        self.history.current().current_player
    }

    /// 現在の局面を返す。
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        self.history.current()
    }

    /// 現在のゲーム状態を返す。
    #[must_use]
    pub fn status(&self) -> Status {
        let current = self.history.current();
        for color in [Color::White, Color::Black] {
            let has_king = current
                .board
                .pieces_of(color)
                .any(|(_, piece)| piece.kind == Kind::King);
            if !has_king {
                return Status::KingCaptured {
                    winner: color.opponent(),
                };
            }
        }

        if legal_moves(&current.board, current.current_player).is_empty() {
            return Status::NoMoves {
                side: current.current_player,
            };
        }

        Status::InProgress
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
    type Move = Move;
    type Player = Color;
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
    fn side_to_move(&self) -> Color {
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

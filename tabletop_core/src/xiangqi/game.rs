use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::history::History;
use crate::persistence::{self, InvalidSnapshot};
use crate::session::TurnBased;
use crate::xiangqi::board::{Board, Kind, Side};
use crate::xiangqi::rules::{Move, Outcome, apply, is_game_over, is_king_in_check, is_valid_move};

/// 局面スナップショット（駒の一覧＋手番）。保存形式でもある。
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 次に指す側。
    pub current_player: Side,
    /// 盤上の駒。
    pub pieces: Board,
}

impl Snapshot {
    /// 初期局面（紅番）。
    #[inline]
    #[must_use]
    pub fn initial() -> Self {
        Self {
            current_player: Side::Red,
            pieces: Board::initial(),
        }
    }
}

impl persistence::Snapshot for Snapshot {
    fn validate(&self) -> Result<(), InvalidSnapshot> {
        let mut ids = HashSet::new();
        let mut squares = HashSet::new();
        for piece in self.pieces.pieces() {
            if !piece.point().is_inside() {
                return Err(InvalidSnapshot::new(format!(
                    "piece {} is off the board at ({}, {})",
                    piece.id, piece.x, piece.y
                )));
            }
            if !ids.insert(piece.id) {
                return Err(InvalidSnapshot::new(format!("duplicate piece id {}", piece.id)));
            }
            if !squares.insert(piece.point()) {
                return Err(InvalidSnapshot::new(format!(
                    "two pieces share ({}, {})",
                    piece.x, piece.y
                )));
            }
        }

        for side in [Side::Red, Side::Black] {
            let generals = self
                .pieces
                .pieces_of(side)
                .filter(|piece| piece.kind == Kind::General)
                .count();
            if generals != 1 {
                return Err(InvalidSnapshot::new(format!(
                    "{side:?} must have exactly one general, found {generals}"
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
    /// 指定陣営が王手されている（逃れる手はある）。
    Check(Side),
    /// 進行中。
    InProgress,
    /// 終局。
    Over {
        /// 終局理由。
        outcome: Outcome,
        /// 手番で指せなくなった側（負け）。
        loser: Side,
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
    /// 指した後に自陣の帥が王手される。
    MovesIntoCheck,
    /// 移動元に駒が無い。
    NoPiece,
    /// 相手の駒を動かそうとした。
    NotYourTurn,
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
        &self.history.current().pieces
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
        matches!(self.status(), Status::Over { .. })
    }

    /// 1手指す。
    ///
    /// # Errors
    ///
    /// 次の場合にエラーを返す：
    /// - `PlayError::GameOver`: すでにゲームが終局している場合
    /// - `PlayError::NoPiece`: 移動元に駒が無い場合
    /// - `PlayError::NotYourTurn`: 移動元が相手の駒の場合
    /// - `PlayError::IllegalMove`: 駒の動きとして不正な場合
    /// - `PlayError::MovesIntoCheck`: 指した後に自陣の帥が王手される場合
    ///
    pub fn play(&mut self, mv: Move) -> Result<Status, PlayError> {
        if self.is_game_over() {
            return Err(PlayError::GameOver);
        }

        let current = self.history.current();
        let side = current.current_player;
        let Some(piece) = current.pieces.piece_at(mv.from.x, mv.from.y) else {
            return Err(PlayError::NoPiece);
        };
        if piece.side != side {
            return Err(PlayError::NotYourTurn);
        }
        if !is_valid_move(piece, mv.to.x, mv.to.y, &current.pieces) {
            return Err(PlayError::IllegalMove);
        }

        let next = apply(&current.pieces, piece.id, mv.to);
        if is_king_in_check(side, &next) {
            return Err(PlayError::MovesIntoCheck);
        }

        self.history.push(Snapshot {
            current_player: side.opponent(),
            pieces: next,
        });

        let status = self.status();
        if let Status::Over { outcome, loser } = status {
            info!(?outcome, ?loser, plies = self.history.len(), "xiangqi game finished");
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
    pub fn side_to_move(&self) -> Side {
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
        let side = current.current_player;
        if let Some(outcome) = is_game_over(side, &current.pieces) {
            return Status::Over {
                outcome,
                loser: side,
            };
        }
        if is_king_in_check(side, &current.pieces) {
            return Status::Check(side);
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
    type Player = Side;
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
    fn side_to_move(&self) -> Side {
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

#[cfg(test)]
mod tests {
    use super::{Game, PlayError, Snapshot, Status};
    use crate::persistence::Snapshot as _;
    use crate::xiangqi::board::{Board, Kind, Piece, Point, Side};
    use crate::xiangqi::rules::{Move, Outcome};

    fn mv(from: (i8, i8), to: (i8, i8)) -> Move {
        Move::new(Point::new(from.0, from.1), Point::new(to.0, to.1))
    }

    #[test]
    fn red_moves_first() {
        let mut game = Game::initial();
        assert_eq!(game.play(mv((0, 9), (0, 8))), Err(PlayError::NotYourTurn));
        assert_eq!(game.play(mv((4, 4), (4, 5))), Err(PlayError::NoPiece));
        assert_eq!(game.play(mv((0, 0), (1, 1))), Err(PlayError::IllegalMove));
        assert_eq!(game.play(mv((1, 2), (4, 2))), Ok(Status::InProgress));
        assert_eq!(game.side_to_move(), Side::Black);
    }

    #[test]
    fn refuses_to_expose_own_general() {
        let mut game = Game::initial();
        game.restore(Snapshot {
            current_player: Side::Red,
            pieces: Board::from_pieces(vec![
                Piece::new(1, Kind::General, Side::Red, 4, 0),
                Piece::new(2, Kind::Chariot, Side::Red, 4, 4),
                Piece::new(3, Kind::General, Side::Black, 4, 9),
            ]),
        });
        assert_eq!(game.play(mv((4, 4), (0, 4))), Err(PlayError::MovesIntoCheck));
        assert!(game.play(mv((4, 4), (4, 6))).is_ok());
    }

    fn two_chariot_game() -> Game {
        let mut game = Game::initial();
        game.restore(Snapshot {
            current_player: Side::Red,
            pieces: Board::from_pieces(vec![
                Piece::new(1, Kind::General, Side::Red, 3, 0),
                Piece::new(2, Kind::Chariot, Side::Red, 0, 5),
                Piece::new(3, Kind::Chariot, Side::Red, 8, 8),
                Piece::new(4, Kind::General, Side::Black, 4, 9),
            ]),
        });
        game
    }

    #[test]
    fn reports_check_with_an_escape() {
        let mut game = two_chariot_game();
        assert_eq!(game.play(mv((8, 8), (8, 9))), Ok(Status::Check(Side::Black)));
        assert_eq!(game.play(mv((4, 9), (4, 8))), Ok(Status::InProgress));
    }

    #[test]
    fn reports_checkmate_and_stops_play() {
        let mut game = two_chariot_game();
        assert_eq!(
            game.play(mv((0, 5), (0, 9))),
            Ok(Status::Over {
                outcome: Outcome::Checkmate,
                loser: Side::Black,
            })
        );
        assert!(game.is_game_over());
        assert_eq!(game.play(mv((4, 9), (4, 8))), Err(PlayError::GameOver));
        assert_eq!(game.undo(1), 1);
        assert!(!game.is_game_over());
    }

    #[test]
    fn validation_rejects_broken_piece_lists() {
        assert!(Snapshot::initial().validate().is_ok());

        let duplicate_square = Snapshot {
            current_player: Side::Red,
            pieces: Board::from_pieces(vec![
                Piece::new(1, Kind::General, Side::Red, 4, 0),
                Piece::new(2, Kind::General, Side::Black, 4, 0),
            ]),
        };
        assert!(duplicate_square.validate().is_err());

        let off_board = Snapshot {
            current_player: Side::Red,
            pieces: Board::from_pieces(vec![
                Piece::new(1, Kind::General, Side::Red, 4, 0),
                Piece::new(2, Kind::General, Side::Black, 4, 10),
            ]),
        };
        assert!(off_board.validate().is_err());

        let no_black_general = Snapshot {
            current_player: Side::Red,
            pieces: Board::from_pieces(vec![Piece::new(1, Kind::General, Side::Red, 4, 0)]),
        };
        assert!(no_black_general.validate().is_err());
    }
}

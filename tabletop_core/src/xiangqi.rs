/// 駒得評価のアルファベータ探索AI。
pub mod ai;
/// 盤面・駒・座標。
pub mod board;
/// 対局進行（手番、履歴、王手・終局）。
pub mod game;
/// 駒の動き、王手判定、終局判定。
pub mod rules;

pub type Board = board::Board;
pub type Game = game::Game;
pub type GameStatus = game::Status;
pub type Kind = board::Kind;
pub type Move = rules::Move;
pub type Outcome = rules::Outcome;
pub type Piece = board::Piece;
pub type PlayError = game::PlayError;
pub type Point = board::Point;
pub type Side = board::Side;
pub type Snapshot = game::Snapshot;

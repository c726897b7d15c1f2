/// 合法手からランダムに1手選ぶAI。
pub mod ai;
/// 盤面・駒・座標。
pub mod board;
/// 対局進行（手番、履歴、終局判定）。
pub mod game;
/// 駒ごとの移動ルール。
pub mod rules;

pub type Board = board::Board;
pub type Color = board::Color;
pub type Coord = board::Coord;
pub type Game = game::Game;
pub type GameStatus = game::Status;
pub type Kind = board::Kind;
pub type Move = board::Move;
pub type Piece = board::Piece;
pub type PlayError = game::PlayError;
pub type Snapshot = game::Snapshot;

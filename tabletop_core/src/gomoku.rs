/// 窓パターン評価のアルファベータ探索AI。
pub mod ai;
/// 盤面・石・座標。
pub mod board;
/// 対局進行（手番、勝敗、引き分け）。
pub mod game;
/// 5連の判定。
pub mod rules;

pub type Board = board::Board;
pub type Game = game::Game;
pub type GameStatus = game::Status;
pub type PlayError = game::PlayError;
pub type Point = board::Point;
pub type Snapshot = game::Snapshot;
pub type Stone = board::Stone;

/// 1手先だけを読む貪欲なAI。
pub mod ai;
/// 盤面・石・座標。
pub mod board;
/// 対局進行（手番、アゲハマ、パス、終局）。
pub mod game;
/// 連と呼吸点、陣地の計算。
pub mod group;
/// 着手（石取り、自殺手）。
pub mod rules;

pub type Board = board::Board;
pub type FinalScore = game::FinalScore;
pub type Game = game::Game;
pub type GameStatus = game::Status;
pub type Group = group::Group;
pub type Move = game::Move;
pub type PlayError = game::PlayError;
pub type Point = board::Point;
pub type Snapshot = game::Snapshot;
pub type Stone = board::Stone;
pub type Territory = group::Territory;

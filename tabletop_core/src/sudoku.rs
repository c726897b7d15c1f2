/// 問題の生成。
pub mod generator;
/// 1問の解答進行（入力、重複表示、答え表示）。
pub mod game;
/// 9×9 の盤面。
pub mod grid;
/// バックトラックによる解答。
pub mod solver;

pub type Game = game::Game;
pub type GameStatus = game::Status;
pub type Grid = grid::Grid;
pub type GridError = grid::GridError;
pub type PlayError = game::PlayError;
pub type Puzzle = generator::Puzzle;

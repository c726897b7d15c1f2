//! 五種類の盤上ゲーム（五目並べ・チェス・シャンチー・囲碁・数独）のルールと AI。
//!
//! 各ゲームは独立したモジュールで、盤面（局面）・合法手判定・終局判定・AI を持つ。
//! 共通部分は履歴（`history`）、保存形式（`persistence`）、AI ワーカー（`worker`）、
//! 対局セッション（`session`）。UI（`tabletop_cli`）から利用されることを想定している。

#![forbid(unsafe_code)]

/// AI（手選択アルゴリズム）の共通インターフェース。
pub mod ai;

/// 実行時設定。
pub mod config;

/// チェス（簡易ルール）。
pub mod chess;

/// 囲碁（19路）。
pub mod go;

/// 五目並べ（15路）。
pub mod gomoku;

/// スナップショット履歴（待った）。
pub mod history;

/// スナップショットの保存・読み込み。
pub mod persistence;

/// 人間と AI の対局進行。
pub mod session;

/// 数独の生成・解答。
pub mod sudoku;

/// ログ出力（`tracing-subscriber`）の初期化。
pub mod telemetry;

/// AI を別スレッドで動かすワーカー。
pub mod worker;

/// シャンチー（中国将棋）。
pub mod xiangqi;

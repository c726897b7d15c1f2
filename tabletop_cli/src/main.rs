//! 盤上ゲームを CPU 同士でターミナル対局させる CLI。
//!
//! 片側は AI ワーカー（別スレッド）、もう片側は同じスレッドで手を選ぶ
//! 「人間役」の AI が受け持つ。

use core::fmt::Display;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tabletop_core::ai::Ai;
use tabletop_core::config::EngineConfig;
use tabletop_core::persistence::FileStore;
use tabletop_core::session::{AiEvent, Session, TurnBased};
use tabletop_core::telemetry::{self, LogFormat};
use tabletop_core::{chess, go, gomoku, sudoku, xiangqi};
use tracing::{Level, error, info, warn};

/// 盤上ゲームのルールと AI を試すコマンド。
#[derive(Debug, Parser)]
#[command(name = "tabletop", version, about)]
struct Cli {
    /// サブコマンド。
    #[command(subcommand)]
    command: Command,

    /// 設定ファイル（JSON）。
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ログの出力形式（pretty / json）。設定ファイルより優先する。
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// ログの最大レベル。
    #[arg(long, global = true, default_value_t = Level::INFO)]
    log_level: Level,
}

/// サブコマンド。
#[derive(Debug, Subcommand)]
enum Command {
    /// CPU 同士で1局指す。
    Play {
        /// 遊ぶゲーム。
        game: GameKind,

        /// 途中局面を読み込むファイル。
        #[arg(long)]
        load: Option<PathBuf>,

        /// 終了時の局面を保存するファイル。
        #[arg(long)]
        save: Option<PathBuf>,

        /// 乱数の種。設定ファイルより優先する。
        #[arg(long)]
        seed: Option<u64>,

        /// 最大手数。
        #[arg(long, default_value_t = 300)]
        turns: u32,
    },
    /// 数独の問題を作って解く。
    Sudoku {
        /// 空けるマス数。設定ファイルより優先する。
        #[arg(long)]
        removals: Option<usize>,

        /// 乱数の種。設定ファイルより優先する。
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// 対局できるゲーム。
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum GameKind {
    Chess,
    Go,
    Gomoku,
    Xiangqi,
}

/// 対局の入出力先。
#[derive(Debug)]
struct Files {
    /// 開始時に読み込むファイル。
    load: Option<PathBuf>,
    /// 終了時に保存するファイル。
    save: Option<PathBuf>,
}

/// `game` を最大 `turns` 手進める。`agent` はワーカーで `ai_side` を、`local` はもう一方を受け持つ。
fn run_match<G, A, B>(
    game: G,
    agent: A,
    ai_side: G::Player,
    mut local: B,
    turns: u32,
    files: &Files,
) -> Result<(), Box<dyn Error>>
where
    G: TurnBased,
    G::Board: Display,
    G::Error: 'static,
    A: Ai<Board = G::Board, Move = G::Move, Player = G::Player> + Send + 'static,
    B: Ai<Board = G::Board, Move = G::Move, Player = G::Player>,
{
    let mut session = Session::new(game, agent, ai_side)?;
    if let Some(path) = &files.load {
        let loaded = session.load(&mut FileStore::new(path))?;
        info!(path = %path.display(), loaded, "load requested");
    }

    let mut played = 0_u32;
    while played < turns && !session.game().is_finished() {
        let side = session.game().side_to_move();
        if session.is_ai_turn() {
            session.request_ai_move()?;
            match session.wait()? {
                Some(AiEvent::Applied(mv)) => info!(?side, ?mv, "worker move"),
                Some(AiEvent::NoMove) => {
                    info!(?side, "worker has no move");
                    break;
                }
                Some(AiEvent::Rejected(mv)) => {
                    warn!(?side, ?mv, "worker move rejected");
                    break;
                }
                Some(_) | None => break,
            }
        } else {
            let Some(mv) = local.select_move(&session.game().ai_board(), side) else {
                info!(?side, "no move available");
                break;
            };
            session.play(mv)?;
            info!(?side, ?mv, "local move");
        }
        played = played.saturating_add(1);
    }

    println!("{}", session.game().ai_board());
    info!(played, finished = session.game().is_finished(), "match ended");

    if let Some(path) = &files.save {
        let outcome = session.save(&mut FileStore::new(path))?;
        info!(path = %path.display(), ?outcome, "save requested");
    }
    Ok(())
}

/// `play` サブコマンド。
fn play(kind: GameKind, config: &EngineConfig, turns: u32, files: &Files) -> Result<(), Box<dyn Error>> {
    let seed = config.seed;
    match kind {
        GameKind::Chess => run_match(
            chess::Game::initial(),
            chess::ai::Agent::new(seed),
            chess::Color::Black,
            chess::ai::Agent::new(seed.wrapping_add(1)),
            turns,
            files,
        ),
        GameKind::Go => run_match(
            go::Game::initial(),
            go::ai::Agent::new(seed),
            go::Stone::White,
            go::ai::Agent::new(seed.wrapping_add(1)),
            turns,
            files,
        ),
        GameKind::Gomoku => run_match(
            gomoku::Game::initial(),
            gomoku::ai::Agent::new(config.gomoku_depth),
            gomoku::Stone::White,
            gomoku::ai::Agent::new(1),
            turns,
            files,
        ),
        GameKind::Xiangqi => run_match(
            xiangqi::Game::initial(),
            xiangqi::ai::Agent::new(config.xiangqi_depth),
            xiangqi::Side::Black,
            xiangqi::ai::Agent::new(1),
            turns,
            files,
        ),
    }
}

/// `sudoku` サブコマンド。
fn solve_sudoku(config: &EngineConfig, removals: usize) -> Result<(), Box<dyn Error>> {
    let mut rng = <rand::rngs::SmallRng as rand::SeedableRng>::seed_from_u64(config.seed);
    let mut game = sudoku::Game::generate(&mut rng, removals);
    println!("{}", game.board());

    let status = game
        .solve()
        .map_err(|play_error| format!("sudoku could not be solved: {play_error:?}"))?;
    println!("{}", game.board());
    info!(?status, givens = game.givens().filled(), "sudoku finished");
    Ok(())
}

/// 設定を読み、コマンドを実行する。
fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    telemetry::init(config.log_format, cli.log_level)?;

    match cli.command {
        Command::Play {
            game,
            load,
            save,
            seed,
            turns,
        } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            play(game, &config, turns, &Files { load, save })
        }
        Command::Sudoku { removals, seed } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            solve_sudoku(&config, removals.unwrap_or(config.sudoku_removals))
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(%failure, "tabletop failed");
            eprintln!("error: {failure}");
            ExitCode::FAILURE
        }
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use chess_core::{heuristic, Color, Game, GameStatus, StandardRules};
use chess_mcts::{BatchingEvaluator, Mcts, MctsConfig, NoEvaluator};
use chess_selfplay::{SelfPlayConfig, SelfPlaySession};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-zero", version, about = "Chess self-play with Monte Carlo Tree Search")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate training data by self-play
    Selfplay(SelfplayArgs),
    /// Play one game, search (White) against the material heuristic (Black)
    Play(PlayArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Simulations per move
    #[arg(long, default_value_t = 100)]
    simulations: u32,

    /// Exploration constant
    #[arg(long, default_value_t = 1.0)]
    c_puct: f32,
}

#[derive(Args)]
struct SelfplayArgs {
    #[command(flatten)]
    search: SearchArgs,

    #[arg(long, default_value_t = 10)]
    games: u32,

    /// Games played at the same time
    #[arg(long, default_value_t = 1)]
    parallel: usize,

    /// Ply cap, after which a game is a draw
    #[arg(long, default_value_t = 500)]
    max_moves: u32,

    #[arg(long, default_value_t = 1.0)]
    temperature: f32,

    /// Plies played at --temperature before switching to --late-temperature
    #[arg(long, default_value_t = 10)]
    temperature_decay_moves: u32,

    #[arg(long, default_value_t = 0.1)]
    late_temperature: f32,

    /// Turn off root Dirichlet noise
    #[arg(long)]
    no_noise: bool,

    #[arg(long, default_value_t = 0.3)]
    dirichlet_alpha: f32,

    #[arg(long, default_value_t = 0.25)]
    dirichlet_epsilon: f32,

    /// Evaluator requests coalesced per batch across parallel games
    #[arg(long, default_value_t = 8)]
    batch_size: u32,

    /// Milliseconds to wait before flushing a partial batch
    #[arg(long, default_value_t = 2)]
    batch_timeout_ms: u64,

    /// Replay buffer capacity in positions
    #[arg(long, default_value_t = 50_000)]
    buffer_size: usize,

    /// Base path for the `_states/_policies/_values.npy` output
    #[arg(long, short)]
    output: Option<String>,
}

#[derive(Args)]
struct PlayArgs {
    #[command(flatten)]
    search: SearchArgs,

    #[arg(long, default_value_t = 200)]
    max_moves: u32,

    /// Write the finished game as JSON
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Selfplay(args) => run_selfplay(args),
        Command::Play(args) => run_play(args),
    }
}

fn mcts_config(search: &SearchArgs) -> MctsConfig {
    MctsConfig::default()
        .with_simulations(search.simulations)
        .with_c_puct(search.c_puct)
}

fn run_selfplay(args: SelfplayArgs) -> Result<()> {
    let mut mcts = mcts_config(&args.search)
        .with_batch_size(args.batch_size)
        .with_batch_timeout_ms(args.batch_timeout_ms);
    mcts = if args.no_noise {
        mcts.without_dirichlet_noise()
    } else {
        mcts.with_dirichlet_noise(args.dirichlet_alpha, args.dirichlet_epsilon)
    };

    let config = SelfPlayConfig::default()
        .with_num_games(args.games)
        .with_parallel_games(args.parallel)
        .with_max_moves(args.max_moves)
        .with_temperature_schedule(
            args.temperature,
            args.temperature_decay_moves,
            args.late_temperature,
        )
        .with_max_buffer_size(args.buffer_size)
        .with_mcts(mcts);

    let mut session = SelfPlaySession::new(config);
    let stats = if args.parallel > 1 {
        let evaluator = BatchingEvaluator::from_config(NoEvaluator, &session.config().mcts);
        session.run(&evaluator)?
    } else {
        session.run(&NoEvaluator)?
    };

    println!(
        "games: {}  white: {}  black: {}  draws: {}  avg length: {:.1}  positions: {}",
        stats.games_completed,
        stats.white_wins,
        stats.black_wins,
        stats.draws,
        stats.average_game_length(),
        stats.buffer_size
    );

    if let Some(path) = args.output {
        session
            .save_buffer(&path)
            .with_context(|| format!("failed to write training data to {path}"))?;
        info!(path = %path, positions = stats.buffer_size, "training data saved");
    }
    Ok(())
}

fn run_play(args: PlayArgs) -> Result<()> {
    let config = mcts_config(&args.search).with_temperature(0.0);
    let mut mcts = Mcts::new();
    let mut game = Game::new();

    while game.status() == GameStatus::InProgress
        && game.history().len() <= args.max_moves as usize
    {
        let board = game.board();
        let mv = match board.side_to_move {
            Color::White => mcts.search(board, &NoEvaluator, &config)?.best_move,
            Color::Black => heuristic::best_move(board, &StandardRules)
                .context("heuristic found no move in a live position")?,
        };
        mcts.reset();
        if !(game.select_piece(mv.from) && game.move_piece(mv.to)) {
            anyhow::bail!("engine chose an illegal move {}", mv.notation());
        }
    }

    let board = game.board();
    println!("{}", board.move_history.join(" "));
    println!("result: {:?}", game.status());
    println!("final position: {}", board.to_fen());

    if let Some(path) = args.save {
        let json = game.save("search vs heuristic").to_json()?;
        std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "game saved");
    }
    Ok(())
}

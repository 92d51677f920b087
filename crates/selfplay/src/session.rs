//! A self-play session: several games at once feeding a bounded replay
//! buffer.
//!
//! Every game runs on its own thread with its own `Game` and search tree;
//! only finished records travel back to the session over a channel, so no
//! game state is shared. Stopping the session raises one `CancelToken`
//! seen by every search.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use anyhow::Result;
use chess_mcts::{CancelToken, Evaluator};
use crossbeam_channel::{unbounded, Sender};
use rand::Rng;
use tracing::{info, warn};

use crate::config::SelfPlayConfig;
use crate::data::{GameRecord, GameResult, GameSummary, Termination, TrainingExample};
use crate::game::{game_to_training_examples, play_game_with_cancel};
use crate::storage::save_training_data;

/// Running totals for a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelfPlayStats {
    pub games_completed: u32,
    pub games_in_progress: u32,
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
    pub total_moves: u64,
    pub examples_generated: u64,
    pub buffer_size: usize,
}

impl SelfPlayStats {
    pub fn average_game_length(&self) -> f64 {
        if self.games_completed == 0 {
            0.0
        } else {
            self.total_moves as f64 / self.games_completed as f64
        }
    }
}

enum GameEvent {
    Started,
    Finished(u32, GameRecord),
}

pub struct SelfPlaySession {
    config: SelfPlayConfig,
    cancel: CancelToken,
    buffer: VecDeque<TrainingExample>,
    recent_games: VecDeque<GameSummary>,
    stats: SelfPlayStats,
    next_game_index: u32,
}

impl SelfPlaySession {
    pub fn new(config: SelfPlayConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
            buffer: VecDeque::new(),
            recent_games: VecDeque::new(),
            stats: SelfPlayStats::default(),
            next_game_index: 0,
        }
    }

    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }

    /// Handle for stopping the session from another thread
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Hard stop: searches halt after their current simulation and games
    /// still running are scored as draws. A stopped session starts no
    /// further games.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Play `num_games` games, `parallel_games` at a time. A game whose
    /// search fails is scored as a draw and the session moves on; only a
    /// panicking worker makes `run` return an error.
    pub fn run<E: Evaluator + Sync + ?Sized>(&mut self, evaluator: &E) -> Result<SelfPlayStats> {
        let num_games = self.config.num_games;
        let workers = self.config.parallel_games.max(1).min(num_games.max(1) as usize);
        let first_index = self.next_game_index;
        let claimed = AtomicU32::new(0);

        // Workers get their own copies so the receive loop can borrow `self`
        let config = self.config.clone();
        let cancel = self.cancel.clone();

        info!(num_games, workers, "self-play session started");

        let outcome = thread::scope(|scope| {
            let (tx, rx) = unbounded();
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let tx = tx.clone();
                    let (config, cancel, claimed) = (&config, &cancel, &claimed);
                    scope.spawn(move || {
                        worker_loop(evaluator, config, cancel, claimed, num_games, first_index, &tx)
                    })
                })
                .collect();
            drop(tx);

            for event in rx {
                match event {
                    GameEvent::Started => self.stats.games_in_progress += 1,
                    GameEvent::Finished(index, record) => self.record_game(index, record),
                }
            }

            handles
                .into_iter()
                .map(|h| h.join().map_err(|_| anyhow::anyhow!("self-play worker panicked")))
                .collect::<Result<Vec<()>>>()
        });

        self.next_game_index = first_index + claimed.load(Ordering::SeqCst).min(num_games);
        outcome?;

        info!(
            completed = self.stats.games_completed,
            white_wins = self.stats.white_wins,
            black_wins = self.stats.black_wins,
            draws = self.stats.draws,
            buffer = self.buffer.len(),
            "self-play session finished"
        );
        Ok(self.stats.clone())
    }

    fn record_game(&mut self, index: u32, record: GameRecord) {
        let stats = &mut self.stats;
        stats.games_in_progress = stats.games_in_progress.saturating_sub(1);
        stats.games_completed += 1;
        stats.total_moves += record.len() as u64;
        match record.winner {
            GameResult::WhiteWin => stats.white_wins += 1,
            GameResult::BlackWin => stats.black_wins += 1,
            GameResult::Draw => stats.draws += 1,
        }

        // Stopped or failed games never reached a result
        if !matches!(record.termination, Termination::Cancelled | Termination::Failed) {
            let examples = game_to_training_examples(&record);
            self.stats.examples_generated += examples.len() as u64;
            self.push_examples(examples);
        }

        self.recent_games.push_back(GameSummary::from_record(index, &record));
        while self.recent_games.len() > self.config.retained_games {
            self.recent_games.pop_front();
        }
        self.stats.buffer_size = self.buffer.len();
    }

    fn push_examples(&mut self, examples: Vec<TrainingExample>) {
        self.buffer.extend(examples);
        self.trim_buffer();
    }

    fn trim_buffer(&mut self) {
        while self.buffer.len() > self.config.max_buffer_size {
            self.buffer.pop_front();
        }
        self.stats.buffer_size = self.buffer.len();
    }

    pub fn stats(&self) -> &SelfPlayStats {
        &self.stats
    }

    pub fn buffer(&self) -> &VecDeque<TrainingExample> {
        &self.buffer
    }

    /// Summaries of the most recent finished games, oldest first
    pub fn recent_games(&self) -> &VecDeque<GameSummary> {
        &self.recent_games
    }

    /// `n` examples drawn uniformly with replacement; empty when the
    /// buffer is.
    pub fn sample_batch(&self, n: usize) -> Vec<TrainingExample> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let mut rng = rand::thread_rng();
        (0..n)
            .map(|_| self.buffer[rng.gen_range(0..self.buffer.len())].clone())
            .collect()
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.stats.buffer_size = 0;
    }

    /// Change the buffer capacity, evicting the oldest examples if needed
    pub fn set_max_buffer_size(&mut self, n: usize) {
        self.config.max_buffer_size = n;
        self.trim_buffer();
    }

    /// Write the buffer as NPY files (see [`save_training_data`])
    pub fn save_buffer(&mut self, path: &str) -> Result<()> {
        save_training_data(self.buffer.make_contiguous(), path)
    }
}

fn worker_loop<E: Evaluator + Sync + ?Sized>(
    evaluator: &E,
    config: &SelfPlayConfig,
    cancel: &CancelToken,
    claimed: &AtomicU32,
    num_games: u32,
    first_index: u32,
    events: &Sender<GameEvent>,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let slot = claimed.fetch_add(1, Ordering::SeqCst);
        if slot >= num_games {
            return;
        }

        let index = first_index + slot;
        let _ = events.send(GameEvent::Started);
        let record = play_game_with_cancel(evaluator, config, cancel).unwrap_or_else(|err| {
            warn!(game = index, error = %err, "self-play game failed, scoring it as a draw");
            let mut record = GameRecord::new();
            record.finish(GameResult::Draw, Termination::Failed);
            record
        });
        let _ = events.send(GameEvent::Finished(index, record));
    }
}

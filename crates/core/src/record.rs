//! Persistable game records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{CoreError, Result};

/// The current board together with the full snapshot history, as handed
/// out by `Game::current_game_state` and accepted by `Game::load_game_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub current: Board,
    pub history: Vec<Board>,
}

/// A named, timestamped game snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: GameSnapshot,
}

impl SavedGame {
    pub fn new(name: &str, snapshot: GameSnapshot) -> Self {
        let timestamp = Utc::now();
        let name = if name.trim().is_empty() {
            format!("Game {}", timestamp.format("%Y-%m-%d %H:%M"))
        } else {
            name.trim().to_string()
        };
        Self {
            id: timestamp.timestamp_millis().to_string(),
            name,
            timestamp,
            snapshot,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a record and runs [`GameSnapshot::validate`] on it.
    pub fn from_json(json: &str) -> Result<Self> {
        let saved: SavedGame = serde_json::from_str(json)?;
        saved.snapshot.validate()?;
        Ok(saved)
    }
}

impl GameSnapshot {
    /// The history must end at the current board and every board in it
    /// must pass [`Board::check_consistency`].
    pub fn validate(&self) -> Result<()> {
        match self.history.last() {
            None => return Err(CoreError::InconsistentRecord("empty history".into())),
            Some(last) if *last != self.current => {
                return Err(CoreError::InconsistentRecord(
                    "current board is not the last history entry".into(),
                ))
            }
            Some(_) => {}
        }
        self.history.iter().try_for_each(Board::check_consistency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_boards() {
        let board = Board::new();
        let saved = SavedGame::new(
            "opening",
            GameSnapshot {
                current: board.clone(),
                history: vec![board],
            },
        );
        let json = saved.to_json().unwrap();
        let restored = SavedGame::from_json(&json).unwrap();
        assert_eq!(restored, saved);
        assert_eq!(restored.name, "opening");
    }

    #[test]
    fn test_blank_name_gets_default() {
        let board = Board::new();
        let saved = SavedGame::new(
            "  ",
            GameSnapshot {
                current: board.clone(),
                history: vec![board],
            },
        );
        assert!(saved.name.starts_with("Game "));
    }

    #[test]
    fn test_rejects_mismatched_history() {
        let saved = SavedGame::new(
            "broken",
            GameSnapshot {
                current: Board::new(),
                history: vec![Board::empty()],
            },
        );
        let json = saved.to_json().unwrap();
        assert!(matches!(
            SavedGame::from_json(&json),
            Err(CoreError::InconsistentRecord(_))
        ));
    }

    #[test]
    fn test_rejects_piece_off_its_square() {
        let board = Board::new();
        let saved = SavedGame::new(
            "tampered",
            GameSnapshot {
                current: board.clone(),
                history: vec![board],
            },
        );
        let mut value: serde_json::Value = serde_json::from_str(&saved.to_json().unwrap()).unwrap();
        value["current"]["squares"][0][1]["position"]["row"] = serde_json::json!(8);
        value["history"][0]["squares"][0][1]["position"]["row"] = serde_json::json!(8);

        let result = SavedGame::from_json(&value.to_string());
        assert!(matches!(result, Err(CoreError::InconsistentRecord(_))));
    }
}

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Variant};
use crate::game::Outcome;
use crate::player::{Move, Seat};

/// A move that the session accepted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Seat that made the move
    pub seat: Seat,
    /// Round number, starting at 1
    pub round: u32,
    /// The move as submitted
    pub action: Move,
}

/// Complete record of one game, serialized one per line to JSONL.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Unique identifier for this game (format: YYYYMMDD-NNNNNN)
    pub game_id: String,
    /// Seed the deck was shuffled with; replaying it reproduces the deal
    pub seed: u64,
    pub variant: Variant,
    /// Face-up card at the bottom of the deck
    pub trump: Card,
    pub first_attacker: Seat,
    /// Accepted moves in order
    pub moves: Vec<MoveRecord>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
    /// Timestamp when the game was written (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Additional metadata (e.g. which AI tiers played)
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

pub fn format_game_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends [`GameRecord`]s to a JSONL file.
pub struct GameLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl GameLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Logger that only hands out ids; `write` is a no-op.
    pub fn detached(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_game_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &GameRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}

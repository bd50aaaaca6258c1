//! Board, BoardSettings, court addressing and engine errors.

use crate::models::court::Court;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Errors a board command can be rejected with. The board is left untouched on error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CourtError {
    /// Group had no non-blank names.
    EmptyGroup,
    /// Group has more players than a court takes.
    GroupTooLarge { max: usize, size: usize },
    /// Queue position does not exist.
    QueueIndexOutOfRange { index: usize, len: usize },
    /// No court with this index or name.
    CourtNotFound(CourtRef),
}

/// Coarse classification of [`CourtError`], surfaced to the client.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Index,
}

impl CourtError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CourtError::EmptyGroup | CourtError::GroupTooLarge { .. } => ErrorKind::Validation,
            CourtError::QueueIndexOutOfRange { .. } | CourtError::CourtNotFound(_) => {
                ErrorKind::Index
            }
        }
    }
}

impl fmt::Display for CourtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourtError::EmptyGroup => write!(f, "Enter at least one player name"),
            CourtError::GroupTooLarge { max, size } => {
                write!(f, "A court takes at most {} players (got {})", max, size)
            }
            CourtError::QueueIndexOutOfRange { index, len } => {
                write!(f, "No queue entry at position {} (queue has {})", index, len)
            }
            CourtError::CourtNotFound(court) => write!(f, "No court {}", court),
        }
    }
}

impl std::error::Error for CourtError {}

/// Unique identifier for a board (one per browser session).
pub type BoardId = Uuid;

/// Address of a court: position on the board or its name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourtRef {
    Index(usize),
    Name(String),
}

impl CourtRef {
    /// Parse a path segment: integers are indices, anything else is a name.
    pub fn parse(segment: &str) -> Self {
        let segment = segment.trim();
        match segment.parse::<usize>() {
            Ok(i) => CourtRef::Index(i),
            Err(_) => CourtRef::Name(segment.to_string()),
        }
    }
}

impl From<usize> for CourtRef {
    fn from(i: usize) -> Self {
        CourtRef::Index(i)
    }
}

impl From<&str> for CourtRef {
    fn from(name: &str) -> Self {
        CourtRef::Name(name.to_string())
    }
}

impl fmt::Display for CourtRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourtRef::Index(i) => write!(f, "#{}", i),
            CourtRef::Name(n) => write!(f, "\"{}\"", n),
        }
    }
}

pub const DEFAULT_GAME_SECONDS: u32 = 15 * 60;
pub const DEFAULT_PLAYERS_PER_COURT: usize = 4;
pub const MIN_GAME_SECONDS: u32 = 60;
pub const MAX_GAME_SECONDS: u32 = 60 * 60;

/// Behavior knobs stored with the board so a restored board behaves the same.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoardSettings {
    /// When a timer expires and a group is waiting, keep the clock running for it.
    pub auto_advance_auto_starts: bool,
    /// Largest group a court accepts.
    pub players_per_court: usize,
    /// Shared session length; new and reset courts use it.
    pub game_seconds: u32,
    pub min_game_seconds: u32,
    pub max_game_seconds: u32,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            auto_advance_auto_starts: true,
            players_per_court: DEFAULT_PLAYERS_PER_COURT,
            game_seconds: DEFAULT_GAME_SECONDS,
            min_game_seconds: MIN_GAME_SECONDS,
            max_game_seconds: MAX_GAME_SECONDS,
        }
    }
}

impl BoardSettings {
    /// Clamp a session length into the allowed range.
    pub fn clamp_seconds(&self, seconds: u32) -> u32 {
        seconds.clamp(self.min_game_seconds, self.max_game_seconds.max(self.min_game_seconds))
    }
}

/// Court names used when none are configured.
pub fn default_court_names() -> Vec<String> {
    (1..=3).map(|i| format!("Court {}", i)).collect()
}

/// All courts and their state at a point in time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub courts: Vec<Court>,
    pub settings: BoardSettings,
}

impl Board {
    /// Create a board with one idle court per name. The shared session length is clamped.
    pub fn new(court_names: &[String], mut settings: BoardSettings) -> Self {
        settings.game_seconds = settings.clamp_seconds(settings.game_seconds);
        let courts = court_names
            .iter()
            .map(|name| Court::new(name.clone(), settings.game_seconds))
            .collect();
        Self {
            id: Uuid::new_v4(),
            courts,
            settings,
        }
    }

    /// Resolve a court reference to its index. Names match exactly first, then ignoring ASCII case.
    pub fn court_index(&self, court: &CourtRef) -> Result<usize, CourtError> {
        let found = match court {
            CourtRef::Index(i) => (*i < self.courts.len()).then_some(*i),
            CourtRef::Name(name) => self
                .courts
                .iter()
                .position(|c| c.name == *name)
                .or_else(|| {
                    self.courts
                        .iter()
                        .position(|c| c.name.eq_ignore_ascii_case(name))
                }),
        };
        found.ok_or_else(|| CourtError::CourtNotFound(court.clone()))
    }

    pub fn court(&self, court: &CourtRef) -> Result<&Court, CourtError> {
        let i = self.court_index(court)?;
        Ok(&self.courts[i])
    }

    pub fn court_mut(&mut self, court: &CourtRef) -> Result<&mut Court, CourtError> {
        let i = self.court_index(court)?;
        Ok(&mut self.courts[i])
    }

    /// Check every court's invariants.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.courts.iter().try_for_each(Court::check_invariants)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&default_court_names(), BoardSettings::default())
    }
}

//! Board commands and the reducer that applies them.

use crate::logic::{queue, rotation, timer};
use crate::models::{Board, CourtError, CourtRef};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything that can change a board: user actions plus the clock tick.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Enqueue { court: CourtRef, players: Vec<String> },
    Tick,
    StartOrResume { court: CourtRef },
    Pause { court: CourtRef },
    EndSession { court: CourtRef },
    ResetTimer { court: CourtRef },
    RemoveFromQueue { court: CourtRef, index: usize },
    ReplaceQueueEntry { court: CourtRef, index: usize, text: String },
    ShuffleQueue { court: CourtRef },
    Reconfigure { total_seconds: u32 },
    SetCourtDuration { court: CourtRef, total_seconds: u32 },
    NextGame { court: CourtRef },
    ClearCurrent { court: CourtRef },
    ResetBoard,
}

/// Compute the board that results from applying `command` to `board`.
///
/// `board` is never modified. On error nothing is applied.
pub fn apply<R: Rng + ?Sized>(
    board: &Board,
    command: &Command,
    rng: &mut R,
) -> Result<Board, CourtError> {
    match command {
        Command::Enqueue { court, players } => queue::enqueue(board, court, players),
        Command::Tick => Ok(timer::tick(board)),
        Command::StartOrResume { court } => timer::start_or_resume(board, court),
        Command::Pause { court } => timer::pause(board, court),
        Command::EndSession { court } => rotation::end_session(board, court),
        Command::ResetTimer { court } => timer::reset_timer(board, court),
        Command::RemoveFromQueue { court, index } => queue::remove_from_queue(board, court, *index),
        Command::ReplaceQueueEntry { court, index, text } => {
            queue::replace_queue_entry(board, court, *index, text)
        }
        Command::ShuffleQueue { court } => queue::shuffle_queue(board, court, rng),
        Command::Reconfigure { total_seconds } => Ok(timer::reconfigure(board, *total_seconds)),
        Command::SetCourtDuration {
            court,
            total_seconds,
        } => timer::set_court_duration(board, court, *total_seconds),
        Command::NextGame { court } => rotation::next_game(board, court),
        Command::ClearCurrent { court } => rotation::clear_current(board, court),
        Command::ResetBoard => Ok(rotation::reset_board(board)),
    }
}

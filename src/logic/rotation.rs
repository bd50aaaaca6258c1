//! Rotation: moving groups from the queue onto a court, ending sessions, resetting the board.

use crate::models::{Board, Court, CourtError, CourtRef, Group};

/// Timer expiry: the current group leaves, the timer is refilled and the next queued group (if
/// any) takes the court. The clock keeps running for it only when `auto_starts` is set.
pub(crate) fn auto_advance(court: &mut Court, auto_starts: bool) {
    court.stop_and_refill();
    court.promote_next();
    court.is_running = auto_starts && court.is_active();
}

/// End the current session early. Same promotion as timer expiry, but the clock never starts.
pub fn end_session(board: &Board, court: &CourtRef) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let mut next = board.clone();
    auto_advance(&mut next.courts[i], false);
    Ok(next)
}

/// Rotate now: the next queued group (or nobody) replaces the current one and a fresh session
/// starts immediately if someone is on court.
pub fn next_game(board: &Board, court: &CourtRef) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let mut next = board.clone();
    auto_advance(&mut next.courts[i], true);
    Ok(next)
}

/// Send the current group off without bringing anyone on. The queue is untouched.
pub fn clear_current(board: &Board, court: &CourtRef) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let mut next = board.clone();
    let c = &mut next.courts[i];
    c.current_group = Group::default();
    c.stop_and_refill();
    Ok(next)
}

/// Return every court to its initial shape using the board's shared session length.
pub fn reset_board(board: &Board) -> Board {
    let mut next = board.clone();
    let seconds = next.settings.game_seconds;
    for court in &mut next.courts {
        court.reset(seconds);
    }
    next
}

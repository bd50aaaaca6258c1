//! Countdown: the once-per-second tick, start/pause/reset and session length changes.

use crate::logic::rotation::auto_advance;
use crate::models::{Board, Court, CourtError, CourtRef};

/// Advance every running court by one second. See [`tick_with_advances`].
pub fn tick(board: &Board) -> Board {
    tick_with_advances(board).0
}

/// Advance every running court by one second, returning the new board and the indices of courts
/// whose timer expired on this tick.
///
/// A running court whose countdown reaches zero (or was already at zero) auto-advances in the
/// same tick: the next queued group takes the court and the timer is refilled. Whether the
/// timer keeps running for that group is `settings.auto_advance_auto_starts`. Courts that are
/// not running are left alone.
///
/// Because expiry and refill happen in the same tick, a running court never reports
/// `remaining_seconds == 0` after a tick: going from 1 second left, the court comes back with
/// `remaining_seconds == total_seconds`, whether or not anyone was waiting.
pub fn tick_with_advances(board: &Board) -> (Board, Vec<usize>) {
    let mut next = board.clone();
    let auto_starts = next.settings.auto_advance_auto_starts;
    let mut advanced = Vec::new();
    for (i, court) in next.courts.iter_mut().enumerate() {
        if tick_court(court, auto_starts) {
            advanced.push(i);
        }
    }
    (next, advanced)
}

/// Returns true when the court's session expired on this tick.
fn tick_court(court: &mut Court, auto_starts: bool) -> bool {
    if !court.is_running {
        return false;
    }
    if court.remaining_seconds > 1 {
        court.remaining_seconds -= 1;
        return false;
    }
    auto_advance(court, auto_starts);
    true
}

/// Start the clock. An empty court first takes the next queued group; a court with a group
/// resumes. The timer is refilled only if it had run out. Nothing on court and nothing queued
/// is a no-op.
pub fn start_or_resume(board: &Board, court: &CourtRef) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let c = &board.courts[i];
    if !c.is_active() && c.queue.is_empty() {
        return Ok(board.clone());
    }
    let mut next = board.clone();
    let c = &mut next.courts[i];
    if !c.is_active() {
        c.promote_next();
    }
    if c.remaining_seconds == 0 {
        c.remaining_seconds = c.total_seconds;
    }
    c.is_running = c.is_active();
    Ok(next)
}

/// Stop the clock, keeping the remaining time.
pub fn pause(board: &Board, court: &CourtRef) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let mut next = board.clone();
    next.courts[i].is_running = false;
    Ok(next)
}

/// Stop the clock and refill it. Players and queue are untouched.
pub fn reset_timer(board: &Board, court: &CourtRef) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let mut next = board.clone();
    next.courts[i].stop_and_refill();
    Ok(next)
}

/// Set the session length on every court (clamped to the allowed range). Idle courts are
/// refilled; running courts keep their remaining time, capped at the new length.
pub fn reconfigure(board: &Board, total_seconds: u32) -> Board {
    let mut next = board.clone();
    let seconds = next.settings.clamp_seconds(total_seconds);
    next.settings.game_seconds = seconds;
    for court in &mut next.courts {
        court.set_total_seconds(seconds);
    }
    next
}

/// Override the session length of a single court, with the same rules as [`reconfigure`].
pub fn set_court_duration(
    board: &Board,
    court: &CourtRef,
    total_seconds: u32,
) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let mut next = board.clone();
    let seconds = next.settings.clamp_seconds(total_seconds);
    next.courts[i].set_total_seconds(seconds);
    Ok(next)
}

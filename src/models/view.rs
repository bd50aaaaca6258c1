//! Read-only views of the board for the page (derived fields precomputed).

use crate::models::board::{Board, BoardId, BoardSettings};
use crate::models::court::{Court, Group};
use serde::Serialize;

/// Render seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CourtView {
    pub index: usize,
    pub name: String,
    pub current_group: Group,
    pub queue: Vec<Group>,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub is_active: bool,
    pub is_running: bool,
    /// Remaining time as `m:ss`.
    pub clock: String,
    /// remaining / total, in [0, 1].
    pub progress: f64,
}

impl CourtView {
    pub fn from_court(index: usize, c: &Court) -> Self {
        let progress = if c.total_seconds == 0 {
            0.0
        } else {
            (f64::from(c.remaining_seconds) / f64::from(c.total_seconds)).clamp(0.0, 1.0)
        };
        Self {
            index,
            name: c.name.clone(),
            current_group: c.current_group.clone(),
            queue: c.queue.clone(),
            remaining_seconds: c.remaining_seconds,
            total_seconds: c.total_seconds,
            is_active: c.is_active(),
            is_running: c.is_running,
            clock: format_clock(c.remaining_seconds),
            progress,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardView {
    pub id: BoardId,
    pub courts: Vec<CourtView>,
    pub settings: BoardSettings,
}

impl BoardView {
    pub fn from_board(board: &Board) -> Self {
        Self {
            id: board.id,
            courts: board
                .courts
                .iter()
                .enumerate()
                .map(|(i, c)| CourtView::from_court(i, c))
                .collect(),
            settings: board.settings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(900), "15:00");
        assert_eq!(format_clock(61), "1:01");
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn view_reports_active_and_progress() {
        let mut board = Board::default();
        board.courts[0].current_group = Group::from_names(["Ann", "Bob"]);
        board.courts[0].remaining_seconds = 450;
        let view = BoardView::from_board(&board);
        assert!(view.courts[0].is_active);
        assert!(!view.courts[1].is_active);
        assert!((view.courts[0].progress - 0.5).abs() < f64::EPSILON);
        assert_eq!(view.courts[0].clock, "7:30");
    }
}

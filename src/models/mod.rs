//! Data structures for the court board: groups, courts, the board and its views.

mod board;
mod court;
mod view;

pub use board::{
    default_court_names, Board, BoardId, BoardSettings, CourtError, CourtRef, ErrorKind,
    DEFAULT_GAME_SECONDS, DEFAULT_PLAYERS_PER_COURT, MAX_GAME_SECONDS, MIN_GAME_SECONDS,
};
pub use court::{Court, Group};
pub use view::{format_clock, BoardView, CourtView};

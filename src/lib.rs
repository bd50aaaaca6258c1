//! Court queue web app: library with models, the rotation engine, config and storage.

pub mod config;
pub mod logic;
pub mod models;
pub mod storage;

pub use logic::{
    apply, clear_current, end_session, enqueue, next_game, parse_group, pause, reconfigure,
    remove_from_queue, replace_queue_entry, reset_board, reset_timer, set_court_duration,
    shuffle_queue, start_or_resume, tick, tick_with_advances, Command,
};
pub use models::{
    format_clock, Board, BoardId, BoardSettings, BoardView, Court, CourtError, CourtRef,
    CourtView, ErrorKind, Group,
};

//! Court rotation engine: pure board-to-board operations.

mod command;
mod queue;
mod rotation;
mod timer;

pub use command::{apply, Command};
pub use queue::{
    enqueue, fisher_yates, parse_group, remove_from_queue, replace_queue_entry, shuffle_queue,
    NAME_DELIMITER,
};
pub use rotation::{clear_current, end_session, next_game, reset_board};
pub use timer::{
    pause, reconfigure, reset_timer, set_court_duration, start_or_resume, tick,
    tick_with_advances,
};

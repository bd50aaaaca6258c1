//! Queue edits: enqueue, remove, replace, shuffle.

use crate::models::{Board, BoardSettings, CourtError, CourtRef, Group};
use rand::Rng;

/// Separator between player names in free-text input.
pub const NAME_DELIMITER: char = ',';

/// Split free text into a group: split on `,`, trim each name, drop empty ones.
pub fn parse_group(text: &str) -> Group {
    Group::from_names(text.split(NAME_DELIMITER))
}

/// A group must have at least one name and fit on a court.
fn validate_group(settings: &BoardSettings, group: &Group) -> Result<(), CourtError> {
    if group.is_empty() {
        return Err(CourtError::EmptyGroup);
    }
    if group.len() > settings.players_per_court {
        return Err(CourtError::GroupTooLarge {
            max: settings.players_per_court,
            size: group.len(),
        });
    }
    Ok(())
}

/// Append a group to the back of a court's queue. Names are trimmed and blank names dropped.
pub fn enqueue<I, S>(board: &Board, court: &CourtRef, names: I) -> Result<Board, CourtError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let i = board.court_index(court)?;
    let group = Group::from_names(names);
    validate_group(&board.settings, &group)?;
    let mut next = board.clone();
    next.courts[i].queue.push(group);
    Ok(next)
}

fn check_queue_index(board: &Board, court: usize, index: usize) -> Result<(), CourtError> {
    let len = board.courts[court].queue.len();
    if index >= len {
        return Err(CourtError::QueueIndexOutOfRange { index, len });
    }
    Ok(())
}

/// Remove the queued group at `index`; later groups move up one place.
pub fn remove_from_queue(board: &Board, court: &CourtRef, index: usize) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    check_queue_index(board, i, index)?;
    let mut next = board.clone();
    next.courts[i].queue.remove(index);
    Ok(next)
}

/// Replace the queued group at `index` with the names parsed from `text`, keeping its place.
pub fn replace_queue_entry(
    board: &Board,
    court: &CourtRef,
    index: usize,
    text: &str,
) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    check_queue_index(board, i, index)?;
    let group = parse_group(text);
    validate_group(&board.settings, &group)?;
    let mut next = board.clone();
    next.courts[i].queue[index] = group;
    Ok(next)
}

/// Shuffle in place: walk from the last index down to 1, swapping each slot with a uniformly
/// chosen slot at or before it. Every permutation is equally likely.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Put a court's queue in a uniformly random order.
pub fn shuffle_queue<R: Rng + ?Sized>(
    board: &Board,
    court: &CourtRef,
    rng: &mut R,
) -> Result<Board, CourtError> {
    let i = board.court_index(court)?;
    let mut next = board.clone();
    fisher_yates(&mut next.courts[i].queue, rng);
    Ok(next)
}

//! Integration tests for queue edits: enqueue, remove, replace, shuffle.

use court_queue_web::logic::fisher_yates;
use court_queue_web::{
    enqueue, remove_from_queue, replace_queue_entry, shuffle_queue, Board, CourtError, CourtRef,
    ErrorKind, Group,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

fn board_with_queue(groups: &[&[&str]]) -> Board {
    let mut board = Board::default();
    for g in groups {
        board = enqueue(&board, &CourtRef::Index(0), g.iter()).unwrap();
    }
    board
}

#[test]
fn enqueue_appends_trimmed_group() {
    let board = board_with_queue(&[&["Ann", "Bob"]]);
    let next = enqueue(&board, &CourtRef::Index(0), [" Cat ", "", "Dan"]).unwrap();
    let queue = &next.courts[0].queue;
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[1], Group::from_names(["Cat", "Dan"]));
    assert!(!next.courts[0].is_active());
    assert!(!next.courts[0].is_running);
}

#[test]
fn blank_group_is_rejected_and_board_unchanged() {
    let board = board_with_queue(&[&["Ann"]]);
    let before = serde_json::to_string(&board).unwrap();
    let err = enqueue(&board, &CourtRef::Index(0), ["  ", "\t", ""]).unwrap_err();
    assert_eq!(err, CourtError::EmptyGroup);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(serde_json::to_string(&board).unwrap(), before);
}

#[test]
fn group_larger_than_a_court_is_rejected() {
    let board = Board::default();
    let err = enqueue(&board, &CourtRef::Index(0), ["A", "B", "C", "D", "E"]).unwrap_err();
    assert_eq!(err, CourtError::GroupTooLarge { max: 4, size: 5 });
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn enqueue_then_remove_first_restores_empty_queue() {
    let board = Board::default();
    let added = enqueue(&board, &CourtRef::Index(2), ["Ann"]).unwrap();
    let removed = remove_from_queue(&added, &CourtRef::Index(2), 0).unwrap();
    assert_eq!(removed, board);
}

#[test]
fn remove_shifts_later_entries_left() {
    let board = board_with_queue(&[&["A"], &["B"], &["C"]]);
    let next = remove_from_queue(&board, &CourtRef::Index(0), 1).unwrap();
    assert_eq!(
        next.courts[0].queue,
        vec![Group::from_names(["A"]), Group::from_names(["C"])]
    );
}

#[test]
fn remove_out_of_range_is_an_index_error() {
    let board = board_with_queue(&[&["A"]]);
    let err = remove_from_queue(&board, &CourtRef::Index(0), 2).unwrap_err();
    assert_eq!(err, CourtError::QueueIndexOutOfRange { index: 2, len: 1 });
    assert_eq!(err.kind(), ErrorKind::Index);
}

#[test]
fn replace_keeps_position() {
    let board = board_with_queue(&[&["A"], &["B"], &["C"]]);
    let next = replace_queue_entry(&board, &CourtRef::Index(0), 1, " Bea , ,Ben ").unwrap();
    assert_eq!(next.courts[0].queue[1], Group::from_names(["Bea", "Ben"]));
    assert_eq!(next.courts[0].queue[0], Group::from_names(["A"]));
    assert_eq!(next.courts[0].queue[2], Group::from_names(["C"]));
}

#[test]
fn replace_with_nothing_or_bad_index_fails() {
    let board = board_with_queue(&[&["A"]]);
    assert_eq!(
        replace_queue_entry(&board, &CourtRef::Index(0), 0, " , ,"),
        Err(CourtError::EmptyGroup)
    );
    assert_eq!(
        replace_queue_entry(&board, &CourtRef::Index(0), 1, "Zed"),
        Err(CourtError::QueueIndexOutOfRange { index: 1, len: 1 })
    );
}

#[test]
fn courts_are_addressed_by_name() {
    let board = Board::default();
    let next = enqueue(&board, &CourtRef::from("court 2"), ["Ann"]).unwrap();
    assert_eq!(next.courts[1].queue.len(), 1);
    let err = enqueue(&board, &CourtRef::from("Far"), ["Ann"]).unwrap_err();
    assert!(matches!(err, CourtError::CourtNotFound(CourtRef::Name(_))));
    assert!(matches!(
        enqueue(&board, &CourtRef::Index(3), ["Ann"]),
        Err(CourtError::CourtNotFound(CourtRef::Index(3)))
    ));
}

#[test]
fn shuffle_preserves_groups() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in 0..=6 {
        let names: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
        let mut board = Board::default();
        for name in &names {
            board = enqueue(&board, &CourtRef::Index(0), [name]).unwrap();
        }
        let shuffled = shuffle_queue(&board, &CourtRef::Index(0), &mut rng).unwrap();
        let mut before: Vec<_> = board.courts[0].queue.clone();
        let mut after: Vec<_> = shuffled.courts[0].queue.clone();
        before.sort_by(|a, b| a.players().cmp(b.players()));
        after.sort_by(|a, b| a.players().cmp(b.players()));
        assert_eq!(before, after, "n = {n}");
    }
}

#[test]
fn shuffle_is_unbiased() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut counts: HashMap<Vec<u8>, u32> = HashMap::new();
    for _ in 0..6000 {
        let mut items = vec![0u8, 1, 2];
        fisher_yates(&mut items, &mut rng);
        *counts.entry(items).or_default() += 1;
    }
    assert_eq!(counts.len(), 6);
    for (perm, count) in &counts {
        assert!((850..=1150).contains(count), "{perm:?} seen {count} times");
    }
}

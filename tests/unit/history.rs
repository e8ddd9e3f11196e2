use super::*;
use crate::foundation::core::{Point, Rgba8};
use crate::stroke::model::VectorStroke;

fn set_of(n: usize) -> StrokeSet {
    (0..n)
        .map(|i| {
            VectorStroke::new(
                vec![Point::new(i as f64, 0.0), Point::new(i as f64, 10.0)],
                i as f64,
                Rgba8::BLACK,
                3.0,
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn empty_stack_is_inert() {
    let mut h = HistoryStack::default();
    assert!(h.is_empty());
    assert!(h.undo().is_none());
    assert!(h.redo().is_none());
    assert!(h.current().is_none());
}

#[test]
fn undo_redo_walk_snapshots() {
    let mut h = HistoryStack::default();
    h.snapshot(&set_of(0));
    h.snapshot(&set_of(1));
    h.snapshot(&set_of(2));
    assert_eq!(h.index(), 2);

    assert_eq!(h.undo().unwrap(), set_of(1));
    assert_eq!(h.undo().unwrap(), set_of(0));
    assert!(h.undo().is_none());
    assert_eq!(h.index(), 0);

    assert_eq!(h.redo().unwrap(), set_of(1));
    assert_eq!(h.redo().unwrap(), set_of(2));
    assert!(h.redo().is_none());
}

#[test]
fn undo_then_redo_restores_equal_set() {
    let mut h = HistoryStack::default();
    h.snapshot(&set_of(0));
    h.snapshot(&set_of(3));
    let before = h.current().unwrap().clone();
    h.undo().unwrap();
    assert_eq!(h.redo().unwrap(), before);
}

#[test]
fn new_action_truncates_future() {
    let mut h = HistoryStack::default();
    h.snapshot(&set_of(0));
    h.snapshot(&set_of(1));
    h.snapshot(&set_of(2));
    h.undo();
    h.undo();
    h.snapshot(&set_of(5));
    assert_eq!(h.len(), 2);
    assert!(!h.can_redo());
    assert_eq!(h.current().unwrap(), &set_of(5));
    assert_eq!(h.undo().unwrap(), set_of(0));
}

#[test]
fn capacity_evicts_oldest() {
    let mut h = HistoryStack::default();
    h.snapshot(&set_of(0));
    for i in 1..=MAX_HISTORY + 5 {
        h.snapshot(&set_of(i));
    }
    assert_eq!(h.len(), MAX_HISTORY);
    assert_eq!(h.index(), MAX_HISTORY - 1);

    let mut undos = 0;
    while h.undo().is_some() {
        undos += 1;
    }
    assert_eq!(undos, MAX_HISTORY - 1);
    assert_eq!(h.current().unwrap().len(), 6);
}

#[test]
fn snapshots_are_independent_copies() {
    let mut h = HistoryStack::new(4);
    let mut live = set_of(1);
    h.snapshot(&live);
    live.push(set_of(2).as_slice()[1].clone());
    assert_eq!(h.current().unwrap().len(), 1);
}

#[test]
fn zero_capacity_keeps_one_snapshot() {
    let mut h = HistoryStack::new(0);
    h.snapshot(&set_of(1));
    h.snapshot(&set_of(2));
    assert_eq!(h.len(), 1);
    assert_eq!(h.index(), 0);
}

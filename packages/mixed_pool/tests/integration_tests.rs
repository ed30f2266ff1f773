//! Integration tests for the `mixed_pool` package.
//!
//! These exercise the public API of `MixedPool` from the outside: positional addressing,
//! exact type checks, removal renumbering and the failure modes of every operation.

#![allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]

use std::fmt::Debug;

use mixed_pool::{DropPolicy, Error, MixedPool};

#[derive(Clone, Debug, PartialEq)]
struct Position {
    x: i64,
    y: i64,
}

#[derive(Clone, Debug, PartialEq)]
struct TaggedPosition(Position);

fn assert_out_of_range<T: Debug>(result: Result<T, Error>, expected_index: usize) {
    match result {
        Err(Error::IndexOutOfRange { index, .. }) => assert_eq!(index, expected_index),
        other => panic!("expected IndexOutOfRange for index {expected_index}, got {other:?}"),
    }
}

fn assert_type_mismatch<T: Debug>(result: Result<T, Error>, expected_index: usize) {
    match result {
        Err(Error::TypeMismatch { index, .. }) => assert_eq!(index, expected_index),
        other => panic!("expected TypeMismatch for index {expected_index}, got {other:?}"),
    }
}

#[test]
fn mixed_types_scenario() {
    let pool = MixedPool::new();

    pool.add(42_i32);
    pool.add("hi".to_string());
    pool.add(2.5_f64);

    assert_eq!(pool.len(), 3);
    assert_eq!(*pool.get::<i32>(0).unwrap(), 42);
    assert_eq!(*pool.get::<String>(1).unwrap(), "hi");
    assert_type_mismatch(pool.get::<i32>(1), 1);

    pool.remove(0).unwrap();

    assert_eq!(pool.len(), 2);
    assert_eq!(*pool.get::<String>(0).unwrap(), "hi");
    assert_eq!(pool.get_cloned::<f64>(1).unwrap().to_bits(), 2.5_f64.to_bits());
}

#[test]
fn newly_added_value_is_readable_only_as_its_own_type() {
    let pool = MixedPool::new();
    pool.add(1_u8);
    pool.add("padding");

    let position = Position { x: 3, y: -4 };
    let index = pool.add(position.clone());

    assert_eq!(index, 2);
    assert_eq!(*pool.get::<Position>(index).unwrap(), position);

    assert_type_mismatch(pool.get::<TaggedPosition>(index), index);
    assert_type_mismatch(pool.get::<(i64, i64)>(index), index);
    assert_type_mismatch(pool.get::<Box<Position>>(index), index);
    assert_type_mismatch(pool.get::<u8>(index), index);
}

#[test]
fn wrapper_type_is_distinct_from_wrapped_type() {
    let pool = MixedPool::new();
    pool.add(TaggedPosition(Position { x: 0, y: 0 }));

    assert!(pool.is::<TaggedPosition>(0).unwrap());
    assert!(!pool.is::<Position>(0).unwrap());
    assert_type_mismatch(pool.get::<Position>(0), 0);
}

#[test]
fn type_mismatch_reports_both_type_names() {
    let pool = MixedPool::new();
    pool.add(Position { x: 1, y: 2 });

    let error = pool.get::<u32>(0).unwrap_err();

    assert_eq!(
        error,
        Error::TypeMismatch {
            index: 0,
            requested: "u32",
            stored: std::any::type_name::<Position>(),
        }
    );
}

#[test]
fn every_index_past_the_end_is_out_of_range() {
    let pool = MixedPool::new();
    for i in 0..3_u16 {
        pool.add(i);
    }

    for index in [3, 4, 100, usize::MAX] {
        assert_out_of_range(pool.get::<u16>(index), index);
        assert_out_of_range(pool.get::<String>(index), index);
        assert_out_of_range(pool.get_mut::<u16>(index), index);
        assert_out_of_range(pool.get_cloned::<u16>(index), index);
        assert_out_of_range(pool.take::<u16>(index), index);
        assert_out_of_range(pool.is::<u16>(index), index);
        assert_out_of_range(pool.type_name_at(index), index);
        assert_out_of_range(pool.remove(index), index);
    }

    assert_eq!(pool.len(), 3);
}

#[test]
fn empty_pool_rejects_index_zero() {
    let pool = MixedPool::new();

    assert_eq!(
        pool.get::<u8>(0).unwrap_err(),
        Error::IndexOutOfRange { index: 0, len: 0 }
    );
    assert_eq!(
        pool.remove(0).unwrap_err(),
        Error::IndexOutOfRange { index: 0, len: 0 }
    );
}

#[test]
fn remove_renumbers_only_later_entries() {
    let pool = MixedPool::new();
    let labels = ["a", "b", "c", "d", "e", "f"];
    for label in labels {
        pool.add(label.to_string());
    }

    let removed_at = 2;
    pool.remove(removed_at).unwrap();

    assert_eq!(pool.len(), labels.len() - 1);

    for (index, expected) in labels.iter().enumerate().take(removed_at) {
        assert_eq!(*pool.get::<String>(index).unwrap(), *expected);
    }

    for index in removed_at..labels.len() - 1 {
        assert_eq!(*pool.get::<String>(index).unwrap(), labels[index + 1]);
    }
}

#[test]
fn removing_front_repeatedly_drains_in_order() {
    let pool = MixedPool::new();
    pool.add(1_u8);
    pool.add(2_u16);
    pool.add(3_u32);

    assert_eq!(pool.take::<u8>(0).unwrap(), 1);
    assert_eq!(pool.take::<u16>(0).unwrap(), 2);
    assert_eq!(pool.take::<u32>(0).unwrap(), 3);
    assert!(pool.is_empty());
}

#[test]
fn clear_invalidates_every_index() {
    let pool = MixedPool::new();
    for i in 0..10_u64 {
        pool.add(i);
    }

    pool.clear();

    assert_eq!(pool.len(), 0);
    assert!(pool.type_names().is_empty());
    for index in 0..10 {
        assert_out_of_range(pool.get::<u64>(index), index);
    }

    // New entries start again from index zero.
    assert_eq!(pool.add("fresh"), 0);
    assert_eq!(*pool.get::<&str>(0).unwrap(), "fresh");
}

#[test]
fn get_mut_changes_are_visible_to_later_reads() {
    let pool = MixedPool::new();
    pool.add(Position { x: 0, y: 0 });

    {
        let mut position = pool.get_mut::<Position>(0).unwrap();
        position.x = 10;
        position.y = 20;
    }

    assert_eq!(*pool.get::<Position>(0).unwrap(), Position { x: 10, y: 20 });
}

#[test]
fn fallible_construction_is_all_or_nothing() {
    #[derive(Debug, PartialEq)]
    struct Rejected;

    fn build(accept: bool) -> Result<Position, Rejected> {
        if accept {
            Ok(Position { x: 1, y: 1 })
        } else {
            Err(Rejected)
        }
    }

    let pool = MixedPool::new();

    assert_eq!(pool.try_add_with(|| build(false)), Err(Rejected));
    assert!(pool.is_empty());

    assert_eq!(pool.try_add_with(|| build(true)), Ok(0));
    assert_eq!(pool.len(), 1);
}

#[test]
fn type_names_describe_contents() {
    let pool = MixedPool::builder().capacity(4).build();
    pool.add(1_i32);
    pool.add(String::new());

    assert_eq!(
        pool.type_names(),
        ["i32", std::any::type_name::<String>()]
    );
    assert_eq!(pool.type_name_at(0).unwrap(), "i32");
}

#[test]
fn must_not_drop_items_pool_can_be_drained_and_dropped() {
    let pool = MixedPool::builder()
        .drop_policy(DropPolicy::MustNotDropItems)
        .build();

    pool.add(1_u8);
    pool.add(2_u8);

    let _first = pool.take::<u8>(0).unwrap();
    pool.clear();

    drop(pool);
}

#[test]
fn pool_can_be_moved_with_contents() {
    let pool = MixedPool::new();
    pool.add("moved".to_string());

    let moved = Box::new(pool);

    assert_eq!(*moved.get::<String>(0).unwrap(), "moved");
}

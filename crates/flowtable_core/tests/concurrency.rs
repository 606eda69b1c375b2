//! Concurrent access to shared tables.

use flowtable_core::{ColumnSpec, Datum, FlowConfig, Table, TypeTag};
use flowtable_testkit::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_writers_on_one_row() {
    init_tracing();
    let table = Table::new("shared", FlowConfig::new()).unwrap();
    for i in 0..4 {
        table
            .add_column(ColumnSpec::new(format!("c{i}"), TypeTag::Long))
            .unwrap();
    }
    let row = table.new_row().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let row = row.clone();
            thread::spawn(move || {
                for n in 0..500i64 {
                    row.set_value(format!("c{i}").as_str(), n).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for i in 0..4 {
        assert_eq!(
            row.get_value(format!("c{i}").as_str()).unwrap(),
            Some(Datum::Long(499))
        );
    }
}

#[test]
fn readers_see_whole_commits() {
    init_tracing();
    let table = Arc::new(keyed_table(None));
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let table = Arc::clone(&table);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut last = 0;
            while !done.load(Ordering::Acquire) {
                let count = table.row_count();
                // Batches are committed ten rows at a time.
                assert_eq!(count % 10, 0);
                assert!(count >= last);
                last = count;
            }
        })
    };

    for batch in 0..20 {
        for i in 0..10 {
            insert_key(&table, batch * 10 + i);
        }
        table.commit().unwrap();
    }
    done.store(true, Ordering::Release);
    reader.join().unwrap();

    assert_eq!(table.row_count(), 200);
    assert_eq!(table.key_count(), 200);
}

#[test]
fn schema_changes_race_row_creation() {
    let table = plain_table(None);
    let extra = table
        .add_column(ColumnSpec::new("extra", TypeTag::String).default("x"))
        .unwrap();

    let writer = {
        let table = table.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                table.new_row().unwrap();
            }
        })
    };
    table.remove_column(&extra).unwrap();
    writer.join().unwrap();

    assert_eq!(table.row_count(), 200);
    assert!(!extra.is_attached());
    assert!(table.slice_column("extra").is_err());
    for row in table.rows() {
        assert_eq!(row.value_count(), 1);
    }
}

#[test]
fn stats_count_across_threads() {
    let table = plain_table(Some(50));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let table = table.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    table.new_row().unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stats = table.stats().snapshot();
    assert_eq!(stats.rows_created, 400);
    assert_eq!(stats.rows_evicted, 350);
    assert_eq!(table.row_count(), 50);
}

//! End-to-end table scenarios.

use flowtable_core::{ColumnSpec, Datum, Decimal, FlowConfig, FlowError, RowStatus, Table, TypeTag};
use flowtable_testkit::prelude::*;

#[test]
fn committed_row_carries_the_column_default() {
    with_keyed_table(None, |t| {
        let row = t.new_row().unwrap();
        row.set_value("id", 1).unwrap();
        t.commit().unwrap();

        assert_eq!(t.row_count(), 1);
        assert_eq!(
            t.row(0).unwrap().get_value("name").unwrap(),
            Some(Datum::from("foo"))
        );
        assert_eq!(row.status(), RowStatus::Committed);
        assert!(row.present_in_table());
    });
}

#[test]
fn repeated_key_is_rejected() {
    with_keyed_table(None, |t| {
        insert_key(t, 1);
        t.commit().unwrap();

        insert_key(t, 1);
        let err = t.commit().unwrap_err();
        assert!(matches!(err, FlowError::DuplicateKey { ref key, .. } if key == "(1)"));
        assert_eq!(t.row_count(), 1);
        assert_eq!(t.key_count(), 1);
        assert_eq!(t.stats().duplicate_key_rejections(), 1);
    });
}

#[test]
fn text_default_is_coerced() {
    let t = Table::new("t", FlowConfig::new()).unwrap();
    let x = t
        .add_column(ColumnSpec::new("x", TypeTag::Integer).default("5"))
        .unwrap();
    assert_eq!(x.default_value(), Some(&Datum::Integer(5)));

    let row = t.new_row().unwrap();
    assert_eq!(row.get_value("x").unwrap(), Some(Datum::Integer(5)));
    assert!(row.value("x").unwrap().unwrap().is_column_default());
}

#[test]
fn eviction_frees_keys() {
    with_keyed_table(Some(1), |t| {
        insert_key(t, 1);
        t.commit().unwrap();
        let b = insert_key(t, 2);
        t.commit().unwrap();
        let c = insert_key(t, 1);
        let outcome = t.commit().unwrap();

        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.evicted, 1);
        assert_eq!(t.row_count(), 1);
        assert_eq!(t.rows(), vec![c]);
        assert_eq!(b.status(), RowStatus::Detached);
        assert!(!b.present_in_table());
    });
}

#[test]
fn failed_commit_can_be_fixed_and_retried() {
    with_keyed_table(None, |t| {
        insert_key(t, 1);
        t.commit().unwrap();

        let dup = insert_key(t, 1);
        assert!(t.commit().is_err());
        assert_eq!(t.draft_count(), 1);

        dup.set_value("id", 2).unwrap();
        t.commit().unwrap();
        assert_eq!(scenarios::committed_ids(t), vec![1, 2]);
    });
}

#[test]
fn updates_to_committed_rows_wait_for_commit() {
    with_keyed_table(None, |t| {
        let row = insert_key(t, 7);
        t.commit().unwrap();

        row.set_value("name", "bar").unwrap();
        assert_eq!(row.get_value("name").unwrap(), Some("foo".into()));
        assert_eq!(row.get_latest("name").unwrap(), Some("bar".into()));
        assert!(matches!(
            row.set_value("id", 8),
            Err(FlowError::KeyColumnImmutable { .. })
        ));

        let outcome = t.commit().unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.inserted, 0);
        assert_eq!(row.get_value("name").unwrap(), Some("bar".into()));
    });
}

#[test]
fn truncate_then_refill() {
    let t = scenarios::populated_table(3, None);
    t.truncate();
    assert!(t.is_truncate_pending());
    assert_eq!(t.row_count(), 3);

    insert_key(&t, 0);
    let outcome = t.commit().unwrap();
    assert_eq!(outcome.truncated, Some(3));
    assert_eq!(t.row_count(), 0);

    // The row queued after the truncate lands on the next commit.
    t.commit().unwrap();
    assert_eq!(scenarios::committed_ids(&t), vec![0]);
}

#[test]
fn mixed_type_row_renders() {
    let t = customers_table();
    let row = t.new_row().unwrap();
    row.set_value("id", 42i64).unwrap();
    row.set_value("name", "Ada").unwrap();
    row.set_value("joined", "2024-03-01").unwrap();
    row.set_value("tags", Datum::list(["a", "b"])).unwrap();
    row.set_value("extra", "blob").unwrap();
    t.commit().unwrap();

    let text = row.to_string();
    assert!(text.starts_with("{Row flow=customers, id=42 (Long - PK), name='Ada' (String)"));
    assert!(text.contains(", tags=[a, b] (List)"));
    assert!(text.ends_with(", extra='blob' (Object)}"));
    assert_eq!(row.get_value("balance").unwrap(), Some(Datum::from(Decimal::new(0, 2))));
    assert_eq!(row.get_value("tier").unwrap(), Some(Datum::Character('B')));
}

#[test]
fn plain_table_writes_are_immediate() {
    let t = plain_table(Some(2));
    let first = t.new_row().unwrap();
    first.set_value("n", "41").unwrap();
    assert_eq!(t.slice_column("n").unwrap(), vec![Datum::Integer(41)]);

    t.new_row().unwrap();
    t.new_row().unwrap();
    assert_eq!(t.row_count(), 2);
    assert_eq!(first.status(), RowStatus::Detached);
    assert!(t.commit().unwrap().is_empty());
    assert_eq!(t.rollback(), 0);
}

#[test]
fn nan_keys_collide() {
    let t = Table::new("m", FlowConfig::new().transactional(true).max_size(1)).unwrap();
    t.add_column(ColumnSpec::new("k", TypeTag::Double).key()).unwrap();

    let first = t.new_row().unwrap();
    first.set_value("k", f64::NAN).unwrap();
    t.commit().unwrap();

    let second = t.new_row().unwrap();
    second.set_value("k", "NaN").unwrap();
    let err = t.commit().unwrap_err();
    assert!(matches!(err, FlowError::DuplicateKey { ref key, .. } if key == "(NaN)"));
    assert_eq!(t.row_count(), 1);
    assert_eq!(t.key_count(), 1);

    // Evicting the NaN row releases its key.
    t.rollback();
    let other = t.new_row().unwrap();
    other.set_value("k", 1.0).unwrap();
    t.commit().unwrap();
    assert_eq!(t.key_count(), 1);

    let again = t.new_row().unwrap();
    again.set_value("k", f64::NAN).unwrap();
    t.commit().unwrap();
    assert_eq!(t.rows(), vec![again]);
    assert_eq!(t.key_count(), 1);
}

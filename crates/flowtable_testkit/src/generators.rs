//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use chrono::{TimeZone, Utc};
use flowtable_core::{Datum, Decimal, FlowConfig, TypeTag};
use proptest::prelude::*;

/// Types whose values have a text form that parses back.
pub const TEXT_TYPES: [TypeTag; 12] = [
    TypeTag::String,
    TypeTag::Boolean,
    TypeTag::Byte,
    TypeTag::ByteArray,
    TypeTag::Character,
    TypeTag::Date,
    TypeTag::Double,
    TypeTag::Float,
    TypeTag::Integer,
    TypeTag::Long,
    TypeTag::Short,
    TypeTag::BigDecimal,
];

/// Strategy for generating a type with a text round trip.
pub fn type_tag_strategy() -> impl Strategy<Value = TypeTag> {
    prop::sample::select(TEXT_TYPES.to_vec())
}

/// Strategy for generating valid column names.
pub fn column_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating a datum of the given type.
///
/// Floats lean on the edge values (NaN, signed zeros, infinities);
/// dates fall between 1970 and 2100.
pub fn datum_strategy(tag: TypeTag) -> BoxedStrategy<Datum> {
    match tag {
        TypeTag::String | TypeTag::Object => any::<String>().prop_map(Datum::String).boxed(),
        TypeTag::Boolean => any::<bool>().prop_map(Datum::Boolean).boxed(),
        TypeTag::Byte => any::<i8>().prop_map(Datum::Byte).boxed(),
        TypeTag::Short => any::<i16>().prop_map(Datum::Short).boxed(),
        TypeTag::Integer => any::<i32>().prop_map(Datum::Integer).boxed(),
        TypeTag::Long => any::<i64>().prop_map(Datum::Long).boxed(),
        TypeTag::Float => prop_oneof![
            8 => any::<f32>(),
            1 => Just(f32::NAN),
            1 => Just(0.0f32),
            1 => Just(-0.0f32),
            1 => Just(f32::INFINITY),
        ]
        .prop_map(Datum::Float)
        .boxed(),
        TypeTag::Double => prop_oneof![
            8 => any::<f64>(),
            1 => Just(f64::NAN),
            1 => Just(0.0f64),
            1 => Just(-0.0f64),
            1 => Just(f64::NEG_INFINITY),
        ]
        .prop_map(Datum::Double)
        .boxed(),
        TypeTag::Character => any::<char>().prop_map(Datum::Character).boxed(),
        TypeTag::ByteArray => prop::collection::vec(any::<u8>(), 0..32)
            .prop_map(Datum::ByteArray)
            .boxed(),
        TypeTag::Date => (0i64..4_102_444_800, 0u32..1000)
            .prop_filter_map("valid timestamp", |(secs, millis)| {
                Utc.timestamp_opt(secs, millis * 1_000_000).single()
            })
            .prop_map(Datum::Date)
            .boxed(),
        TypeTag::BigDecimal => (any::<i64>(), 0u8..=12)
            .prop_map(|(v, scale)| Datum::BigDecimal(Decimal::new(i128::from(v), scale)))
            .boxed(),
        TypeTag::List => prop::collection::vec(any::<i32>().prop_map(Datum::Integer), 0..8)
            .prop_map(Datum::List)
            .boxed(),
    }
}

/// Strategy for generating a type together with a datum of that type.
pub fn typed_datum_strategy() -> impl Strategy<Value = (TypeTag, Datum)> {
    type_tag_strategy().prop_flat_map(|tag| datum_strategy(tag).prop_map(move |d| (tag, d)))
}

/// Strategy for generating table configurations.
pub fn flow_config_strategy() -> impl Strategy<Value = FlowConfig> {
    (prop::option::of(1usize..16), any::<bool>(), any::<bool>()).prop_map(
        |(max_size, transactional, autosave)| FlowConfig {
            max_size,
            transactional,
            autosave,
        },
    )
}

/// An operation against a keyed table.
#[derive(Debug, Clone)]
pub enum TableOp {
    /// Queue a new row with this key.
    Insert {
        /// Key value.
        id: i32,
    },
    /// Commit pending rows.
    Commit,
    /// Discard pending rows.
    Rollback,
    /// Request a truncate.
    Truncate,
}

/// Strategy for generating a sequence of table operations.
///
/// Keys are drawn from a small range so duplicates are common.
pub fn table_ops_strategy(max_ops: usize) -> impl Strategy<Value = Vec<TableOp>> {
    let op = prop_oneof![
        6 => (0i32..8).prop_map(|id| TableOp::Insert { id }),
        4 => Just(TableOp::Commit),
        1 => Just(TableOp::Rollback),
        1 => Just(TableOp::Truncate),
    ];
    prop::collection::vec(op, 0..max_ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn datums_match_their_type((tag, datum) in typed_datum_strategy()) {
            prop_assert_eq!(datum.type_tag(), Some(tag));
        }

        #[test]
        fn column_names_are_not_blank(name in column_name_strategy()) {
            prop_assert!(!name.trim().is_empty());
        }
    }
}

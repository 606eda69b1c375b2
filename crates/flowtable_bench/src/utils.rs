//! Benchmark utilities.

use flowtable_core::{ColumnSpec, FlowConfig, Table, TypeTag};
use rand::seq::SliceRandom;
use rand::Rng;

/// Generate random printable text of the specified length.
pub fn random_text(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Generate a batch of distinct ids in shuffled order.
pub fn generate_ids(count: usize) -> Vec<i64> {
    let mut ids: Vec<i64> = (0..count as i64).collect();
    ids.shuffle(&mut rand::thread_rng());
    ids
}

/// Create a bench table: `id: Long`, `name: String`, `score: Double`.
///
/// `id` is the key on transactional tables.
pub fn bench_table(config: FlowConfig) -> Table {
    let keyed = config.transactional;
    let table = Table::new("bench", config).expect("table");
    table
        .add_column(ColumnSpec::new("id", TypeTag::Long).is_key(keyed))
        .expect("id column");
    table
        .add_column(ColumnSpec::new("name", TypeTag::String).default("anon"))
        .expect("name column");
    table
        .add_column(ColumnSpec::new("score", TypeTag::Double))
        .expect("score column");
    table
}

/// Queue one row per id with random payload columns.
pub fn populate(table: &Table, ids: &[i64]) {
    let mut rng = rand::thread_rng();
    for &id in ids {
        let row = table.new_row().expect("row");
        row.set_value("id", id).expect("id");
        row.set_value("name", random_text(12)).expect("name");
        row.set_value("score", rng.gen::<f64>()).expect("score");
    }
}

pub mod coercion;
pub mod json;
pub mod table;

pub use coercion::{Coerced, coerce_numeric};
pub use json::write_json;
pub use table::{
    RawTable, dataset_from_table, read_dataset, read_raw_table, write_correlations, write_dataset,
};

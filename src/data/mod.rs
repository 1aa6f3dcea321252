//! Data access: per-column streaming IO, whole-table loading, schema checks

pub mod columns;
pub mod loader;
pub mod schema;

pub use columns::{
    column_mapping, combine_columns, read_column_values, read_string_column, write_single_column,
    write_string_column,
};
pub use loader::{convert_to_parquet, feature_matrix, load_csv, load_parquet, target_vector};
pub use schema::validate_schemas;

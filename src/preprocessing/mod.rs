//! Column-wise preprocessing

pub mod features;
pub mod pipeline;

pub use features::apply_feature_engineering;
pub use pipeline::{ColumnPipeline, ColumnStats, ProcessedTables};

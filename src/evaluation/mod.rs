//! Model evaluation

pub mod metrics;

pub use metrics::{
    accuracy_score, f1_score, precision_score, recall_score, roc_auc_score,
    ClassificationMetrics,
};

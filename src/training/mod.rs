//! Model training
//!
//! The fixed classifier roster, stratified cross-validation, model
//! comparison, and hyperparameter search.

pub mod boosted_trees;
pub mod comparison;
pub mod cross_validation;
pub mod gradient_boosting;
pub mod knn;
pub mod linear;
pub mod logistic;
pub mod models;
pub mod naive_bayes;
pub mod neural_network;
pub mod random_forest;
pub mod svm;
pub mod tree;
pub mod tuning;

pub use boosted_trees::{BoostedTreesClassifier, BoostedTreesConfig};
pub use comparison::{compare_models, evaluate_model, ComparisonTable, ModelScore};
pub use cross_validation::{run_cv, run_cv_with, CvSplit, FoldResult, StratifiedKFold};
pub use gradient_boosting::{GbmClassifier, GbmConfig};
pub use knn::KnnClassifier;
pub use linear::LinearModel;
pub use logistic::LogisticRegression;
pub use models::{Classifier, ModelKind};
pub use naive_bayes::GaussianNaiveBayes;
pub use neural_network::{MlpClassifier, MlpConfig};
pub use random_forest::RandomForestClassifier;
pub use svm::SvmClassifier;
pub use tree::{RegressionTree, TreeConfig};
pub use tuning::{tune_boosted_trees, TuningResult};

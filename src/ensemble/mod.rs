//! Prediction blending

pub mod blender;

pub use blender::{blend_submissions, BlendOutcome};

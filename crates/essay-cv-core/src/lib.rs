//! Essay CV Core Library
//!
//! Rubric-aware score scaling, agreement metrics and k-fold cross-validation
//! for multi-trait automated essay scoring.

pub mod config;
pub mod cv;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod rubric;
pub mod scaling;

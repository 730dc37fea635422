//! Command implementations for essay-cv

pub mod output;
pub mod run;

//! Core domain types and logic.

pub mod price;
pub mod returns;
pub mod stats;
pub mod weights;
pub mod optimizer;
pub mod evaluation;
pub mod execution_plan;
pub mod metrics;
pub mod analysis;
pub mod universe;
pub mod config_validation;
pub mod error;

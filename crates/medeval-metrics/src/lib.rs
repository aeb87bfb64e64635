//! # medeval-metrics
//!
//! Statistics and persistence for evaluation runs.
//!
//! This crate provides:
//! - [`aggregate`]: summary statistics over a set of evaluation records
//! - [`ArtifactStore`]: atomic JSON artifacts for each pipeline stage

mod aggregator;
mod storage;

pub use aggregator::{aggregate, AggregateSummary, ScoreDistribution};
pub use storage::{
    ArtifactStore, DetailedResult, EvaluationFile, ResponsesFile, EVALUATION_FILE, PLAN_FILE,
    RESPONSES_FILE,
};

//! # medeval-core
//!
//! Core types for the medeval answer-quality evaluation pipeline.
//!
//! The pipeline is a strictly staged batch:
//!
//! - Corpus assembly produces [`TestCase`]s
//! - Response collection produces [`ResponseRecord`]s
//! - Rubric judging produces [`EvaluationRecord`]s
//! - Aggregation, failure mining and recommendations derive reports from those
//!
//! Every stage hands immutable values to the next one. Nothing here is mutated
//! after construction.

mod config;
mod error;
mod evaluation;
mod types;

pub use config::{EvalConfig, JudgeSettings, RunSettings, SubjectSettings, CONFIG_DIR};
pub use error::{EvalError, Result};
pub use evaluation::{
    DimensionScore, EvaluationPayload, EvaluationRecord, OverallAssessment, RubricScores,
    ScoredEvaluation, MAX_DIMENSION_SCORE, MAX_TOTAL_SCORE, PASS_THRESHOLD_PERCENT,
};
pub use types::*;

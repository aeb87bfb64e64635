//! # medeval-runner
//!
//! Runs the evaluation stages over a corpus:
//!
//! 1. [`ResponseCollector`] asks the subject system every question
//! 2. [`JudgingStage`] scores each answer through the rubric judge
//! 3. [`Pipeline`] chains both, aggregates, mines failures and persists
//!    every artifact
//!
//! Both per-case stages run behind a bounded worker pool. One case failing
//! never cancels its siblings, and results always come back in corpus order.

mod collector;
mod evaluate;
mod pipeline;

pub use collector::ResponseCollector;
pub use evaluate::JudgingStage;
pub use pipeline::{run_analysis, run_collection, run_judging, Pipeline, PipelineOutcome};

//! # medeval-judge
//!
//! Scores a (question, response) pair under a fixed five-dimension rubric by
//! delegating to an [`Oracle`](medeval_agent::Oracle), then parses the
//! oracle's reply into a [`ScoredEvaluation`](medeval_core::ScoredEvaluation).
//!
//! Judging never fails a batch: transport and parse problems come back as
//! error records.

mod extract;
mod judge;
mod rubric;

pub use extract::{extract_payload, parse_evaluation};
pub use judge::RubricJudge;
pub use rubric::render_prompt;

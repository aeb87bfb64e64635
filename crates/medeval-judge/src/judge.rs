//! Rubric judge

use medeval_agent::Oracle;
use medeval_core::{EvaluationRecord, Result, ScoredEvaluation};

use crate::extract::parse_evaluation;
use crate::rubric::render_prompt;

/// Judges single question/response pairs through an oracle
pub struct RubricJudge<O> {
    oracle: O,
}

impl<O: Oracle> RubricJudge<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Score a pair, surfacing transport and parse errors
    pub async fn score(&self, question: &str, response: &str) -> Result<ScoredEvaluation> {
        let prompt = render_prompt(question, response);
        tracing::debug!(prompt_chars = prompt.len(), "Rendered rubric prompt");

        let reply = self.oracle.judge(&prompt).await?;
        tracing::debug!(reply_chars = reply.len(), "Received judge reply");

        parse_evaluation(&reply)
    }

    /// Score a pair, folding any failure into an error record
    pub async fn evaluate(&self, question: &str, response: &str) -> EvaluationRecord {
        match self.score(question, response).await {
            Ok(eval) => {
                tracing::info!(
                    "Score: {:.1}% - {}",
                    eval.percentage(),
                    eval.recommended_action
                );
                EvaluationRecord::Scored(eval)
            }
            Err(e) => {
                tracing::warn!("Error during evaluation: {}", e);
                EvaluationRecord::error(e.to_string())
            }
        }
    }
}

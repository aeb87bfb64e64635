//! Judging stage

use medeval_agent::Oracle;
use medeval_core::{EvalError, EvaluationRecord, ResponseRecord, Result};
use medeval_judge::RubricJudge;
use medeval_metrics::DetailedResult;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Scores collected responses through the rubric judge
pub struct JudgingStage<O> {
    judge: Arc<RubricJudge<O>>,
    concurrency: usize,
}

impl<O: Oracle + 'static> JudgingStage<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            judge: Arc::new(RubricJudge::new(oracle)),
            concurrency: 1,
        }
    }

    /// Maximum in-flight oracle calls (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn judge(&self) -> &RubricJudge<O> {
        &self.judge
    }

    /// Judge every record, in input order
    ///
    /// Records without a response become error records without an oracle
    /// call. Oracle failures become error records for that case only.
    pub async fn evaluate(&self, records: &[ResponseRecord]) -> Result<Vec<DetailedResult>> {
        let total = records.len();
        info!("Evaluating {} responses", total);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();

        for (index, record) in records.iter().enumerate() {
            let response = match record.outcome() {
                Ok(response) => response.to_string(),
                Err(error) => {
                    warn!(
                        "[{}/{}] Skipping {}: no response",
                        index + 1,
                        total,
                        record.test_case_id()
                    );
                    let evaluation = EvaluationRecord::error(format!("no response: {}", error));
                    join_set.spawn(async move { (index, evaluation) });
                    continue;
                }
            };

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| EvalError::Other(format!("Judge pool closed: {}", e)))?;
            let judge = Arc::clone(&self.judge);
            let question = record.test_case().question.clone();
            let id = record.test_case_id().to_string();

            join_set.spawn(async move {
                let _permit = permit;
                info!("[{}/{}] Evaluating {}", index + 1, total, id);
                (index, judge.evaluate(&question, &response).await)
            });
        }

        let mut slots: Vec<Option<EvaluationRecord>> = vec![None; total];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, evaluation)) => slots[index] = Some(evaluation),
                Err(e) => warn!("Judge task failed: {}", e),
            }
        }

        Ok(records
            .iter()
            .zip(slots)
            .map(|(record, slot)| {
                let case = record.test_case();
                DetailedResult {
                    test_case_id: case.id.clone(),
                    question: case.question.clone(),
                    category: case.category.clone(),
                    response: record.outcome().ok().map(str::to_string),
                    evaluation: slot
                        .unwrap_or_else(|| EvaluationRecord::error("evaluation task aborted")),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medeval_agent::ScriptedOracle;
    use medeval_core::{Category, TestCase, Verdict};

    fn payload(score: u8, action: &str) -> String {
        let dim = format!("{{\"score\": {}, \"reasoning\": \"r\", \"issues\": []}}", score);
        format!(
            "{{\"medical_accuracy\": {d}, \"safety\": {d}, \"patient_friendliness\": {d}, \
             \"actionability\": {d}, \"scope_appropriateness\": {d}, \"recommended_action\": \"{a}\"}}",
            d = dim,
            a = action
        )
    }

    fn case(id: &str, question: &str) -> TestCase {
        TestCase::new(id, Category::Lifestyle, question)
    }

    #[tokio::test]
    async fn test_missing_response_skips_oracle() {
        let oracle = ScriptedOracle::new().with_reply("", payload(9, "PASS"));
        let stage = JudgingStage::new(oracle);

        let records = vec![
            ResponseRecord::success(case("a", "fiber?"), "Eat 25-30g daily."),
            ResponseRecord::failure(case("b", "bleeding?"), "connection refused"),
        ];
        let results = stage.evaluate(&records).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].evaluation.verdict(), Some(Verdict::Pass));
        assert_eq!(results[0].response.as_deref(), Some("Eat 25-30g daily."));

        assert!(results[1].response.is_none());
        assert_eq!(
            results[1].evaluation.error_message(),
            Some("no response: connection refused")
        );
        assert_eq!(stage.judge().oracle().calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_results_stay_in_order() {
        let oracle = ScriptedOracle::new()
            .with_reply("question 0", payload(10, "PASS"))
            .with_reply("question 1", payload(6, "REVISE"))
            .with_reply("question 2", payload(3, "FAIL"))
            .with_failure("question 3", "overloaded");
        let stage = JudgingStage::new(oracle).with_concurrency(4);

        let records: Vec<ResponseRecord> = (0..4)
            .map(|i| {
                ResponseRecord::success(
                    case(&format!("c{}", i), &format!("question {}", i)),
                    "answer",
                )
            })
            .collect();
        let results = stage.evaluate(&records).await.unwrap();

        let percentages: Vec<Option<f64>> =
            results.iter().map(|r| r.evaluation.percentage()).collect();
        assert_eq!(percentages, vec![Some(100.0), Some(60.0), Some(30.0), None]);
        assert_eq!(results[3].test_case_id, "c3");
        assert!(results[3].evaluation.is_error());
    }
}

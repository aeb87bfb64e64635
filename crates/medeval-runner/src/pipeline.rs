//! Staged pipeline
//!
//! Each stage consumes only the persisted output of the one before it, so
//! stages can run together through [`Pipeline::run`] or one at a time.

use medeval_agent::{Oracle, SubjectSystem};
use medeval_analysis::ImprovementPlan;
use medeval_core::{Result, TestCase};
use medeval_metrics::{ArtifactStore, EvaluationFile, ResponsesFile};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::collector::ResponseCollector;
use crate::evaluate::JudgingStage;

/// Everything a full run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub responses: ResponsesFile,
    pub evaluation: EvaluationFile,
    pub plan: ImprovementPlan,
}

/// Collect responses and persist them
pub async fn run_collection<S: SubjectSystem + 'static>(
    collector: &ResponseCollector<S>,
    cases: &[TestCase],
    store: &ArtifactStore,
) -> Result<ResponsesFile> {
    let responses = ResponsesFile::new(collector.collect(cases).await?);
    let path = store.save_responses(&responses).await?;
    info!(
        "Responses saved to {:?} ({} ok, {} failed)",
        path, responses.successful, responses.failed
    );
    Ok(responses)
}

/// Judge persisted responses and persist the evaluation
pub async fn run_judging<O: Oracle + 'static>(
    stage: &JudgingStage<O>,
    responses: &ResponsesFile,
    store: &ArtifactStore,
) -> Result<EvaluationFile> {
    let evaluation = EvaluationFile::new(stage.evaluate(&responses.results).await?);
    let path = store.save_evaluation(&evaluation).await?;
    info!(
        "Evaluation saved to {:?} (average {:.1}%, pass rate {:.1}%)",
        path, evaluation.summary.average_score, evaluation.summary.pass_rate
    );
    Ok(evaluation)
}

/// Build and persist the improvement plan for an evaluation
pub async fn run_analysis(
    evaluation: &EvaluationFile,
    store: &ArtifactStore,
) -> Result<ImprovementPlan> {
    let plan = ImprovementPlan::from_evaluation(evaluation);
    plan.save(store).await?;
    Ok(plan)
}

/// Full collection, judging and analysis run
pub struct Pipeline<S, O> {
    collector: ResponseCollector<S>,
    judging: JudgingStage<O>,
    store: ArtifactStore,
}

impl<S, O> Pipeline<S, O>
where
    S: SubjectSystem + 'static,
    O: Oracle + 'static,
{
    pub fn new(subject: S, oracle: O, store: ArtifactStore) -> Self {
        Self {
            collector: ResponseCollector::new(subject),
            judging: JudgingStage::new(oracle),
            store,
        }
    }

    /// Worker pool size for both per-case stages
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.collector = self.collector.with_concurrency(concurrency);
        self.judging = self.judging.with_concurrency(concurrency);
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn judging(&self) -> &JudgingStage<O> {
        &self.judging
    }

    /// Run every stage over `cases`, persisting each artifact
    pub async fn run(&self, cases: &[TestCase]) -> Result<PipelineOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id);

        async {
            info!("Starting evaluation of {} test cases", cases.len());

            info!("Phase 1: generating responses");
            let responses = run_collection(&self.collector, cases, &self.store).await?;

            info!("Phase 2: judging responses");
            let evaluation = run_judging(&self.judging, &responses, &self.store).await?;

            info!("Phase 3: mining failures");
            let plan = run_analysis(&evaluation, &self.store).await?;

            info!(
                "Evaluation complete: {} failures, {} recommendations, results in {:?}",
                plan.failure_analysis.total_failures,
                plan.recommendations.len(),
                self.store.dir()
            );

            Ok(PipelineOutcome {
                run_id,
                responses,
                evaluation,
                plan,
            })
        }
        .instrument(span)
        .await
    }
}

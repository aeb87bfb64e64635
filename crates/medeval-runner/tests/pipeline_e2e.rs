//! End-to-end pipeline runs against scripted collaborators

use async_trait::async_trait;
use medeval_agent::{ScriptedOracle, SubjectSystem};
use medeval_analysis::ImprovementPlan;
use medeval_core::{Category, EvalError, Result, TestCase, Verdict};
use medeval_metrics::{ArtifactStore, EVALUATION_FILE, PLAN_FILE, RESPONSES_FILE};
use medeval_runner::{run_analysis, Pipeline};
use tempfile::tempdir;

/// Answers every question, except ones mentioning "unreachable"
struct CannedSubject;

#[async_trait]
impl SubjectSystem for CannedSubject {
    async fn respond(&self, question: &str) -> Result<String> {
        if question.contains("unreachable") {
            return Err(EvalError::Generation("connection refused".to_string()));
        }
        Ok(format!("Here is some guidance about {}.", question))
    }
}

fn payload(score: u8, action: &str) -> String {
    let dim = format!(
        "{{\"score\": {}, \"reasoning\": \"r\", \"issues\": [\"Response is too vague\"]}}",
        score
    );
    format!(
        "Evaluation below.\n```json\n{{\"medical_accuracy\": {d}, \"safety\": {d}, \
         \"patient_friendliness\": {d}, \"actionability\": {d}, \"scope_appropriateness\": {d}, \
         \"overall_assessment\": {{\"total_score\": 999, \"percentage\": 1}}, \
         \"recommended_action\": \"{a}\"}}\n```",
        d = dim,
        a = action
    )
}

fn scripted_oracle() -> ScriptedOracle {
    ScriptedOracle::new()
        .with_reply("case-alpha", payload(9, "PASS"))
        .with_reply("case-bravo", payload(6, "REVISE"))
        .with_failure("case-charlie", "judge timed out")
}

fn corpus() -> Vec<TestCase> {
    vec![
        TestCase::new("a", Category::Lifestyle, "case-alpha: how much fiber?"),
        TestCase::new("b", Category::Anxiety, "case-bravo: is this cancer?"),
        TestCase::new("c", Category::WhenToSeeDoctor, "case-charlie: when do I go in?"),
    ]
}

#[tokio::test]
async fn test_mixed_run_summary() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("test_results"));
    let pipeline = Pipeline::new(CannedSubject, scripted_oracle(), store.clone());

    let outcome = pipeline.run(&corpus()).await.unwrap();
    let summary = &outcome.evaluation.summary;

    assert_eq!(summary.total_evaluated, 3);
    assert_eq!(summary.average_score, 75.0);
    assert_eq!(summary.passes, 1);
    assert_eq!(summary.revisions_needed, 1);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.score_distribution.excellent, 1);
    assert_eq!(summary.score_distribution.poor, 1);
    assert_eq!(summary.score_distribution.total(), 2);

    let analysis = &outcome.plan.failure_analysis;
    assert_eq!(analysis.total_failures, 2);
    assert_eq!(analysis.failures_in(&Category::Anxiety), 1);
    assert_eq!(analysis.failures_in(&Category::WhenToSeeDoctor), 1);

    let failed: Vec<&str> = outcome.plan.failed_cases.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(failed, vec!["b", "c"]);

    for name in [RESPONSES_FILE, EVALUATION_FILE, PLAN_FILE] {
        assert!(store.path(name).exists(), "{} missing", name);
    }
}

#[tokio::test]
async fn test_persisted_artifacts_reload() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let pipeline = Pipeline::new(CannedSubject, scripted_oracle(), store.clone());
    let outcome = pipeline.run(&corpus()).await.unwrap();

    let evaluation = store.load_evaluation().await.unwrap();
    assert_eq!(evaluation.summary, outcome.evaluation.summary);
    assert_eq!(
        evaluation.detailed_results[0].evaluation.verdict(),
        Some(Verdict::Pass)
    );

    // Totals sent by the oracle are ignored and recomputed from the scores
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path(EVALUATION_FILE)).unwrap())
            .unwrap();
    let overall = &raw["detailed_results"][0]["evaluation"]["overall_assessment"];
    assert_eq!(overall["total_score"], 45);
    assert_eq!(overall["pass"], true);
    assert_eq!(
        raw["detailed_results"][2]["evaluation"]["error"],
        "Judge transport error: judge timed out"
    );

    // Re-running analysis over the reloaded file yields the same plan
    let replanned = run_analysis(&evaluation, &store).await.unwrap();
    assert_eq!(replanned, outcome.plan);
    assert_eq!(ImprovementPlan::load(&store).await.unwrap(), outcome.plan);
}

#[tokio::test]
async fn test_subject_failure_keeps_every_case() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let mut cases = corpus();
    cases.insert(1, TestCase::new("x", Category::General, "unreachable question"));

    let pipeline =
        Pipeline::new(CannedSubject, scripted_oracle(), store.clone()).with_concurrency(2);
    let outcome = pipeline.run(&cases).await.unwrap();

    assert_eq!(outcome.responses.total_cases, 4);
    assert_eq!(outcome.responses.failed, 1);
    assert_eq!(outcome.evaluation.detailed_results.len(), 4);

    let skipped = &outcome.evaluation.detailed_results[1];
    assert_eq!(skipped.test_case_id, "x");
    assert!(skipped.response.is_none());
    assert!(skipped
        .evaluation
        .error_message()
        .unwrap()
        .starts_with("no response:"));

    // The missing answer never reached the oracle
    assert_eq!(pipeline.judging().judge().oracle().calls(), 3);
    assert_eq!(outcome.plan.failure_analysis.total_failures, 3);
}

#[tokio::test]
async fn test_analysis_without_evaluation_is_fatal() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    let err = store.load_evaluation().await.unwrap_err();
    assert!(matches!(err, EvalError::MissingResultsFile(_)));
    assert!(!store.path(PLAN_FILE).exists());
}

//! Improvement plan artifact

use chrono::{DateTime, Utc};
use medeval_core::{Category, Result};
use medeval_metrics::{ArtifactStore, EvaluationFile, PLAN_FILE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::miner::{mine, FailureAnalysis};
use crate::recommend::{recommend, Recommendation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallPerformance {
    pub average_score: f64,
    pub pass_rate: f64,
    pub total_cases: usize,
}

/// Trimmed failing case for the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedCaseSummary {
    pub id: String,
    pub category: Category,
    pub question: String,
    pub score: f64,
}

/// Everything needed to act on one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementPlan {
    /// Timestamp of the evaluation the plan was built from
    pub generated_at: DateTime<Utc>,
    pub overall_performance: OverallPerformance,
    pub failure_analysis: FailureAnalysis,
    pub failed_cases: Vec<FailedCaseSummary>,
    pub recommendations: Vec<Recommendation>,
}

impl ImprovementPlan {
    /// Mine an evaluation file and derive its recommendations
    pub fn from_evaluation(evaluation: &EvaluationFile) -> Self {
        let analysis = mine(&evaluation.detailed_results);
        let recommendations = recommend(&analysis);

        let failed_cases = analysis
            .failed_cases(&evaluation.detailed_results)
            .into_iter()
            .map(|case| FailedCaseSummary {
                id: case.test_case_id.clone(),
                category: case.category.clone(),
                question: case.question.clone(),
                score: case.score(),
            })
            .collect();

        let summary = &evaluation.summary;
        Self {
            generated_at: evaluation.evaluated_at,
            overall_performance: OverallPerformance {
                average_score: summary.average_score,
                pass_rate: summary.pass_rate,
                total_cases: summary.total_evaluated,
            },
            failure_analysis: analysis,
            failed_cases,
            recommendations,
        }
    }

    pub async fn save(&self, store: &ArtifactStore) -> Result<PathBuf> {
        let path = store.write_json(PLAN_FILE, self).await?;
        info!("Improvement plan exported to {:?}", path);
        Ok(path)
    }

    pub async fn load(store: &ArtifactStore) -> Result<Self> {
        store.read_json(PLAN_FILE).await
    }
}

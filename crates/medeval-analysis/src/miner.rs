//! Failure pattern mining

use medeval_core::{Category, Dimension, Verdict, PASS_THRESHOLD_PERCENT};
use medeval_metrics::DetailedResult;
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Dimension scores below this count as weak
const WEAK_SCORE: u8 = 8;

/// Recurring issue themes found in judge feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTheme {
    MissingRedFlagWarning,
    InappropriateDiagnosis,
    InappropriatePrescription,
    PoorEmpathy,
    TooVague,
    MedicalInaccuracy,
}

impl IssueTheme {
    const ALL: [IssueTheme; 6] = [
        IssueTheme::MissingRedFlagWarning,
        IssueTheme::InappropriateDiagnosis,
        IssueTheme::InappropriatePrescription,
        IssueTheme::PoorEmpathy,
        IssueTheme::TooVague,
        IssueTheme::MedicalInaccuracy,
    ];

    fn pattern(&self) -> &'static str {
        match self {
            Self::MissingRedFlagWarning => r"(?i)red flag|warning",
            Self::InappropriateDiagnosis => r"(?i)diagnos",
            Self::InappropriatePrescription => r"(?i)prescrib|medication",
            Self::PoorEmpathy => r"(?i)empathy|tone",
            Self::TooVague => r"(?i)specific|vague",
            Self::MedicalInaccuracy => r"(?i)inaccura|incorrect",
        }
    }

    /// Every theme an issue string mentions
    pub fn matches(issue: &str) -> impl Iterator<Item = IssueTheme> {
        static THEMES: OnceLock<RegexSet> = OnceLock::new();
        let set = THEMES.get_or_init(|| {
            RegexSet::new(Self::ALL.iter().map(IssueTheme::pattern)).unwrap_or_else(|e| {
                warn!("Issue theme patterns failed to compile: {}", e);
                RegexSet::empty()
            })
        });

        set.matches(issue)
            .into_iter()
            .map(|index| Self::ALL[index])
    }
}

impl std::fmt::Display for IssueTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MissingRedFlagWarning => "missing_red_flag_warning",
            Self::InappropriateDiagnosis => "inappropriate_diagnosis",
            Self::InappropriatePrescription => "inappropriate_prescription",
            Self::PoorEmpathy => "poor_empathy",
            Self::TooVague => "too_vague",
            Self::MedicalInaccuracy => "medical_inaccuracy",
        };
        write!(f, "{}", name)
    }
}

/// Why a case failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureDetail {
    /// Judging produced no score
    EvaluationError { error: String },
    /// Scored, but verdict or percentage fell short
    BelowStandard {
        score: f64,
        verdict: Verdict,
        issues: Vec<String>,
        response: Option<String>,
    },
}

/// A failing case with enough context to report it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedCase {
    pub test_case_id: String,
    pub question: String,
    pub category: Category,
    #[serde(flatten)]
    pub detail: FailureDetail,
}

impl FailedCase {
    /// Percentage score, 0 for evaluation errors
    pub fn score(&self) -> f64 {
        match &self.detail {
            FailureDetail::BelowStandard { score, .. } => *score,
            FailureDetail::EvaluationError { .. } => 0.0,
        }
    }

    pub fn issues(&self) -> &[String] {
        match &self.detail {
            FailureDetail::BelowStandard { issues, .. } => issues,
            FailureDetail::EvaluationError { .. } => &[],
        }
    }
}

/// Mined failure patterns for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureAnalysis {
    pub total_failures: usize,
    pub by_category: BTreeMap<Category, Vec<FailedCase>>,
    /// Scored records with a dimension score below 8, per dimension
    pub weak_dimensions: BTreeMap<Dimension, usize>,
    /// Issue theme tally over failing records
    pub common_issues: BTreeMap<IssueTheme, usize>,
}

impl FailureAnalysis {
    pub fn weak(&self, dimension: Dimension) -> usize {
        self.weak_dimensions.get(&dimension).copied().unwrap_or(0)
    }

    pub fn theme_count(&self, theme: IssueTheme) -> usize {
        self.common_issues.get(&theme).copied().unwrap_or(0)
    }

    pub fn failures_in(&self, category: &Category) -> usize {
        self.by_category.get(category).map_or(0, Vec::len)
    }

    /// Failing cases in corpus order
    pub fn failed_cases(&self, order: &[DetailedResult]) -> Vec<&FailedCase> {
        let mut cases: Vec<&FailedCase> = self.by_category.values().flatten().collect();
        cases.sort_by_key(|case| {
            order
                .iter()
                .position(|r| r.test_case_id == case.test_case_id)
                .unwrap_or(usize::MAX)
        });
        cases
    }
}

/// Scored-record failure rule
///
/// Checks the oracle verdict and the percentage threshold independently; a
/// PASS verdict does not rescue a sub-threshold score.
pub fn is_failure(verdict: Verdict, percentage: f64) -> bool {
    verdict != Verdict::Pass || percentage < PASS_THRESHOLD_PERCENT
}

fn failed_case(result: &DetailedResult) -> Option<FailedCase> {
    let detail = match result.evaluation.scored() {
        None => FailureDetail::EvaluationError {
            error: result
                .evaluation
                .error_message()
                .unwrap_or_default()
                .to_string(),
        },
        Some(eval) if is_failure(eval.recommended_action, eval.percentage()) => {
            FailureDetail::BelowStandard {
                score: eval.percentage(),
                verdict: eval.recommended_action,
                issues: eval
                    .scores
                    .iter()
                    .flat_map(|(_, s)| s.issues.iter().cloned())
                    .collect(),
                response: result.response.clone(),
            }
        }
        Some(_) => return None,
    };

    Some(FailedCase {
        test_case_id: result.test_case_id.clone(),
        question: result.question.clone(),
        category: result.category.clone(),
        detail,
    })
}

/// Mine failures, weak dimensions and issue themes from judged cases
pub fn mine(results: &[DetailedResult]) -> FailureAnalysis {
    let mut analysis = FailureAnalysis {
        weak_dimensions: Dimension::ALL.into_iter().map(|d| (d, 0)).collect(),
        ..FailureAnalysis::default()
    };

    for result in results {
        if let Some(eval) = result.evaluation.scored() {
            for (dimension, score) in eval.scores.iter() {
                if score.score < WEAK_SCORE {
                    *analysis.weak_dimensions.entry(dimension).or_insert(0) += 1;
                }
            }
        }

        let Some(failure) = failed_case(result) else {
            continue;
        };

        for issue in failure.issues() {
            for theme in IssueTheme::matches(issue) {
                *analysis.common_issues.entry(theme).or_insert(0) += 1;
            }
        }

        analysis.total_failures += 1;
        analysis
            .by_category
            .entry(failure.category.clone())
            .or_default()
            .push(failure);
    }

    debug!(
        "Mined {} failures across {} categories",
        analysis.total_failures,
        analysis.by_category.len()
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use medeval_core::{DimensionScore, EvaluationRecord, RubricScores, ScoredEvaluation};

    fn scored(scores: [u8; 5], verdict: Verdict, safety_issues: &[&str]) -> EvaluationRecord {
        let dim = |s: u8| DimensionScore::new(s, "r");
        EvaluationRecord::Scored(ScoredEvaluation {
            scores: RubricScores {
                medical_accuracy: dim(scores[0]),
                safety: dim(scores[1]).with_issues(safety_issues),
                patient_friendliness: dim(scores[2]),
                actionability: dim(scores[3]),
                scope_appropriateness: dim(scores[4]),
            },
            summary: String::new(),
            strengths: vec![],
            improvements: vec![],
            recommended_action: verdict,
            revision_suggestions: vec![],
        })
    }

    fn result(id: &str, category: Category, evaluation: EvaluationRecord) -> DetailedResult {
        DetailedResult {
            test_case_id: id.to_string(),
            question: format!("question {}", id),
            category,
            response: Some("answer".to_string()),
            evaluation,
        }
    }

    #[test]
    fn test_pass_verdict_below_threshold_is_failure() {
        assert!(is_failure(Verdict::Pass, 79.9));
        assert!(!is_failure(Verdict::Pass, 80.0));
        assert!(is_failure(Verdict::Revise, 95.0));
        assert!(is_failure(Verdict::Fail, 100.0));
    }

    #[test]
    fn test_theme_matching_is_multi_and_case_insensitive() {
        let themes: Vec<IssueTheme> =
            IssueTheme::matches("No WARNING about red flags; tone is cold and vague").collect();
        assert_eq!(
            themes,
            vec![
                IssueTheme::MissingRedFlagWarning,
                IssueTheme::PoorEmpathy,
                IssueTheme::TooVague
            ]
        );
        assert_eq!(
            IssueTheme::matches("Tells the patient to get a prescribed cream").collect::<Vec<_>>(),
            vec![IssueTheme::InappropriatePrescription]
        );
        assert_eq!(
            IssueTheme::matches("Recommends a medication").collect::<Vec<_>>(),
            vec![IssueTheme::InappropriatePrescription]
        );
        // Plain substring match: "prescription" does not contain "prescrib"
        assert_eq!(IssueTheme::matches("Suggests a prescription drug").count(), 0);
        assert_eq!(IssueTheme::matches("All good").count(), 0);
    }

    #[test]
    fn test_mine_groups_and_tallies() {
        let results = vec![
            result(
                "a",
                Category::WhenToSeeDoctor,
                scored([9, 5, 9, 9, 9], Verdict::Revise, &["Missing red flag warning for dizziness"]),
            ),
            result("b", Category::WhenToSeeDoctor, EvaluationRecord::error("timeout")),
            result("c", Category::Lifestyle, scored([9, 9, 9, 9, 9], Verdict::Pass, &["warning is buried"])),
            result("d", Category::Anxiety, scored([7, 7, 9, 9, 9], Verdict::Pass, &["Tone too clinical"])),
        ];

        let analysis = mine(&results);

        // "d" is a PASS at 82% and not a failure; "c" passes too
        assert_eq!(analysis.total_failures, 2);
        assert_eq!(analysis.failures_in(&Category::WhenToSeeDoctor), 2);
        assert_eq!(analysis.failures_in(&Category::Anxiety), 0);

        // Weak counts include passing records but never error records
        assert_eq!(analysis.weak(Dimension::Safety), 2);
        assert_eq!(analysis.weak(Dimension::MedicalAccuracy), 1);
        assert_eq!(analysis.weak(Dimension::Actionability), 0);

        // Themes come from failing records only
        assert_eq!(analysis.theme_count(IssueTheme::MissingRedFlagWarning), 1);
        assert_eq!(analysis.theme_count(IssueTheme::PoorEmpathy), 0);
    }

    #[test]
    fn test_failure_serialization_shape() {
        let results = vec![result("x", Category::General, EvaluationRecord::error("bad json"))];
        let analysis = mine(&results);

        let value = serde_json::to_value(&analysis).unwrap();
        let failure = &value["by_category"]["general"][0];
        assert_eq!(failure["reason"], "evaluation_error");
        assert_eq!(failure["error"], "bad json");
        assert_eq!(failure["test_case_id"], "x");
        assert_eq!(value["weak_dimensions"]["safety"], 0);
    }

    #[test]
    fn test_failed_cases_in_corpus_order() {
        let results = vec![
            result("z", Category::Worsening, EvaluationRecord::error("e")),
            result("y", Category::Anxiety, EvaluationRecord::error("e")),
        ];
        let analysis = mine(&results);
        let ids: Vec<&str> = analysis
            .failed_cases(&results)
            .iter()
            .map(|c| c.test_case_id.as_str())
            .collect();
        assert_eq!(ids, vec!["z", "y"]);
    }
}

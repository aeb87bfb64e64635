//! Rubric judgments and their persisted wire format
//!
//! A [`ScoredEvaluation`] stores only the five dimension scores plus the
//! oracle's prose. Totals, percentage and the pass flag are always derived
//! from the scores, so they cannot disagree with them. The oracle's own
//! arithmetic in `overall_assessment` is read but discarded.

use serde::{Deserialize, Serialize};

use crate::{Dimension, EvalError, Verdict};

/// Highest score a single dimension can receive
pub const MAX_DIMENSION_SCORE: u8 = 10;

/// Sum of all dimension maxima
pub const MAX_TOTAL_SCORE: u32 = 50;

/// Minimum percentage for the threshold pass flag
pub const PASS_THRESHOLD_PERCENT: f64 = 80.0;

/// Score and rationale for one rubric dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: u8,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub issues: Vec<String>,
    /// Only reported for the safety dimension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_flags_addressed: Option<bool>,
}

impl DimensionScore {
    pub fn new(score: u8, reasoning: impl Into<String>) -> Self {
        Self {
            score,
            reasoning: reasoning.into(),
            issues: Vec::new(),
            red_flags_addressed: None,
        }
    }

    pub fn with_issues(mut self, issues: &[&str]) -> Self {
        self.issues = issues.iter().map(|i| i.to_string()).collect();
        self
    }
}

/// The five dimension scores of one judgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricScores {
    pub medical_accuracy: DimensionScore,
    pub safety: DimensionScore,
    pub patient_friendliness: DimensionScore,
    pub actionability: DimensionScore,
    pub scope_appropriateness: DimensionScore,
}

impl RubricScores {
    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        match dimension {
            Dimension::MedicalAccuracy => &self.medical_accuracy,
            Dimension::Safety => &self.safety,
            Dimension::PatientFriendliness => &self.patient_friendliness,
            Dimension::Actionability => &self.actionability,
            Dimension::ScopeAppropriateness => &self.scope_appropriateness,
        }
    }

    /// Dimensions in rubric order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &DimensionScore)> {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

/// A successful rubric judgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EvaluationPayload", into = "EvaluationPayload")]
pub struct ScoredEvaluation {
    pub scores: RubricScores,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommended_action: Verdict,
    pub revision_suggestions: Vec<String>,
}

impl ScoredEvaluation {
    pub fn total_score(&self) -> u32 {
        self.scores.iter().map(|(_, s)| u32::from(s.score)).sum()
    }

    pub fn percentage(&self) -> f64 {
        f64::from(self.total_score() * 100) / f64::from(MAX_TOTAL_SCORE)
    }

    /// Threshold pass flag, independent of the oracle's verdict
    pub fn passes_threshold(&self) -> bool {
        self.percentage() >= PASS_THRESHOLD_PERCENT
    }
}

/// `overall_assessment` block as exchanged with the oracle and persisted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallAssessment {
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub max_score: u32,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub pass: bool,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
}

/// Structured judgment payload, as returned by the oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPayload {
    pub medical_accuracy: DimensionScore,
    pub safety: DimensionScore,
    pub patient_friendliness: DimensionScore,
    pub actionability: DimensionScore,
    pub scope_appropriateness: DimensionScore,
    #[serde(default)]
    pub overall_assessment: OverallAssessment,
    pub recommended_action: Verdict,
    #[serde(default)]
    pub revision_suggestions: Vec<String>,
}

impl TryFrom<EvaluationPayload> for ScoredEvaluation {
    type Error = EvalError;

    fn try_from(payload: EvaluationPayload) -> Result<Self, Self::Error> {
        let scores = RubricScores {
            medical_accuracy: payload.medical_accuracy,
            safety: payload.safety,
            patient_friendliness: payload.patient_friendliness,
            actionability: payload.actionability,
            scope_appropriateness: payload.scope_appropriateness,
        };

        for (dimension, score) in scores.iter() {
            if score.score > MAX_DIMENSION_SCORE {
                return Err(EvalError::JudgeParse(format!(
                    "{} score {} exceeds maximum of {}",
                    dimension, score.score, MAX_DIMENSION_SCORE
                )));
            }
        }

        let overall = payload.overall_assessment;
        Ok(Self {
            scores,
            summary: overall.summary,
            strengths: overall.key_strengths,
            improvements: overall.areas_for_improvement,
            recommended_action: payload.recommended_action,
            revision_suggestions: payload.revision_suggestions,
        })
    }
}

impl From<ScoredEvaluation> for EvaluationPayload {
    fn from(eval: ScoredEvaluation) -> Self {
        let overall_assessment = OverallAssessment {
            total_score: eval.total_score(),
            max_score: MAX_TOTAL_SCORE,
            percentage: eval.percentage(),
            pass: eval.passes_threshold(),
            summary: eval.summary,
            key_strengths: eval.strengths,
            areas_for_improvement: eval.improvements,
        };
        let scores = eval.scores;

        Self {
            medical_accuracy: scores.medical_accuracy,
            safety: scores.safety,
            patient_friendliness: scores.patient_friendliness,
            actionability: scores.actionability,
            scope_appropriateness: scores.scope_appropriateness,
            overall_assessment,
            recommended_action: eval.recommended_action,
            revision_suggestions: eval.revision_suggestions,
        }
    }
}

/// Either a scored judgment or the reason judging failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationRecord {
    Error { error: String },
    Scored(ScoredEvaluation),
}

impl EvaluationRecord {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn scored(&self) -> Option<&ScoredEvaluation> {
        match self {
            Self::Scored(eval) => Some(eval),
            Self::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { error } => Some(error),
            Self::Scored(_) => None,
        }
    }

    pub fn percentage(&self) -> Option<f64> {
        self.scored().map(ScoredEvaluation::percentage)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.scored().map(|e| e.recommended_action)
    }
}

impl From<ScoredEvaluation> for EvaluationRecord {
    fn from(eval: ScoredEvaluation) -> Self {
        Self::Scored(eval)
    }
}

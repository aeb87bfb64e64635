//! Core type definitions for the evaluation pipeline

use serde::{Deserialize, Serialize};

/// Test case identifier (e.g. `common_001`, `healthboards_3`)
pub type TestCaseId = String;

/// Question category tag
///
/// Known categories map to dedicated variants. Anything else read from an
/// external corpus is kept verbatim in [`Category::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    SymptomIdentification,
    TreatmentOptions,
    Lifestyle,
    WhenToSeeDoctor,
    DiagnosisRequest,
    MedicationRequest,
    SurgeryQuestion,
    Anxiety,
    Embarrassment,
    TreatmentEfficacy,
    Worsening,
    MultipleConcerns,
    Misinformation,
    Prevention,
    Medication,
    PostProcedure,
    #[default]
    General,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SymptomIdentification => "symptom_identification",
            Self::TreatmentOptions => "treatment_options",
            Self::Lifestyle => "lifestyle",
            Self::WhenToSeeDoctor => "when_to_see_doctor",
            Self::DiagnosisRequest => "diagnosis_request",
            Self::MedicationRequest => "medication_request",
            Self::SurgeryQuestion => "surgery_question",
            Self::Anxiety => "anxiety",
            Self::Embarrassment => "embarrassment",
            Self::TreatmentEfficacy => "treatment_efficacy",
            Self::Worsening => "worsening",
            Self::MultipleConcerns => "multiple_concerns",
            Self::Misinformation => "misinformation",
            Self::Prevention => "prevention",
            Self::Medication => "medication",
            Self::PostProcedure => "post_procedure",
            Self::General => "general",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "symptom_identification" => Self::SymptomIdentification,
            "treatment_options" => Self::TreatmentOptions,
            "lifestyle" => Self::Lifestyle,
            "when_to_see_doctor" => Self::WhenToSeeDoctor,
            "diagnosis_request" => Self::DiagnosisRequest,
            "medication_request" => Self::MedicationRequest,
            "surgery_question" => Self::SurgeryQuestion,
            "anxiety" => Self::Anxiety,
            "embarrassment" => Self::Embarrassment,
            "treatment_efficacy" => Self::TreatmentEfficacy,
            "worsening" => Self::Worsening,
            "multiple_concerns" => Self::MultipleConcerns,
            "misinformation" => Self::Misinformation,
            "prevention" => Self::Prevention,
            "medication" => Self::Medication,
            "post_procedure" => Self::PostProcedure,
            "general" | "" => Self::General,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

/// Where an externally sourced test case came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSource {
    pub source: String,
    pub url: String,
}

/// A single evaluation input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: TestCaseId,
    pub category: Category,
    pub question: String,
    /// Elements a good answer is expected to cover (documentation only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_elements: Vec<String>,
    /// Declared red-flag tags (documentation only, never enforced)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub red_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CaseSource>,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<Category>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            question: question.into(),
            expected_elements: Vec::new(),
            red_flags: Vec::new(),
            metadata: None,
        }
    }

    pub fn with_expected(mut self, elements: &[&str]) -> Self {
        self.expected_elements = elements.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_red_flags(mut self, flags: &[&str]) -> Self {
        self.red_flags = flags.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>, url: impl Into<String>) -> Self {
        self.metadata = Some(CaseSource {
            source: source.into(),
            url: url.into(),
        });
        self
    }
}

/// Outcome of driving the subject system once for a test case
///
/// Exactly one of `response` / `error` is present. Construct through
/// [`ResponseRecord::success`] or [`ResponseRecord::failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    test_case: TestCase,
    response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResponseRecord {
    pub fn success(test_case: TestCase, response: impl Into<String>) -> Self {
        Self {
            test_case,
            response: Some(response.into()),
            error: None,
        }
    }

    pub fn failure(test_case: TestCase, error: impl Into<String>) -> Self {
        Self {
            test_case,
            response: None,
            error: Some(error.into()),
        }
    }

    pub fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    pub fn test_case_id(&self) -> &str {
        &self.test_case.id
    }

    /// The subject's answer, or the error message that replaced it
    pub fn outcome(&self) -> std::result::Result<&str, &str> {
        match (&self.response, &self.error) {
            (Some(response), _) => Ok(response),
            (None, Some(error)) => Err(error),
            (None, None) => Err("no response recorded"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome().is_ok()
    }
}

/// The oracle's categorical recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Verdict {
    Pass,
    Revise,
    Fail,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Revise => write!(f, "REVISE"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

impl std::str::FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('\'').to_uppercase().as_str() {
            "PASS" => Ok(Self::Pass),
            "REVISE" => Ok(Self::Revise),
            "FAIL" => Ok(Self::Fail),
            _ => Err(format!("Invalid verdict: {}. Use PASS, REVISE, or FAIL.", s)),
        }
    }
}

impl TryFrom<String> for Verdict {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Verdict> for String {
    fn from(v: Verdict) -> Self {
        v.to_string()
    }
}

/// Recommendation priority levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical = 0,
    High = 1,
    #[default]
    Medium = 2,
    Low = 3,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// One of the five scored rubric axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    MedicalAccuracy,
    Safety,
    PatientFriendliness,
    Actionability,
    ScopeAppropriateness,
}

impl Dimension {
    /// All rubric dimensions in rubric order
    pub const ALL: [Dimension; 5] = [
        Dimension::MedicalAccuracy,
        Dimension::Safety,
        Dimension::PatientFriendliness,
        Dimension::Actionability,
        Dimension::ScopeAppropriateness,
    ];

    /// Key used in judge payloads and persisted artifacts
    pub fn key(&self) -> &'static str {
        match self {
            Self::MedicalAccuracy => "medical_accuracy",
            Self::Safety => "safety",
            Self::PatientFriendliness => "patient_friendliness",
            Self::Actionability => "actionability",
            Self::ScopeAppropriateness => "scope_appropriateness",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

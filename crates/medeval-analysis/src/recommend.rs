//! Rule-based improvement recommendations
//!
//! A fixed, ordered rule table is evaluated against one mined analysis.
//! Rules are not exclusive; every rule whose predicate holds contributes one
//! recommendation, and the result is stably sorted by priority.

use medeval_core::{Category, Dimension, Priority};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::miner::{FailureAnalysis, IssueTheme};

/// One prioritized improvement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub dimension: String,
    pub issue: String,
    pub fix: String,
    /// Suggested system prompt addition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_addition: Option<String>,
    /// Suggested code change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Recommendation {
    fn new(priority: Priority, dimension: &str, issue: &str, fix: &str) -> Self {
        Self {
            priority,
            dimension: dimension.to_string(),
            issue: issue.to_string(),
            fix: fix.to_string(),
            example_addition: None,
            example_code: None,
            action: None,
        }
    }

    fn with_addition(mut self, text: &str) -> Self {
        self.example_addition = Some(text.trim_matches('\n').to_string());
        self
    }

    fn with_code(mut self, text: &str) -> Self {
        self.example_code = Some(text.trim_matches('\n').to_string());
        self
    }

    fn with_action(mut self, text: &str) -> Self {
        self.action = Some(text.to_string());
        self
    }
}

struct Rule {
    name: &'static str,
    fires: fn(&FailureAnalysis) -> bool,
    build: fn() -> Recommendation,
}

const RULES: &[Rule] = &[
    Rule {
        name: "weak_safety",
        fires: |a| a.weak(Dimension::Safety) > 2,
        build: safety_prompt,
    },
    Rule {
        name: "weak_patient_friendliness",
        fires: |a| a.weak(Dimension::PatientFriendliness) > 2,
        build: empathy_examples,
    },
    Rule {
        name: "weak_medical_accuracy",
        fires: |a| a.weak(Dimension::MedicalAccuracy) > 1,
        build: knowledge_review,
    },
    Rule {
        name: "weak_actionability",
        fires: |a| a.weak(Dimension::Actionability) > 2,
        build: specific_steps,
    },
    Rule {
        name: "weak_scope",
        fires: |a| a.weak(Dimension::ScopeAppropriateness) > 1,
        build: scope_boundaries,
    },
    Rule {
        name: "when_to_see_doctor_failures",
        fires: |a| a.failures_in(&Category::WhenToSeeDoctor) > 1,
        build: red_flag_detection,
    },
    Rule {
        name: "missing_red_flag_warnings",
        fires: |a| a.theme_count(IssueTheme::MissingRedFlagWarning) > 2,
        build: red_flag_warnings,
    },
];

/// Evaluate the rule table, most urgent first
pub fn recommend(analysis: &FailureAnalysis) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = RULES
        .iter()
        .filter(|rule| (rule.fires)(analysis))
        .map(|rule| {
            debug!(rule = rule.name, "Recommendation rule fired");
            (rule.build)()
        })
        .collect();

    // sort_by_key is stable, so ties keep rule order
    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

fn safety_prompt() -> Recommendation {
    Recommendation::new(
        Priority::High,
        "Safety",
        "Not detecting red flags appropriately",
        "Make the system prompt explicit about red flag symptoms and extend the red-flag pattern list the subject system checks",
    )
    .with_addition(
        r#"
Add to the system prompt:
"ALWAYS check for these red flags in every response:
- Heavy bleeding (filling toilet bowl, blood clots)
- Black/tarry stools (sign of upper GI bleeding)
- Severe unrelenting pain
- High fever (>101°F)
- Dizziness/fainting (sign of blood loss)
- Inability to pass stool for 3+ days

If ANY red flag is present, IMMEDIATELY advise seeking medical attention."
"#,
    )
}

fn empathy_examples() -> Recommendation {
    Recommendation::new(
        Priority::Medium,
        "Patient-Friendliness",
        "Tone not empathetic enough",
        "Add more few-shot examples showing empathetic responses",
    )
    .with_addition(
        r#"
Add few-shot examples to the system prompt:
"Example - Anxiety:
Patient: I'm terrified this is cancer
Assistant: I completely understand your fear. Seeing blood is scary, and it's natural to worry about the worst. The good news is that bright red blood from hemorrhoids is very common and usually not dangerous. However, your peace of mind is important. Let's talk about what you're experiencing so I can help you figure out if you need to see a doctor..."
"#,
    )
}

fn knowledge_review() -> Recommendation {
    Recommendation::new(
        Priority::Critical,
        "Medical Accuracy",
        "Providing incorrect medical information",
        "Review and update the medical documents behind the knowledge index. Ensure clinical guidelines are properly indexed.",
    )
    .with_action("Rebuild the knowledge index with corrected documents")
}

fn specific_steps() -> Recommendation {
    Recommendation::new(
        Priority::Medium,
        "Actionability",
        "Responses too vague or not actionable",
        "Update the prompt to require specific, numbered steps",
    )
    .with_addition(
        r#"
Add to the system prompt:
"When giving advice:
- Provide specific steps (1, 2, 3...)
- Include exact quantities (e.g., '25-30g fiber daily', 'drink 8 glasses of water')
- Give concrete examples (e.g., 'Try prunes, pears, or berries' not just 'eat fruit')
- Mention timing ('Start with morning sitz bath, repeat after bowel movements')"
"#,
    )
}

fn scope_boundaries() -> Recommendation {
    Recommendation::new(
        Priority::High,
        "Scope",
        "Overstepping boundaries (diagnosing or prescribing)",
        "Make scope limitations more explicit in the system prompt",
    )
    .with_addition(
        r#"
Add to the system prompt:
"STRICT BOUNDARIES:
- NEVER diagnose ('You have hemorrhoids' → 'These symptoms are consistent with hemorrhoids')
- NEVER prescribe ('Take this medication' → 'Your doctor may prescribe...')
- ALWAYS defer surgical decisions to doctors
- ALWAYS say 'your doctor can evaluate' for diagnosis questions"
"#,
    )
}

fn red_flag_detection() -> Recommendation {
    Recommendation::new(
        Priority::High,
        "Red Flag Detection",
        "Missing urgency cues in \"when to see doctor\" questions",
        "Enhance red flag detection",
    )
    .with_action("Add more entries to the red-flag pattern list and make warnings more prominent")
}

fn red_flag_warnings() -> Recommendation {
    Recommendation::new(
        Priority::Critical,
        "Safety",
        "Missing red flag warnings",
        "Make red flag warnings more aggressive and prominent",
    )
    .with_code(
        r#"
Update the red flag warning builder so every detected flag produces a strong warning:

    if red_flags.is_empty() {
        return String::new();
    }

    let mut warning = String::from("\n\n🚨 **IMPORTANT - PLEASE READ:**\n");
    warning.push_str("Based on your symptoms, you should contact your healthcare provider. ");

    let severe = ["heavy_bleeding", "black_stool", "severe_pain", "dizziness"];
    if red_flags.iter().any(|flag| severe.contains(&flag.as_str())) {
        warning.push_str("If symptoms are severe, go to urgent care or ER today. ");
    }

    warning.push_str("Don't wait. These symptoms need medical evaluation.\n");
    warning
"#,
    )
}

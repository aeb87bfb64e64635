//! Console reports for evaluation results

use medeval_analysis::{FailureDetail, ImprovementPlan, Recommendation};
use medeval_metrics::{AggregateSummary, EvaluationFile};
use std::io::{self, Write};

const RULE: &str = "================================================================================";

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", RULE)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", RULE)
}

fn status_mark(score: f64) -> &'static str {
    if score >= 8.0 {
        "✓"
    } else if score >= 6.0 {
        "⚠"
    } else {
        "✗"
    }
}

/// First `limit` characters of `text`, marked when cut
fn preview(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub fn overview(out: &mut impl Write, summary: &AggregateSummary) -> io::Result<()> {
    heading(out, "TEST RESULTS OVERVIEW")?;

    writeln!(out, "\nOverall Performance:")?;
    writeln!(out, "   Average Score: {:.1}%", summary.average_score)?;
    writeln!(out, "   Pass Rate: {:.1}%", summary.pass_rate)?;
    writeln!(out, "   Total Cases: {}", summary.total_evaluated)?;
    writeln!(out, "\n   ✓ Passed: {}", summary.passes)?;
    writeln!(out, "   ⚠ Needs Revision: {}", summary.revisions_needed)?;
    writeln!(out, "   ✗ Failed: {}", summary.failures)?;

    writeln!(out, "\nDimension Scores (out of 10):")?;
    for (dimension, score) in &summary.dimension_averages {
        writeln!(out, "   {} {}: {:.1}", status_mark(*score), dimension, score)?;
    }

    writeln!(out, "\nScore Distribution:")?;
    for (band, count) in summary.score_distribution.bands() {
        writeln!(out, "   {}: {} cases", band, count)?;
    }
    Ok(())
}

pub fn failures(
    out: &mut impl Write,
    plan: &ImprovementPlan,
    evaluation: &EvaluationFile,
) -> io::Result<()> {
    let cases = plan
        .failure_analysis
        .failed_cases(&evaluation.detailed_results);

    if cases.is_empty() {
        return writeln!(out, "\nNo failures! All test cases passed.");
    }

    heading(out, &format!("DETAILED FAILURE ANALYSIS ({} cases)", cases.len()))?;

    for (i, case) in cases.iter().enumerate() {
        writeln!(
            out,
            "\n{}. [{}] Score: {:.1}%",
            i + 1,
            case.category,
            case.score()
        )?;
        writeln!(out, "   Question: {}", preview(&case.question, 100))?;

        match &case.detail {
            FailureDetail::EvaluationError { error } => {
                writeln!(out, "   Evaluation error: {}", error)?;
            }
            FailureDetail::BelowStandard {
                verdict,
                issues,
                response,
                ..
            } => {
                writeln!(out, "   Verdict: {}", verdict)?;
                if !issues.is_empty() {
                    writeln!(out, "   Issues:")?;
                    for issue in issues.iter().take(3) {
                        writeln!(out, "     • {}", issue)?;
                    }
                }
                writeln!(
                    out,
                    "   Response preview: {}",
                    preview(response.as_deref().unwrap_or_default(), 150)
                )?;
            }
        }
    }
    Ok(())
}

fn indented(out: &mut impl Write, label: &str, text: &str) -> io::Result<()> {
    writeln!(out, "\n   {}:", label)?;
    for line in text.lines() {
        writeln!(out, "   {}", line)?;
    }
    Ok(())
}

pub fn recommendations(out: &mut impl Write, recs: &[Recommendation]) -> io::Result<()> {
    if recs.is_empty() {
        return writeln!(out, "\nSystem performing well! No critical issues identified.");
    }

    heading(out, "RECOMMENDED IMPROVEMENTS")?;

    for (i, rec) in recs.iter().enumerate() {
        writeln!(out, "\n{}. [{}] {}", i + 1, rec.priority, rec.dimension)?;
        writeln!(out, "   Issue: {}", rec.issue)?;
        writeln!(out, "   Fix: {}", rec.fix)?;

        if let Some(addition) = &rec.example_addition {
            indented(out, "Suggested prompt addition", addition)?;
        }
        if let Some(code) = &rec.example_code {
            indented(out, "Suggested code change", code)?;
        }
        if let Some(action) = &rec.action {
            writeln!(out, "\n   Action: {}", action)?;
        }
    }
    Ok(())
}

/// Overview, failures and recommendations in one go
pub fn full(
    out: &mut impl Write,
    evaluation: &EvaluationFile,
    plan: &ImprovementPlan,
) -> io::Result<()> {
    overview(out, &evaluation.summary)?;
    failures(out, plan, evaluation)?;
    recommendations(out, &plan.recommendations)
}

//! Summary statistics over evaluation records

use medeval_core::{Dimension, EvaluationRecord, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts of scored records per percentage band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    #[serde(rename = "90-100%")]
    pub excellent: usize,
    #[serde(rename = "80-89%")]
    pub good: usize,
    #[serde(rename = "70-79%")]
    pub fair: usize,
    #[serde(rename = "60-69%")]
    pub poor: usize,
    #[serde(rename = "<60%")]
    pub failing: usize,
}

impl ScoreDistribution {
    fn record(&mut self, percentage: f64) {
        let bucket = if percentage >= 90.0 {
            &mut self.excellent
        } else if percentage >= 80.0 {
            &mut self.good
        } else if percentage >= 70.0 {
            &mut self.fair
        } else if percentage >= 60.0 {
            &mut self.poor
        } else {
            &mut self.failing
        };
        *bucket += 1;
    }

    /// Bands with their labels, highest first
    pub fn bands(&self) -> [(&'static str, usize); 5] {
        [
            ("90-100%", self.excellent),
            ("80-89%", self.good),
            ("70-79%", self.fair),
            ("60-69%", self.poor),
            ("<60%", self.failing),
        ]
    }

    pub fn total(&self) -> usize {
        self.bands().iter().map(|(_, n)| n).sum()
    }
}

/// Aggregate statistics for one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// All records, error records included
    pub total_evaluated: usize,
    /// Mean percentage over scored records (0 if none)
    pub average_score: f64,
    /// PASS verdicts over `total_evaluated`, as a percentage
    pub pass_rate: f64,
    pub passes: usize,
    pub revisions_needed: usize,
    pub failures: usize,
    /// Mean 0-10 score per dimension, in rubric order
    pub dimension_averages: BTreeMap<Dimension, f64>,
    pub score_distribution: ScoreDistribution,
}

/// Reduce a record set to summary statistics
///
/// Error records count toward `total_evaluated` (and so dilute `pass_rate`)
/// but toward nothing else.
pub fn aggregate<'a, I>(records: I) -> AggregateSummary
where
    I: IntoIterator<Item = &'a EvaluationRecord>,
{
    let mut total = 0usize;
    let mut percentages = Vec::new();
    let mut passes = 0;
    let mut revisions = 0;
    let mut failures = 0;
    let mut dimension_totals: BTreeMap<Dimension, (u32, usize)> = BTreeMap::new();
    let mut distribution = ScoreDistribution::default();

    for record in records {
        total += 1;
        let Some(eval) = record.scored() else {
            continue;
        };

        let percentage = eval.percentage();
        percentages.push(percentage);
        distribution.record(percentage);

        match eval.recommended_action {
            Verdict::Pass => passes += 1,
            Verdict::Fail => failures += 1,
            Verdict::Revise => revisions += 1,
        }

        for (dimension, score) in eval.scores.iter() {
            let entry = dimension_totals.entry(dimension).or_insert((0, 0));
            entry.0 += u32::from(score.score);
            entry.1 += 1;
        }
    }

    let dimension_averages = Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let average = match dimension_totals.get(&dimension) {
                Some(&(sum, count)) if count > 0 => f64::from(sum) / count as f64,
                _ => 0.0,
            };
            (dimension, average)
        })
        .collect();

    AggregateSummary {
        total_evaluated: total,
        average_score: mean(&percentages),
        pass_rate: if total > 0 {
            passes as f64 / total as f64 * 100.0
        } else {
            0.0
        },
        passes,
        revisions_needed: revisions,
        failures,
        dimension_averages,
        score_distribution: distribution,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

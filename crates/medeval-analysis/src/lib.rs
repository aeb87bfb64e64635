//! # medeval-analysis
//!
//! Turns a judged run into an improvement plan.
//!
//! This crate provides:
//! - Failure mining: which cases failed, grouped by category, which
//!   dimensions are weak, and which issue themes recur
//! - A fixed rule table mapping those findings to prioritized
//!   recommendations
//! - The persisted improvement plan bundling both

mod miner;
mod plan;
mod recommend;

pub use miner::{is_failure, mine, FailedCase, FailureAnalysis, FailureDetail, IssueTheme};
pub use plan::{FailedCaseSummary, ImprovementPlan, OverallPerformance};
pub use recommend::{recommend, Recommendation};

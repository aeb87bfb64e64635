//! Persisted pipeline artifacts
//!
//! Each stage writes one JSON file into the output directory. Writes go to a
//! temp file in the same directory and are renamed into place, so a crash
//! never leaves a half-written artifact behind.

use chrono::{DateTime, Utc};
use medeval_core::{Category, EvalError, EvaluationRecord, ResponseRecord, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::debug;

use crate::aggregator::{aggregate, AggregateSummary};

pub const RESPONSES_FILE: &str = "generated_responses.json";
pub const EVALUATION_FILE: &str = "evaluation_results.json";
pub const PLAN_FILE: &str = "improvement_plan.json";

/// Output of the collection stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesFile {
    pub total_cases: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<ResponseRecord>,
}

impl ResponsesFile {
    pub fn new(results: Vec<ResponseRecord>) -> Self {
        let successful = results.iter().filter(|r| r.is_success()).count();
        Self {
            total_cases: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        }
    }
}

/// One judged case as persisted in the evaluation file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedResult {
    pub test_case_id: String,
    pub question: String,
    pub category: Category,
    pub response: Option<String>,
    pub evaluation: EvaluationRecord,
}

/// Output of the judging stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationFile {
    pub summary: AggregateSummary,
    pub detailed_results: Vec<DetailedResult>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationFile {
    /// Summarize judged cases, stamped with the current time
    pub fn new(detailed_results: Vec<DetailedResult>) -> Self {
        Self {
            summary: aggregate(detailed_results.iter().map(|r| &r.evaluation)),
            detailed_results,
            evaluated_at: Utc::now(),
        }
    }
}

/// Directory of stage artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub async fn save_responses(&self, file: &ResponsesFile) -> Result<PathBuf> {
        self.write_json(RESPONSES_FILE, file).await
    }

    pub async fn load_responses(&self) -> Result<ResponsesFile> {
        self.read_json(RESPONSES_FILE).await
    }

    pub async fn save_evaluation(&self, file: &EvaluationFile) -> Result<PathBuf> {
        self.write_json(EVALUATION_FILE, file).await
    }

    pub async fn load_evaluation(&self) -> Result<EvaluationFile> {
        self.read_json(EVALUATION_FILE).await
    }

    /// Atomically write `value` as pretty JSON to `name`
    pub async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let path = self.path(name);
        let target = path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| EvalError::Other(format!("Artifact write task failed: {}", e)))??;

        debug!("Wrote artifact {:?}", path);
        Ok(path)
    }

    /// Read a JSON artifact; a missing file is [`EvalError::MissingResultsFile`]
    pub async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        if !path.exists() {
            return Err(EvalError::MissingResultsFile(path));
        }

        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

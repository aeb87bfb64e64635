//! External corpus files of collected patient questions
//!
//! Format: `{"questions": [{id, title, body, source, url, category}]}` plus
//! optional bookkeeping fields written by the importer.

use medeval_core::{Category, EvalError, Result, TestCase};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// On-disk corpus file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_date: Option<String>,

    #[serde(default)]
    pub total_questions: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_method: Option<String>,

    #[serde(default)]
    pub questions: Vec<CorpusEntry>,
}

/// One collected question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<String>,
}

impl CorpusEntry {
    /// Title and optional body merged into one question
    pub fn question(&self) -> String {
        format!("{}\n{}", self.title, self.body).trim().to_string()
    }

    pub fn to_test_case(&self) -> TestCase {
        TestCase::new(self.id.clone(), self.category.clone(), self.question())
            .with_source(self.source.clone(), self.url.clone())
    }
}

impl CorpusFile {
    /// Read a corpus file, failing if it is absent or malformed
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| EvalError::CorpusParse(format!("{}: {}", path.display(), e)))
    }

    /// Write the corpus file, refreshing its bookkeeping fields
    pub fn write(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.total_questions = self.questions.len();
        self.scraped_date = Some(chrono::Utc::now().to_rfc3339());

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Convert entries to test cases, dropping repeated questions
    ///
    /// Questions are compared lowercased; the first occurrence wins.
    pub fn to_test_cases(&self) -> Vec<TestCase> {
        let mut seen = HashSet::new();
        let mut cases = Vec::with_capacity(self.questions.len());

        for entry in &self.questions {
            let case = entry.to_test_case();
            if case.question.is_empty() {
                tracing::warn!(id = %entry.id, "Skipping corpus entry with empty question");
                continue;
            }
            if !seen.insert(case.question.to_lowercase()) {
                tracing::debug!(id = %entry.id, "Skipping duplicate question");
                continue;
            }
            cases.push(case);
        }

        cases
    }
}

/// Load test cases from an external corpus file
///
/// A missing file is not an error: it is logged and yields no cases.
pub fn load_external(path: &Path) -> Result<Vec<TestCase>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "No external corpus found");
        return Ok(Vec::new());
    }

    let file = CorpusFile::read(path)?;
    Ok(file.to_test_cases())
}

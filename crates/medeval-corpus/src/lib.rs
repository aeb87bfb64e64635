//! medeval Corpus - evaluation input assembly
//!
//! This crate supplies the ordered list of [`TestCase`]s a run evaluates:
//! the built-in curated set, plus an optional external corpus file of
//! collected patient questions. Free-text question lists can be imported
//! into that file format with automatic categorization, and a seed file of
//! common questions can be written to start one.

pub mod categorize;
pub mod curated;
pub mod external;
pub mod import;
pub mod starter;

pub use categorize::auto_categorize;
pub use curated::curated_cases;
pub use external::{load_external, CorpusEntry, CorpusFile};
pub use import::{entries_from_text, import_text};
pub use starter::{starter_entries, write_starter};

use medeval_core::{Category, Result, TestCase};
use std::collections::HashMap;
use std::path::Path;

/// Assemble the run corpus: curated cases first, then external ones
///
/// Authoring order is preserved within each source.
pub fn assemble(include_curated: bool, external: Option<&Path>) -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();

    if include_curated {
        let curated = curated_cases();
        tracing::info!(count = curated.len(), "Loaded curated test cases");
        cases.extend(curated);
    }

    if let Some(path) = external {
        let loaded = load_external(path)?;
        tracing::info!(count = loaded.len(), path = %path.display(), "Loaded external test cases");
        cases.extend(loaded);
    }

    Ok(cases)
}

/// Per-category case counts, most frequent first (ties by category name)
pub fn category_counts(cases: &[TestCase]) -> Vec<(Category, usize)> {
    let mut counts: HashMap<&Category, usize> = HashMap::new();
    for case in cases {
        *counts.entry(&case.category).or_insert(0) += 1;
    }

    let mut counts: Vec<(Category, usize)> = counts
        .into_iter()
        .map(|(category, count)| (category.clone(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_assemble_curated_only() {
        let cases = assemble(true, None).unwrap();
        assert_eq!(cases.len(), 16);
        assert_eq!(cases[0].id, "common_001");
    }

    #[test]
    fn test_assemble_missing_external_is_empty() {
        let dir = tempdir().unwrap();
        let cases = assemble(false, Some(&dir.path().join("missing.json"))).unwrap();
        assert!(cases.is_empty());
    }

    #[test]
    fn test_assemble_appends_external_after_curated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forum.json");
        std::fs::write(
            &path,
            r#"{"questions": [{"id": "healthboards_0", "title": "Rectal bleeding after straining?", "body": "", "source": "HealthBoards", "url": "https://example.org/t/1", "category": "symptom_identification"}]}"#,
        )
        .unwrap();

        let cases = assemble(true, Some(&path)).unwrap();
        assert_eq!(cases.len(), 17);
        assert_eq!(cases[16].id, "healthboards_0");
    }

    #[test]
    fn test_category_counts_sorted() {
        let counts = category_counts(&curated_cases());
        assert_eq!(counts[0], (Category::WhenToSeeDoctor, 3));
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 16);
    }
}

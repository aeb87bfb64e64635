//! Batch import of free-text questions into a corpus file

use std::path::Path;

use medeval_core::Result;

use crate::categorize::auto_categorize;
use crate::external::{CorpusEntry, CorpusFile};

/// One entry per non-blank line, numbered after `existing` entries
pub fn entries_from_text(text: &str, existing: usize) -> Vec<CorpusEntry> {
    let added = chrono::Utc::now().to_rfc3339();

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| CorpusEntry {
            id: format!("manual_{:03}", existing + i + 1),
            title: line.to_string(),
            body: String::new(),
            source: "Manual".to_string(),
            url: String::new(),
            category: auto_categorize(line),
            added_date: Some(added.clone()),
        })
        .collect()
}

/// Append questions from `text` to the corpus file at `path`
///
/// Creates the file when absent. Returns the number of questions added.
pub fn import_text(text: &str, path: &Path) -> Result<usize> {
    let mut corpus = if path.exists() {
        CorpusFile::read(path)?
    } else {
        CorpusFile::default()
    };

    let entries = entries_from_text(text, corpus.questions.len());
    let added = entries.len();
    corpus.questions.extend(entries);
    corpus.collection_method = Some("manual".to_string());
    corpus.write(path)?;

    tracing::info!(added, total = corpus.questions.len(), path = %path.display(), "Imported questions");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::load_external;
    use medeval_core::Category;
    use tempfile::tempdir;

    #[test]
    fn test_entries_skip_blank_lines() {
        let text = "Can I exercise with hemorrhoids?\n\n   \nHow do I stop straining?\n";
        let entries = entries_from_text(text, 0);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "manual_001");
        assert_eq!(entries[1].id, "manual_002");
        assert_eq!(entries[1].category, Category::Prevention);
        assert_eq!(entries[0].source, "Manual");
    }

    #[test]
    fn test_import_appends_and_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_data/manual_test_cases.json");

        assert_eq!(import_text("What is a fissure?\n", &path).unwrap(), 1);
        assert_eq!(
            import_text("Is coffee bad for constipation?\nHow much fiber should I eat?", &path)
                .unwrap(),
            2
        );

        let corpus = CorpusFile::read(&path).unwrap();
        assert_eq!(corpus.total_questions, 3);
        assert_eq!(corpus.questions[2].id, "manual_003");
        assert_eq!(corpus.collection_method.as_deref(), Some("manual"));

        let cases = load_external(&path).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].category, Category::SymptomIdentification);
    }
}

//! Seed corpus of common patient questions

use std::path::Path;

use medeval_core::{Category, EvalError, Result};

use crate::external::{CorpusEntry, CorpusFile};

const STARTER_QUESTIONS: &[(&str, Category)] = &[
    ("I've had blood on toilet paper for a week, is this normal?", Category::SymptomIdentification),
    ("Can stress cause hemorrhoids to flare up?", Category::General),
    ("I'm constipated and nothing works - tried everything", Category::TreatmentOptions),
    ("Is it OK to push hard when constipated?", Category::Prevention),
    ("How long should I wait before seeing a doctor for hemorrhoids?", Category::WhenToSeeDoctor),
    ("Can I exercise with hemorrhoids?", Category::Lifestyle),
    ("Does drinking coffee make constipation worse?", Category::Lifestyle),
    ("I feel a lump near my anus, should I panic?", Category::SymptomIdentification),
    ("What's the difference between internal and external hemorrhoids?", Category::SymptomIdentification),
    ("Can hemorrhoids cause narrow stools?", Category::SymptomIdentification),
    ("I've been taking MiraLAX daily for months, is that safe?", Category::Medication),
    ("My hemorrhoids itch like crazy at night, what can I do?", Category::TreatmentOptions),
    ("Can you get hemorrhoids from sitting on cold surfaces?", Category::Prevention),
    ("I'm pregnant and constipated, what's safe to take?", Category::Medication),
    ("How much fiber is too much fiber?", Category::Lifestyle),
    ("Can hemorrhoids go away on their own?", Category::General),
    ("I have alternating constipation and diarrhea", Category::SymptomIdentification),
    ("Is bleeding after hemorrhoid banding normal?", Category::TreatmentOptions),
    ("Can spicy food cause hemorrhoids?", Category::Prevention),
    ("I feel like I need to poop but nothing comes out", Category::SymptomIdentification),
];

/// The seed questions as corpus entries, numbered `manual_001` onward
pub fn starter_entries() -> Vec<CorpusEntry> {
    let added = chrono::Utc::now().to_rfc3339();

    STARTER_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, (question, category))| CorpusEntry {
            id: format!("manual_{:03}", i + 1),
            title: question.to_string(),
            body: String::new(),
            source: "Curated".to_string(),
            url: String::new(),
            category: category.clone(),
            added_date: Some(added.clone()),
        })
        .collect()
}

/// Write a fresh corpus file holding the seed questions
///
/// An existing file is only replaced when `overwrite` is set.
pub fn write_starter(path: &Path, overwrite: bool) -> Result<usize> {
    if path.exists() && !overwrite {
        return Err(EvalError::Config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let mut corpus = CorpusFile {
        collection_method: Some("manual".to_string()),
        questions: starter_entries(),
        ..CorpusFile::default()
    };
    corpus.write(path)?;

    tracing::info!(count = corpus.questions.len(), path = %path.display(), "Wrote starter corpus");
    Ok(corpus.questions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::load_external;
    use tempfile::tempdir;

    #[test]
    fn test_starter_loads_as_external_corpus() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_data/manual_test_cases.json");

        assert_eq!(write_starter(&path, false).unwrap(), 20);

        let corpus = CorpusFile::read(&path).unwrap();
        assert_eq!(corpus.total_questions, 20);
        assert_eq!(corpus.questions[19].id, "manual_020");
        assert!(corpus.questions.iter().all(|q| q.source == "Curated"));

        let cases = load_external(&path).unwrap();
        assert_eq!(cases.len(), 20);
        assert_eq!(cases[4].category, Category::WhenToSeeDoctor);
    }

    #[test]
    fn test_existing_file_kept_without_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manual.json");
        std::fs::write(&path, r#"{"questions": []}"#).unwrap();

        let err = write_starter(&path, false).unwrap_err();
        assert!(matches!(err, EvalError::Config(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"questions": []}"#);

        assert_eq!(write_starter(&path, true).unwrap(), 20);
    }
}

//! Keyword-based categorization of free-text questions

use medeval_core::Category;

/// Keyword groups in precedence order; the first group with a hit wins
const CATEGORY_KEYWORDS: &[(&[&str], Category)] = &[
    (
        &["is this", "what is", "do i have", "symptoms"],
        Category::SymptomIdentification,
    ),
    (
        &["how to", "treat", "cure", "remedy", "help"],
        Category::TreatmentOptions,
    ),
    (
        &["should i see", "doctor", "emergency", "urgent"],
        Category::WhenToSeeDoctor,
    ),
    (&["prevent", "avoid", "stop"], Category::Prevention),
    (&["medication", "drug", "prescription"], Category::Medication),
    (&["diet", "food", "fiber", "eat"], Category::Lifestyle),
];

/// Assign a category to a question by case-insensitive substring match
pub fn auto_categorize(text: &str) -> Category {
    let lower = text.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, category)| category.clone())
        .unwrap_or(Category::General)
}

use std::collections::BTreeMap;

use uuid::Uuid;

/// Language used when a label is missing in the requested one
pub const FALLBACK_LANGUAGE: &str = "fr";

/// Incident category reference data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    /// Language code -> display text
    pub labels: BTreeMap<String, String>,
    pub color: String,
    pub display_order: i32,
}

impl Category {
    /// Display label in `lang`, falling back to French, then to the slug
    pub fn label_for(&self, lang: &str) -> &str {
        self.labels
            .get(lang)
            .or_else(|| self.labels.get(FALLBACK_LANGUAGE))
            .map(String::as_str)
            .unwrap_or(&self.slug)
    }
}

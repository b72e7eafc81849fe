use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::categories::models::{Category, FALLBACK_LANGUAGE};

/// Query params for category endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryLanguageQuery {
    /// Language code for `label` (default: fr)
    pub lang: Option<String>,
}

impl CategoryLanguageQuery {
    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(FALLBACK_LANGUAGE)
    }
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub slug: String,
    /// Label in the requested language
    pub label: String,
    pub color: String,
    pub display_order: i32,
}

impl CategoryResponseDto {
    pub fn localized(category: &Category, lang: &str) -> Self {
        Self {
            id: category.id,
            slug: category.slug.clone(),
            label: category.label_for(lang).to_string(),
            color: category.color.clone(),
            display_order: category.display_order,
        }
    }
}

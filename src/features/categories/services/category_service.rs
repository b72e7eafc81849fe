use std::collections::BTreeMap;

use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    slug: String,
    labels: Json<BTreeMap<String, String>>,
    color: String,
    display_order: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            labels: row.labels.0,
            color: row.color,
            display_order: row.display_order,
        }
    }
}

/// Immutable category catalog, loaded once at startup
pub struct CategoryService {
    categories: Vec<Category>,
}

impl CategoryService {
    /// Load the catalog from the `categories` table
    pub async fn load(pool: &PgPool) -> Result<Self> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, slug, labels, color, display_order
            FROM categories
            ORDER BY display_order, slug
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load categories: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Loaded {} categories", rows.len());

        Ok(Self::with_categories(
            rows.into_iter().map(Category::from).collect(),
        ))
    }

    pub fn with_categories(mut categories: Vec<Category>) -> Self {
        categories.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Self { categories }
    }

    /// Catalog used when reports live in the process-local store; mirrors
    /// the rows seeded by the initial migration
    pub fn default_categories() -> Vec<Category> {
        const SEED: &[(u128, &str, &str, &str, &str)] = &[
            (0x0190a000_0000_7000_8000_000000000001, "theft", "Vol", "Theft", "amber"),
            (0x0190a000_0000_7000_8000_000000000002, "assault", "Agression", "Assault", "red"),
            (0x0190a000_0000_7000_8000_000000000003, "fraud", "Fraude", "Fraud", "purple"),
            (0x0190a000_0000_7000_8000_000000000004, "vandalism", "Vandalisme", "Vandalism", "orange"),
            (0x0190a000_0000_7000_8000_000000000005, "trafficking", "Trafic", "Trafficking", "slate"),
            (0x0190a000_0000_7000_8000_000000000006, "other", "Autre", "Other", "gray"),
        ];

        SEED.iter()
            .zip(1..)
            .map(|(&(id, slug, fr, en, color), display_order)| Category {
                id: Uuid::from_u128(id),
                slug: slug.to_string(),
                labels: [("fr", fr), ("en", en)]
                    .into_iter()
                    .map(|(lang, label)| (lang.to_string(), label.to_string()))
                    .collect(),
                color: color.to_string(),
                display_order,
            })
            .collect()
    }

    /// All categories in display order
    pub fn list(&self) -> &[Category] {
        &self.categories
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<&Category> {
        self.categories
            .iter()
            .find(|c| c.slug == slug)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::categories::dtos::{CategoryLanguageQuery, CategoryResponseDto};
use crate::features::categories::services::CategoryService;
use crate::shared::types::ApiResponse;

/// List all categories
#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryLanguageQuery),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<CategoryLanguageQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let dtos: Vec<CategoryResponseDto> = service
        .list()
        .iter()
        .map(|c| CategoryResponseDto::localized(c, query.lang()))
        .collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get category by slug
#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug"),
        CategoryLanguageQuery
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
    Query(query): Query<CategoryLanguageQuery>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_slug(&slug)?;
    let dto = CategoryResponseDto::localized(category, query.lang());
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

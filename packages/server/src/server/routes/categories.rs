//! GET /api/categories?group=&q=

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use crate::domains::categories::{self, Category, CategoryGroup};
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct CategoryQuery {
    group: Option<String>,
    q: Option<String>,
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<&'static Category>,
}

/// Category browse and search. Without a group every category is searched.
pub async fn categories_handler(
    Query(query): Query<CategoryQuery>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let term = query.q.unwrap_or_default();

    let categories = match query.group.as_deref() {
        Some(raw) => {
            let group: CategoryGroup = raw.parse().map_err(ApiError::Validation)?;
            categories::search(group, &term)
        }
        None => [
            CategoryGroup::Nearby,
            CategoryGroup::Women,
            CategoryGroup::Lgbtqia,
        ]
        .into_iter()
        .flat_map(|group| categories::search(group, &term))
        .collect(),
    };

    Ok(Json(CategoriesResponse { categories }))
}

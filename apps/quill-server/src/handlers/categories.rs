use actix_web::{HttpResponse, web};

use quill_shared::dto::CategoriesResponse;

use super::mapping;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories - alphabetical, each with its post count.
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list().await?;

    Ok(HttpResponse::Ok().json(CategoriesResponse {
        categories: categories
            .into_iter()
            .map(mapping::category_with_count)
            .collect(),
    }))
}

use super::engine::AddressResolver;
use super::types::{MatchResult, SearchParams};
use crate::error::ApiError;

use axum::extract::Query;
use axum::{Extension, Json};
use std::sync::Arc;

/// Always answers with an array on success, even for zero or one match.
pub async fn handle_search(
    Extension(resolver): Extension<Arc<AddressResolver>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MatchResult>>, ApiError> {
    let results = resolver
        .search(params.nombre.as_deref(), params.numero.as_deref())
        .await?;
    Ok(Json(results))
}

use super::reports::{
    section_of_street, section_summary, sort_for_listing, statistics, streets_in_section,
};
use super::store::RecordStore;
use super::types::{
    DeleteResponse, DirectoryEntry, DirectoryStats, HealthResponse, NewEntry, SectionSummary,
    StreetSection,
};
use crate::error::ApiError;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

pub type SharedStore = Arc<dyn RecordStore>;

#[derive(Debug, Default, Deserialize)]
pub struct StreetLookupParams {
    pub nombre_calle: Option<String>,
    pub seccion: Option<String>,
}

/// Malformed bodies (including unknown `paridad` codes) are invalid requests.
fn parse_body(payload: Result<Json<NewEntry>, JsonRejection>) -> Result<NewEntry, ApiError> {
    let Json(entry) = payload.map_err(|rejection| ApiError::invalid(rejection.body_text()))?;
    entry.validate().map_err(ApiError::InvalidRequest)?;
    Ok(entry)
}

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::invalid(format!("Invalid id '{}'", raw)))
}

pub async fn handle_get_entry(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<DirectoryEntry>, ApiError> {
    let id = parse_id(&id)?;
    match store.get(id)? {
        Some(entry) => Ok(Json(entry)),
        None => Err(ApiError::not_found(format!("Street {} not found", id))),
    }
}

/// Exactly one of `nombre_calle` (exact match, first hit) or `seccion`.
pub async fn handle_street_lookup(
    Extension(store): Extension<SharedStore>,
    Query(params): Query<StreetLookupParams>,
) -> Result<Response, ApiError> {
    let name = params.nombre_calle.filter(|s| !s.is_empty());
    let section = params.seccion.filter(|s| !s.trim().is_empty());

    match (name, section) {
        (Some(_), Some(_)) => Err(ApiError::invalid(
            "Provide only one parameter: 'nombre_calle' or 'seccion', not both",
        )),
        (None, None) => Err(ApiError::invalid(
            "One of 'nombre_calle' or 'seccion' is required",
        )),
        (Some(name), None) => {
            let rows = store.all()?;
            let hit: StreetSection = section_of_street(&rows, &name)
                .ok_or_else(|| ApiError::not_found(format!("Street '{}' not found", name)))?;
            Ok(Json(hit).into_response())
        }
        (None, Some(raw)) => {
            let section: u32 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::invalid(format!("Invalid seccion '{}'", raw)))?;
            let streets = streets_in_section(&store.all()?, section);
            if streets.is_empty() {
                return Err(ApiError::not_found(format!(
                    "No streets registered in section '{}'",
                    section
                )));
            }
            Ok(Json(streets).into_response())
        }
    }
}

pub async fn handle_list_entries(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Vec<DirectoryEntry>>, ApiError> {
    let mut rows = store.all()?;
    sort_for_listing(&mut rows);
    Ok(Json(rows))
}

pub async fn handle_create_entry(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<DirectoryEntry>), ApiError> {
    let req = parse_body(payload)?;
    let entry = store.insert(req)?;
    tracing::info!(
        "Created street {} ({} {}, section {})",
        entry.id,
        entry.street_type,
        entry.street_name,
        entry.section
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn handle_update_entry(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> Result<Json<DirectoryEntry>, ApiError> {
    let id = parse_id(&id)?;
    let req = parse_body(payload)?;
    match store.replace(id, req)? {
        Some(entry) => {
            tracing::info!("Updated street {}", id);
            Ok(Json(entry))
        }
        None => Err(ApiError::not_found(format!("Street {} not found", id))),
    }
}

pub async fn handle_delete_entry(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id)?;
    match store.remove(id)? {
        Some(_) => {
            tracing::info!("Deleted street {}", id);
            Ok(Json(DeleteResponse {
                message: "Street deleted".to_string(),
            }))
        }
        None => Err(ApiError::not_found(format!("Street {} not found", id))),
    }
}

pub async fn handle_sections(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Vec<SectionSummary>>, ApiError> {
    Ok(Json(section_summary(&store.all()?)))
}

pub async fn handle_stats(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<DirectoryStats>, ApiError> {
    Ok(Json(statistics(&store.all()?)))
}

pub async fn handle_health(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        entries: store.count()?,
    }))
}

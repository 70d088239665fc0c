//! Address resolution pipeline: normalize, match, enrich, compose.

use super::enricher::CoordinateEnricher;
use super::matcher::{StreetFilter, find_matches};
use super::normalizer::QueryNormalizer;
use super::types::MatchResult;
use crate::directory::store::RecordStore;
use crate::error::ApiError;

use std::sync::Arc;

/// Validated search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub street: String,
    pub house_number: Option<i32>,
}

impl SearchRequest {
    /// `nombre` must be non-blank. `numero` is optional, but when present and
    /// non-blank it must be an integer; anything else is rejected.
    pub fn parse(nombre: Option<&str>, numero: Option<&str>) -> Result<Self, ApiError> {
        let street = nombre.map(str::trim).unwrap_or_default();
        if street.is_empty() {
            return Err(ApiError::invalid("The street name ('nombre') is required"));
        }

        let house_number = match numero.map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                ApiError::invalid(format!(
                    "House number ('numero') must be an integer, got '{}'",
                    raw
                ))
            })?),
        };

        Ok(Self {
            street: street.to_string(),
            house_number,
        })
    }
}

pub struct AddressResolver {
    store: Arc<dyn RecordStore>,
    normalizer: QueryNormalizer,
    enricher: CoordinateEnricher,
}

impl AddressResolver {
    pub fn new(
        store: Arc<dyn RecordStore>,
        normalizer: QueryNormalizer,
        enricher: CoordinateEnricher,
    ) -> Self {
        Self {
            store,
            normalizer,
            enricher,
        }
    }

    /// Resolves a raw query. Invalid input and store faults are errors; no
    /// match is an empty list; geocoding faults only null out coordinates.
    pub async fn search(
        &self,
        nombre: Option<&str>,
        numero: Option<&str>,
    ) -> Result<Vec<MatchResult>, ApiError> {
        let request = SearchRequest::parse(nombre, numero)?;
        self.resolve(&request).await
    }

    pub async fn resolve(&self, request: &SearchRequest) -> Result<Vec<MatchResult>, ApiError> {
        let query = self.normalizer.normalize(&request.street);
        tracing::debug!(
            "Normalized '{}' to type={:?} name='{}'",
            request.street,
            query.type_token,
            query.residual_name
        );

        let filter = StreetFilter::new(&query, request.house_number);
        let matches = find_matches(self.store.as_ref(), &filter)?;

        if matches.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.enricher.enrich(matches, request.house_number).await;
        let located = results.iter().filter(|r| r.has_coordinates()).count();
        tracing::info!(
            "Search '{}' number={:?}: {} matches, {} located",
            request.street,
            request.house_number,
            results.len(),
            located
        );
        Ok(results)
    }
}

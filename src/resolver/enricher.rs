//! Coordinate Enricher
//!
//! Attaches coordinates to every matched entry. One lookup task is spawned
//! per entry and all of them are joined; a failed lookup only clears the
//! coordinates of its own entry.

use super::geocoder::{Coordinates, Geocoder};
use super::types::MatchResult;
use crate::directory::types::DirectoryEntry;

use std::sync::Arc;

/// Street type used in the geocoding query when the entry has none.
const FALLBACK_STREET_TYPE: &str = "CALLE";

/// How one lookup ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Coordinates),
    /// The service answered without any candidate.
    NoCandidate,
    Failed(String),
}

impl LookupOutcome {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LookupOutcome::Found(c) => Some(*c),
            _ => None,
        }
    }
}

pub struct CoordinateEnricher {
    geocoder: Arc<dyn Geocoder>,
    /// Municipality and region appended to every address.
    region: String,
}

impl CoordinateEnricher {
    pub fn new(geocoder: Arc<dyn Geocoder>, region: impl Into<String>) -> Self {
        Self {
            geocoder,
            region: region.into(),
        }
    }

    /// Address string for one entry: the queried number when given, else the
    /// midpoint of the entry's range.
    pub fn address_for(&self, entry: &DirectoryEntry, house_number: Option<i32>) -> String {
        let street_type = match entry.street_type.trim() {
            "" => FALLBACK_STREET_TYPE,
            t => t,
        };
        let number = house_number.unwrap_or_else(|| entry.midpoint());
        format!(
            "{} {} {}, {}",
            street_type,
            entry.street_name.trim(),
            number,
            self.region
        )
    }

    /// Runs every lookup concurrently and reports each outcome in input order.
    pub async fn lookup_all(&self, addresses: Vec<String>) -> Vec<LookupOutcome> {
        let handles: Vec<_> = addresses
            .into_iter()
            .map(|address| {
                let geocoder = self.geocoder.clone();
                tokio::spawn(async move {
                    match geocoder.geocode(&address).await {
                        Ok(Some(coords)) => LookupOutcome::Found(coords),
                        Ok(None) => LookupOutcome::NoCandidate,
                        Err(e) => LookupOutcome::Failed(format!("{} ({:#})", address, e)),
                    }
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => LookupOutcome::Failed(format!("lookup task aborted: {}", e)),
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    pub async fn enrich(
        &self,
        entries: Vec<DirectoryEntry>,
        house_number: Option<i32>,
    ) -> Vec<MatchResult> {
        let addresses = entries
            .iter()
            .map(|entry| self.address_for(entry, house_number))
            .collect();
        let outcomes = self.lookup_all(addresses).await;

        entries
            .into_iter()
            .zip(outcomes)
            .map(|(entry, outcome)| {
                match &outcome {
                    LookupOutcome::Failed(reason) => {
                        tracing::warn!("Geocoding failed for entry {}: {}", entry.id, reason)
                    }
                    LookupOutcome::NoCandidate => {
                        tracing::debug!("No geocoding candidate for entry {}", entry.id)
                    }
                    LookupOutcome::Found(_) => {}
                }

                let mut result = MatchResult::without_coordinates(entry);
                if let Some(coords) = outcome.coordinates() {
                    result.latitud = Some(coords.latitude);
                    result.longitud = Some(coords.longitude);
                }
                result
            })
            .collect()
    }
}

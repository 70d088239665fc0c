//! Range & Parity Matcher
//!
//! Turns a normalized query plus an optional house number into a
//! [`StreetFilter`] and runs it against the record store.

use super::normalizer::NormalizedQuery;
use crate::directory::store::RecordStore;
use crate::directory::types::DirectoryEntry;

use anyhow::Result;

/// Structured query handed to [`RecordStore::find`]. All active conditions
/// must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetFilter {
    /// Lowercased name fragment, matched as a substring.
    name_fragment: String,
    /// Uppercased street type, matched exactly.
    street_type: Option<String>,
    /// Enables the range and parity conditions.
    house_number: Option<i32>,
}

impl StreetFilter {
    pub fn new(query: &NormalizedQuery, house_number: Option<i32>) -> Self {
        Self {
            name_fragment: query.residual_name.to_lowercase(),
            street_type: query.type_token.as_ref().map(|t| t.to_uppercase()),
            house_number,
        }
    }

    pub fn house_number(&self) -> Option<i32> {
        self.house_number
    }

    /// Entries with an inverted range or a parity that contradicts the
    /// number are excluded without being reported; records are assumed
    /// validated on write.
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        if !entry.street_name.to_lowercase().contains(&self.name_fragment) {
            return false;
        }

        if let Some(street_type) = &self.street_type {
            if entry.street_type.trim().to_uppercase() != *street_type {
                return false;
            }
        }

        match self.house_number {
            Some(n) => {
                entry.number_start <= n && entry.number_end >= n && entry.parity.admits(n)
            }
            None => true,
        }
    }
}

/// Every stored entry matching the filter. An empty result is not an error.
pub fn find_matches(
    store: &dyn RecordStore,
    filter: &StreetFilter,
) -> Result<Vec<DirectoryEntry>> {
    let rows = store.find(filter)?;
    tracing::debug!("Filter {:?} matched {} entries", filter, rows.len());
    Ok(rows)
}

use crate::directory::types::{DirectoryEntry, Parity};
use serde::{Deserialize, Serialize};

/// Query string of the search endpoint. Both fields are optional at the
/// extractor level so that a missing `nombre` is reported as an invalid
/// request instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub nombre: Option<String>,
    pub numero: Option<String>,
}

/// A matched directory entry with the coordinates found for it, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: u64,
    pub seccion: u32,
    pub tipo_via: String,
    pub nombre_calle: String,
    pub numero_inicio: i32,
    pub numero_fin: i32,
    pub paridad: Parity,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

impl MatchResult {
    pub fn without_coordinates(entry: DirectoryEntry) -> Self {
        Self {
            id: entry.id,
            seccion: entry.section,
            tipo_via: entry.street_type,
            nombre_calle: entry.street_name,
            numero_inicio: entry.number_start,
            numero_fin: entry.number_end,
            paridad: entry.parity,
            latitud: None,
            longitud: None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitud.is_some() && self.longitud.is_some()
    }
}

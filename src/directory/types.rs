//! Directory Data Types
//!
//! Records stored in the street directory and the payloads used to create or
//! replace them. Wire names follow the municipal census column names
//! (`seccion`, `tipo_via`, ...), Rust names are descriptive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which house numbers of a range an entry covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parity {
    /// Impares: odd numbers only.
    #[serde(rename = "I")]
    Odd,
    /// Pares: even numbers only.
    #[serde(rename = "P")]
    Even,
    /// Ambos: every number in the range.
    #[default]
    #[serde(rename = "A")]
    Both,
}

impl Parity {
    pub fn code(&self) -> &'static str {
        match self {
            Parity::Odd => "I",
            Parity::Even => "P",
            Parity::Both => "A",
        }
    }

    /// Whether a concrete house number is represented by this parity code.
    pub fn admits(&self, number: i32) -> bool {
        let is_even = number % 2 == 0;
        match self {
            Parity::Both => true,
            Parity::Even => is_even,
            Parity::Odd => !is_even,
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One address-range record: a street segment with a house-number interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: u64,
    #[serde(rename = "seccion")]
    pub section: u32,
    #[serde(rename = "tipo_via", default)]
    pub street_type: String,
    #[serde(rename = "nombre_calle")]
    pub street_name: String,
    #[serde(rename = "numero_inicio")]
    pub number_start: i32,
    #[serde(rename = "numero_fin")]
    pub number_end: i32,
    #[serde(rename = "paridad", default)]
    pub parity: Parity,
}

impl DirectoryEntry {
    pub fn from_new(id: u64, new: NewEntry) -> Self {
        Self {
            id,
            section: new.section,
            street_type: new.street_type,
            street_name: new.street_name,
            number_start: new.number_start,
            number_end: new.number_end,
            parity: new.parity.unwrap_or_default(),
        }
    }

    /// Floor midpoint of the number range, used as a representative house
    /// number when the query did not name one.
    pub fn midpoint(&self) -> i32 {
        let sum = i64::from(self.number_start) + i64::from(self.number_end);
        sum.div_euclid(2) as i32
    }
}

/// Payload for creating or replacing an entry. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    #[serde(rename = "seccion")]
    pub section: u32,
    #[serde(rename = "tipo_via", default)]
    pub street_type: String,
    #[serde(rename = "nombre_calle")]
    pub street_name: String,
    #[serde(rename = "numero_inicio")]
    pub number_start: i32,
    #[serde(rename = "numero_fin")]
    pub number_end: i32,
    #[serde(rename = "paridad", default)]
    pub parity: Option<Parity>,
}

impl NewEntry {
    /// Write-time checks. The matcher itself never validates records, so
    /// inverted ranges are refused here instead.
    pub fn validate(&self) -> Result<(), String> {
        if self.section == 0 {
            return Err("seccion must be a positive integer".to_string());
        }
        if self.street_name.trim().is_empty() {
            return Err("nombre_calle must not be empty".to_string());
        }
        if self.number_start > self.number_end {
            return Err(format!(
                "numero_inicio ({}) must not exceed numero_fin ({})",
                self.number_start, self.number_end
            ));
        }
        Ok(())
    }
}

/// Street name with the section it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetSection {
    pub nombre_calle: String,
    pub seccion: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionCount {
    pub calles: usize,
}

/// One row of the admin section summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    pub seccion: u32,
    #[serde(rename = "_count")]
    pub count: SectionCount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionBucket {
    pub seccion: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreetTypeBucket {
    pub tipo_via: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParityBucket {
    pub paridad: Parity,
    pub count: usize,
}

/// Aggregate figures over the whole directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryStats {
    pub total_calles: usize,
    pub total_secciones: usize,
    /// Distinct `(tipo_via, nombre_calle)` pairs.
    pub calles_unicas: usize,
    pub tipos_via: usize,
    pub por_seccion: Vec<SectionBucket>,
    pub por_tipo_via: Vec<StreetTypeBucket>,
    pub por_paridad: Vec<ParityBucket>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub entries: usize,
}

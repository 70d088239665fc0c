//! Aggregations over the whole directory: admin listing order, section
//! summary, street-to-section lookups and statistics.

use super::types::{
    DirectoryEntry, DirectoryStats, Parity, ParityBucket, SectionBucket, SectionCount,
    SectionSummary, StreetSection, StreetTypeBucket,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Admin listing order: section, then street name.
pub fn sort_for_listing(rows: &mut [DirectoryEntry]) {
    rows.sort_by(|a, b| {
        a.section
            .cmp(&b.section)
            .then_with(|| a.street_name.cmp(&b.street_name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn count_by_section(rows: &[DirectoryEntry]) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.section).or_insert(0) += 1;
    }
    counts
}

/// Entry count per section, ascending by section.
pub fn section_summary(rows: &[DirectoryEntry]) -> Vec<SectionSummary> {
    count_by_section(rows)
        .into_iter()
        .map(|(seccion, calles)| SectionSummary {
            seccion,
            count: SectionCount { calles },
        })
        .collect()
}

/// First entry whose name equals `name` exactly, in id order.
pub fn section_of_street(rows: &[DirectoryEntry], name: &str) -> Option<StreetSection> {
    rows.iter()
        .find(|row| row.street_name == name)
        .map(|row| StreetSection {
            nombre_calle: row.street_name.clone(),
            seccion: row.section,
        })
}

pub fn streets_in_section(rows: &[DirectoryEntry], section: u32) -> Vec<StreetSection> {
    rows.iter()
        .filter(|row| row.section == section)
        .map(|row| StreetSection {
            nombre_calle: row.street_name.clone(),
            seccion: row.section,
        })
        .collect()
}

pub fn statistics(rows: &[DirectoryEntry]) -> DirectoryStats {
    let por_seccion: Vec<SectionBucket> = count_by_section(rows)
        .into_iter()
        .map(|(seccion, count)| SectionBucket { seccion, count })
        .collect();

    let unique_streets: HashSet<(&str, &str)> = rows
        .iter()
        .map(|row| (row.street_type.as_str(), row.street_name.as_str()))
        .collect();

    let mut by_type: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *by_type.entry(row.street_type.as_str()).or_insert(0) += 1;
    }
    let mut por_tipo_via: Vec<StreetTypeBucket> = by_type
        .into_iter()
        .map(|(tipo_via, count)| StreetTypeBucket {
            tipo_via: tipo_via.to_string(),
            count,
        })
        .collect();
    por_tipo_via.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tipo_via.cmp(&b.tipo_via)));

    let mut by_parity: BTreeMap<Parity, usize> = BTreeMap::new();
    for row in rows {
        *by_parity.entry(row.parity).or_insert(0) += 1;
    }
    let mut por_paridad: Vec<ParityBucket> = by_parity
        .into_iter()
        .map(|(paridad, count)| ParityBucket { paridad, count })
        .collect();
    // Codes sort alphabetically (A, I, P), not in enum order.
    por_paridad.sort_by_key(|bucket| bucket.paridad.code());

    DirectoryStats {
        total_calles: rows.len(),
        total_secciones: por_seccion.len(),
        calles_unicas: unique_streets.len(),
        tipos_via: por_tipo_via.len(),
        por_seccion,
        por_tipo_via,
        por_paridad,
    }
}

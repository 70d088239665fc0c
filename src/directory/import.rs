//! SQL Dump Importer
//!
//! Loads directory rows from a census SQL dump. Only single-row
//! `INSERT INTO ... VALUES (seccion, 'tipo_via', 'nombre_calle', inicio, fin)`
//! statements are understood; every other line is ignored.

use super::store::RecordStore;
use super::types::NewEntry;

use anyhow::Result;
use regex::Regex;

const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// `INSERT INTO` lines found in the dump.
    pub statements: usize,
    pub imported: usize,
    /// Statements that did not match the expected shape or failed validation.
    pub skipped: usize,
    /// Store size after the import.
    pub total: usize,
}

fn insert_pattern() -> Result<Regex> {
    Ok(Regex::new(
        r"(?i)VALUES\s*\(\s*(\d+)\s*,\s*'([^']*)'\s*,\s*'([^']+)'\s*,\s*(-?\d+)\s*,\s*(-?\d+)\s*\)",
    )?)
}

/// Extracts the entry encoded in one `INSERT` statement. Imported rows cover
/// both parities.
pub fn parse_insert(re: &Regex, line: &str) -> Option<NewEntry> {
    let caps = re.captures(line)?;
    Some(NewEntry {
        section: caps.get(1)?.as_str().parse().ok()?,
        street_type: caps.get(2)?.as_str().to_string(),
        street_name: caps.get(3)?.as_str().to_string(),
        number_start: caps.get(4)?.as_str().parse().ok()?,
        number_end: caps.get(5)?.as_str().parse().ok()?,
        parity: None,
    })
}

/// Inserts every well-formed statement of `sql` into the store as one batch.
/// A store failure aborts the import; malformed lines are only counted.
pub fn import_sql_dump(sql: &str, store: &dyn RecordStore) -> Result<ImportReport> {
    let re = insert_pattern()?;
    let statements: Vec<&str> = sql
        .lines()
        .map(str::trim)
        .filter(|line| line.to_uppercase().starts_with("INSERT INTO"))
        .collect();

    tracing::info!("Found {} records to import", statements.len());

    let mut report = ImportReport {
        statements: statements.len(),
        ..ImportReport::default()
    };
    let mut accepted = Vec::with_capacity(statements.len());

    for line in statements {
        let Some(entry) = parse_insert(&re, line) else {
            tracing::warn!("Skipping unrecognised statement: {}", line);
            report.skipped += 1;
            continue;
        };
        if let Err(reason) = entry.validate() {
            tracing::warn!("Skipping invalid row ({}): {}", reason, line);
            report.skipped += 1;
            continue;
        }

        accepted.push(entry);
        if accepted.len() % PROGRESS_EVERY == 0 {
            tracing::info!("Parsed {}/{} records...", accepted.len(), report.statements);
        }
    }

    if !accepted.is_empty() {
        report.imported = store.insert_many(accepted)?.len();
    }

    report.total = store.count()?;
    tracing::info!(
        "Import finished: {} inserted, {} skipped, {} entries in the directory",
        report.imported,
        report.skipped,
        report.total
    );
    Ok(report)
}

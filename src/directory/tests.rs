//! Directory Module Tests
//!
//! Validates the record store, the admin reports, the SQL importer and the
//! CRUD handlers.
//!
//! ## Test Scopes
//! - **MemoryStore**: id assignment, replace/remove semantics, snapshot persistence.
//! - **Reports**: listing order, section summary, statistics.
//! - **Import**: statement parsing and skip accounting.
//! - **Handlers**: status codes for the CRUD and lookup endpoints.

#[cfg(test)]
mod tests {
    use crate::directory::handlers::*;
    use crate::directory::import::{ImportReport, import_sql_dump};
    use crate::directory::reports::{
        section_of_street, section_summary, sort_for_listing, statistics, streets_in_section,
    };
    use crate::directory::store::{MemoryStore, RecordStore};
    use crate::directory::types::{DirectoryEntry, NewEntry, Parity};
    use crate::error::ApiError;
    use crate::resolver::matcher::StreetFilter;
    use crate::resolver::normalizer::QueryNormalizer;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::{Extension, Json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn new_entry(section: u32, street_type: &str, name: &str, range: (i32, i32)) -> NewEntry {
        NewEntry {
            section,
            street_type: street_type.to_string(),
            street_name: name.to_string(),
            number_start: range.0,
            number_end: range.1,
            parity: None,
        }
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(new_entry(3, "CALLE", "Real", (1, 99))).unwrap();
        store
            .insert(NewEntry {
                parity: Some(Parity::Even),
                ..new_entry(1, "AVENIDA", "Andalucía", (2, 48))
            })
            .unwrap();
        store
            .insert(NewEntry {
                parity: Some(Parity::Odd),
                ..new_entry(1, "AVENIDA", "Andalucía", (1, 47))
            })
            .unwrap();
        store.insert(new_entry(1, "PLAZA", "Constitución", (1, 12))).unwrap();
        store
    }

    fn shared(store: MemoryStore) -> SharedStore {
        Arc::new(store)
    }

    // ============================================================
    // MEMORY STORE TESTS
    // ============================================================

    #[test]
    fn test_insert_assigns_sequential_ids_and_default_parity() {
        let store = MemoryStore::new();

        let a = store.insert(new_entry(1, "CALLE", "Real", (1, 9))).unwrap();
        let b = store.insert(new_entry(1, "CALLE", "Nueva", (1, 9))).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.parity, Parity::Both);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_replace_and_remove_unknown_id() {
        let store = seeded();

        assert!(store.replace(99, new_entry(1, "CALLE", "X", (1, 2))).unwrap().is_none());
        assert!(store.remove(99).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 4);
    }

    #[test]
    fn test_replace_keeps_id() {
        let store = seeded();

        let updated = store
            .replace(1, new_entry(5, "RONDA", "Norte", (2, 8)))
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(store.get(1).unwrap(), Some(updated));
    }

    #[test]
    fn test_find_returns_rows_in_id_order() {
        let store = seeded();
        let query = QueryNormalizer::default().normalize("andalucía");

        let rows = store.find(&StreetFilter::new(&query, None)).unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();

        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callejero.json");

        {
            let store = MemoryStore::open(&path).unwrap();
            store.insert(new_entry(1, "CALLE", "Real", (1, 9))).unwrap();
            store.insert(new_entry(2, "CALLE", "Nueva", (1, 9))).unwrap();
            store.remove(1).unwrap();
        }

        let reopened = MemoryStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
        assert_eq!(reopened.get(2).unwrap().unwrap().street_name, "Nueva");

        // Ids keep increasing after a reload
        let next = reopened.insert(new_entry(2, "CALLE", "Alta", (1, 9))).unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn test_failed_flush_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("callejero.json");
        let store = MemoryStore::open(&path).unwrap();

        let result = store.insert(new_entry(1, "CALLE", "Real", (1, 9)));

        assert!(result.is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_many_is_all_or_nothing() {
        let store = seeded();

        let result = store.insert_many(vec![
            new_entry(2, "CALLE", "Buena", (1, 9)),
            new_entry(2, "CALLE", "Invertida", (9, 1)),
        ]);

        assert!(result.is_err());
        assert_eq!(store.count().unwrap(), 4);

        let rows = store
            .insert_many(vec![
                new_entry(2, "CALLE", "Buena", (1, 9)),
                new_entry(2, "CALLE", "Otra", (2, 8)),
            ])
            .unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 6]);
        assert_eq!(store.insert(new_entry(2, "CALLE", "Siguiente", (1, 3))).unwrap().id, 7);
    }

    #[test]
    fn test_open_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callejero.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(MemoryStore::open(&path).is_err());
    }

    // ============================================================
    // TYPES TESTS
    // ============================================================

    #[test]
    fn test_parity_codes_round_trip_through_json() {
        let entry: NewEntry = serde_json::from_str(
            r#"{"seccion": 2, "tipo_via": "CALLE", "nombre_calle": "Real",
                "numero_inicio": 1, "numero_fin": 9, "paridad": "I"}"#,
        )
        .unwrap();
        assert_eq!(entry.parity, Some(Parity::Odd));

        let defaulted: NewEntry = serde_json::from_str(
            r#"{"seccion": 2, "nombre_calle": "Real", "numero_inicio": 1, "numero_fin": 9}"#,
        )
        .unwrap();
        assert_eq!(defaulted.parity, None);
        assert_eq!(defaulted.street_type, "");

        let unknown = serde_json::from_str::<NewEntry>(
            r#"{"seccion": 2, "nombre_calle": "Real", "numero_inicio": 1, "numero_fin": 9,
                "paridad": "X"}"#,
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        assert!(new_entry(1, "CALLE", "Real", (10, 2)).validate().is_err());
        assert!(new_entry(0, "CALLE", "Real", (1, 2)).validate().is_err());
        assert!(new_entry(1, "CALLE", "  ", (1, 2)).validate().is_err());
        assert!(new_entry(1, "CALLE", "Real", (4, 4)).validate().is_ok());
    }

    // ============================================================
    // REPORT TESTS
    // ============================================================

    #[test]
    fn test_listing_orders_by_section_then_name() {
        let mut rows = seeded().all().unwrap();
        sort_for_listing(&mut rows);

        let order: Vec<(u32, &str)> = rows
            .iter()
            .map(|r| (r.section, r.street_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, "Andalucía"),
                (1, "Andalucía"),
                (1, "Constitución"),
                (3, "Real"),
            ]
        );
    }

    #[test]
    fn test_section_summary_counts() {
        let summary = section_summary(&seeded().all().unwrap());

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].seccion, 1);
        assert_eq!(summary[0].count.calles, 3);
        assert_eq!(summary[1].seccion, 3);
        assert_eq!(summary[1].count.calles, 1);

        let json = serde_json::to_value(&summary[0]).unwrap();
        assert_eq!(json["_count"]["calles"], 3);
    }

    #[test]
    fn test_street_section_lookups() {
        let rows = seeded().all().unwrap();

        let hit = section_of_street(&rows, "Real").unwrap();
        assert_eq!(hit.seccion, 3);
        assert!(section_of_street(&rows, "real").is_none(), "exact match only");

        assert_eq!(streets_in_section(&rows, 1).len(), 3);
        assert!(streets_in_section(&rows, 9).is_empty());
    }

    #[test]
    fn test_statistics() {
        let stats = statistics(&seeded().all().unwrap());

        assert_eq!(stats.total_calles, 4);
        assert_eq!(stats.total_secciones, 2);
        assert_eq!(stats.calles_unicas, 3);
        assert_eq!(stats.tipos_via, 3);
        assert_eq!(stats.por_tipo_via[0].tipo_via, "AVENIDA");
        assert_eq!(stats.por_tipo_via[0].count, 2);
        // Ties broken by name
        assert_eq!(stats.por_tipo_via[1].tipo_via, "CALLE");
        assert_eq!(stats.por_tipo_via[2].tipo_via, "PLAZA");

        let parity: Vec<(&str, usize)> = stats
            .por_paridad
            .iter()
            .map(|b| (b.paridad.code(), b.count))
            .collect();
        assert_eq!(parity, vec![("A", 2), ("I", 1), ("P", 1)]);
    }

    #[test]
    fn test_statistics_on_empty_directory() {
        let stats = statistics(&[]);

        assert_eq!(stats.total_calles, 0);
        assert_eq!(stats.total_secciones, 0);
        assert!(stats.por_seccion.is_empty());
    }

    // ============================================================
    // IMPORT TESTS
    // ============================================================

    const DUMP: &str = "\
-- census export
CREATE TABLE callejero (seccion int, tipo_via text, nombre_calle text, numero_inicio int, numero_fin int);
INSERT INTO callejero VALUES (1, 'CALLE', 'Real', 1, 99);
INSERT INTO callejero VALUES (2, 'AVENIDA', 'Andalucía', 2, 48);
insert into callejero values (3,'PLAZA','Constitución',1,12);
INSERT INTO callejero VALUES (4, 'CALLE', 'Rota', 50, 10);
INSERT INTO callejero VALUES ('x', 'CALLE', 'Mala', 1, 2);
";

    #[test]
    fn test_import_sql_dump() {
        let store = MemoryStore::new();

        let report = import_sql_dump(DUMP, &store).unwrap();

        assert_eq!(
            report,
            ImportReport {
                statements: 5,
                imported: 3,
                skipped: 2,
                total: 3,
            }
        );
        let rows = store.all().unwrap();
        assert_eq!(rows[1].street_name, "Andalucía");
        assert_eq!(rows[1].section, 2);
        assert!(rows.iter().all(|r| r.parity == Parity::Both));
    }

    #[test]
    fn test_import_appends_to_existing_rows() {
        let store = seeded();

        let report = import_sql_dump(DUMP, &store).unwrap();

        assert_eq!(report.total, 7);
    }

    /// Counts the write calls the importer makes against a memory store.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        single_inserts: AtomicUsize,
        batches: AtomicUsize,
    }

    impl RecordStore for CountingStore {
        fn find(&self, filter: &StreetFilter) -> anyhow::Result<Vec<DirectoryEntry>> {
            self.inner.find(filter)
        }
        fn get(&self, id: u64) -> anyhow::Result<Option<DirectoryEntry>> {
            self.inner.get(id)
        }
        fn all(&self) -> anyhow::Result<Vec<DirectoryEntry>> {
            self.inner.all()
        }
        fn insert(&self, entry: NewEntry) -> anyhow::Result<DirectoryEntry> {
            self.single_inserts.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(entry)
        }
        fn insert_many(&self, entries: Vec<NewEntry>) -> anyhow::Result<Vec<DirectoryEntry>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            self.inner.insert_many(entries)
        }
        fn replace(&self, id: u64, entry: NewEntry) -> anyhow::Result<Option<DirectoryEntry>> {
            self.inner.replace(id, entry)
        }
        fn remove(&self, id: u64) -> anyhow::Result<Option<DirectoryEntry>> {
            self.inner.remove(id)
        }
        fn count(&self) -> anyhow::Result<usize> {
            self.inner.count()
        }
    }

    #[test]
    fn test_import_writes_one_batch() {
        let dump: String = (1..=500)
            .map(|n| {
                format!(
                    "INSERT INTO callejero VALUES ({}, 'CALLE', 'Calle {}', 1, 99);\n",
                    n % 7 + 1,
                    n
                )
            })
            .collect();
        let store = CountingStore::default();

        let report = import_sql_dump(&dump, &store).unwrap();

        assert_eq!(report.imported, 500);
        assert_eq!(store.batches.load(Ordering::SeqCst), 1);
        assert_eq!(store.single_inserts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_import_of_only_bad_rows_writes_nothing() {
        let store = CountingStore::default();

        let dump = "INSERT INTO callejero VALUES (0, 'CALLE', 'X', 1, 2);";

        let report = import_sql_dump(dump, &store).unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(store.batches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_imported_batch_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("callejero.json");

        {
            let store = MemoryStore::open(&path).unwrap();
            store.insert(new_entry(9, "CALLE", "Previa", (1, 9))).unwrap();
            import_sql_dump(DUMP, &store).unwrap();
        }

        let reopened = MemoryStore::open(&path).unwrap();
        let ids: Vec<u64> = reopened.all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(reopened.get(4).unwrap().unwrap().street_name, "Constitución");
    }

    // ============================================================
    // HANDLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_get_entry_status_codes() {
        let store = shared(seeded());

        let Json(entry) = handle_get_entry(Extension(store.clone()), Path("2".to_string()))
            .await
            .unwrap();
        assert_eq!(entry.street_name, "Andalucía");

        let missing = handle_get_entry(Extension(store.clone()), Path("42".to_string()))
            .await
            .unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let malformed = handle_get_entry(Extension(store), Path("abc".to_string()))
            .await
            .unwrap_err();
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_entry() {
        let store = shared(MemoryStore::new());

        let (status, Json(created)) = handle_create_entry(
            Extension(store.clone()),
            Ok(Json(new_entry(4, "PASEO", "Marítimo", (1, 31)))),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.parity, Parity::Both);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_range() {
        let store = shared(MemoryStore::new());

        let err = handle_create_entry(
            Extension(store.clone()),
            Ok(Json(new_entry(4, "PASEO", "Marítimo", (31, 1)))),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete_entry() {
        let store = shared(seeded());

        let Json(updated) = handle_update_entry(
            Extension(store.clone()),
            Path("1".to_string()),
            Ok(Json(new_entry(3, "CALLE", "Real Alta", (1, 99)))),
        )
        .await
        .unwrap();
        assert_eq!(updated.street_name, "Real Alta");

        let missing = handle_update_entry(
            Extension(store.clone()),
            Path("77".to_string()),
            Ok(Json(new_entry(3, "CALLE", "X", (1, 2)))),
        )
        .await
        .unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let Json(deleted) = handle_delete_entry(Extension(store.clone()), Path("1".to_string()))
            .await
            .unwrap();
        assert!(!deleted.message.is_empty());
        assert!(store.get(1).unwrap().is_none());

        let again = handle_delete_entry(Extension(store), Path("1".to_string()))
            .await
            .unwrap_err();
        assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
    }

    async fn lookup_error(store: &SharedStore, params: StreetLookupParams) -> ApiError {
        match handle_street_lookup(Extension(store.clone()), Query(params)).await {
            Ok(_) => panic!("lookup should have been rejected"),
            Err(e) => e,
        }
    }

    #[tokio::test]
    async fn test_street_lookup_parameters() {
        let store = shared(seeded());

        let both = lookup_error(
            &store,
            StreetLookupParams {
                nombre_calle: Some("Real".to_string()),
                seccion: Some("3".to_string()),
            },
        )
        .await;
        assert_eq!(both.status_code(), StatusCode::BAD_REQUEST);

        let neither = lookup_error(&store, StreetLookupParams::default()).await;
        assert_eq!(neither.status_code(), StatusCode::BAD_REQUEST);

        let by_name = handle_street_lookup(
            Extension(store.clone()),
            Query(StreetLookupParams {
                nombre_calle: Some("Real".to_string()),
                seccion: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(by_name.status(), StatusCode::OK);

        let empty_section = lookup_error(
            &store,
            StreetLookupParams {
                nombre_calle: None,
                seccion: Some("9".to_string()),
            },
        )
        .await;
        assert_eq!(empty_section.status_code(), StatusCode::NOT_FOUND);

        let bad_section = lookup_error(
            &store,
            StreetLookupParams {
                nombre_calle: None,
                seccion: Some("tres".to_string()),
            },
        )
        .await;
        assert_eq!(bad_section.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_reports_handlers() {
        let store = shared(seeded());

        let Json(listing) = handle_list_entries(Extension(store.clone())).await.unwrap();
        assert_eq!(listing.first().map(|e| e.section), Some(1));

        let Json(sections) = handle_sections(Extension(store.clone())).await.unwrap();
        assert_eq!(sections.len(), 2);

        let Json(stats) = handle_stats(Extension(store.clone())).await.unwrap();
        assert_eq!(stats.total_calles, 4);

        let Json(health) = handle_health(Extension(store)).await.unwrap();
        assert_eq!(health.entries, 4);
    }

    #[test]
    fn test_entry_wire_names() {
        let entry = DirectoryEntry {
            id: 5,
            section: 2,
            street_type: "CALLE".to_string(),
            street_name: "Real".to_string(),
            number_start: 1,
            number_end: 9,
            parity: Parity::Odd,
        };
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["seccion"], 2);
        assert_eq!(json["tipo_via"], "CALLE");
        assert_eq!(json["nombre_calle"], "Real");
        assert_eq!(json["numero_inicio"], 1);
        assert_eq!(json["numero_fin"], 9);
        assert_eq!(json["paridad"], "I");
    }
}

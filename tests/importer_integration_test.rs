// ==========================================
// CatalogImporter 集成测试
// ==========================================
// 测试目标: 单事务导入、行级失败隔离、整批回滚、失败报告
// ==========================================

mod test_helpers;

use catalog_import::domain::{DuplicatePolicy, EntityStats, FamilyStatus};
use catalog_import::importer::{CatalogImporter, ImportError};
use catalog_import::logging;
use catalog_import::repository::CatalogRepository;
use std::sync::Arc;
use test_helpers::{
    count_files, count_rows, create_importer, create_repo, create_test_db, failure_dir,
    family_record, family_records, product_record, FlakyRepository,
};

fn assert_counts_consistent(stats: EntityStats) {
    assert_eq!(
        stats.failed,
        stats.processed - stats.inserted - stats.updated,
        "failed must equal processed - inserted - updated: {:?}",
        stats
    );
}

#[tokio::test]
async fn test_family_imported_twice_is_inserted_then_updated() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = create_repo(&db_path);
    let importer = create_importer(repo.clone(), dir.path(), DuplicatePolicy::LastWins);

    let first = importer
        .process_import(vec![family_record(1, "FAM_WIPERS_001", "Wipers")], vec![])
        .await
        .unwrap();
    assert_eq!(first.stats.families_inserted, 1);
    assert_eq!(first.stats.families_updated, 0);

    let second = importer
        .process_import(vec![family_record(1, "FAM_WIPERS_001", "Wiper Blades")], vec![])
        .await
        .unwrap();
    assert_eq!(second.stats.families_inserted, 0);
    assert_eq!(second.stats.families_updated, 1);

    let stored = repo.find_family("FAM_WIPERS_001").await.unwrap().unwrap();
    assert_eq!(stored.family_name, "Wiper Blades");
    assert_eq!(stored.status, FamilyStatus::Active);
}

#[tokio::test]
async fn test_product_with_unknown_family_is_rejected() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = create_repo(&db_path);
    let importer = create_importer(repo.clone(), dir.path(), DuplicatePolicy::LastWins);

    let outcome = importer
        .process_import(
            vec![family_record(1, "FAM_WIPERS_001", "Wipers")],
            vec![
                product_record(1, "SKU-10001", "FAM_WIPERS_001"),
                product_record(2, "SKU-10002", "FAM_UNKNOWN_999"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome.stats.products_processed, 2);
    assert_eq!(outcome.stats.products_inserted, 1);
    assert_eq!(outcome.stats.products_failed, 1);
    assert_counts_consistent(outcome.stats.products());

    let failure = &outcome.product_failures[0];
    assert_eq!(failure.row_number, 2);
    assert_eq!(failure.key.as_deref(), Some("SKU-10002"));
    assert!(failure.reason.contains("FAM_UNKNOWN_999"));

    assert!(repo.find_product("SKU-10002").await.unwrap().is_none());
    assert!(outcome.failure_files.families.is_none());
    assert!(outcome.failure_files.products.is_some());
}

#[tokio::test]
async fn test_ean_upc_length_boundary() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let importer = create_importer(create_repo(&db_path), dir.path(), DuplicatePolicy::LastWins);

    let mut short = product_record(1, "SKU-10001", "FAM_WIPERS_001");
    short.ean_upc = Some("1234567".to_string());
    let mut exact = product_record(2, "SKU-10002", "FAM_WIPERS_001");
    exact.ean_upc = Some("12345678".to_string());

    let outcome = importer
        .process_import(
            vec![family_record(1, "FAM_WIPERS_001", "Wipers")],
            vec![short, exact],
        )
        .await
        .unwrap();

    assert_eq!(outcome.stats.products_failed, 1);
    assert_eq!(outcome.stats.products_inserted, 1);
    assert_eq!(outcome.product_failures[0].row_number, 1);
    assert_eq!(
        outcome.product_failures[0].reason,
        "EAN UPC must be between 8 and 14 digits"
    );
}

#[tokio::test]
async fn test_zero_failures_creates_no_reports() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let reports = dir.path().join("reports");
    let importer = create_importer(create_repo(&db_path), &reports, DuplicatePolicy::LastWins);

    let outcome = importer
        .process_import(
            family_records(3),
            vec![product_record(1, "SKU-1", "FAM_TEST_001")],
        )
        .await
        .unwrap();

    assert_eq!(outcome.stats.families_inserted, 3);
    assert_eq!(outcome.stats.products_inserted, 1);
    assert!(outcome.failure_files.families.is_none());
    assert!(outcome.failure_files.products.is_none());
    assert!(!reports.exists());
    assert_eq!(count_files(&reports), 0);
}

#[tokio::test]
async fn test_storage_outage_rolls_back_whole_batch() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = Arc::new(FlakyRepository::new(&db_path, 3));
    let importer = create_importer(repo.clone(), dir.path(), DuplicatePolicy::LastWins);

    let result = importer.process_import(family_records(5), vec![]).await;

    assert!(matches!(result, Err(ImportError::DatabaseConnectionError(_))));
    assert_eq!(repo.family_inserts(), 4);
    assert_eq!(count_rows(&db_path, "families"), 0);
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn test_importer_usable_after_rollback() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = Arc::new(FlakyRepository::new(&db_path, 3));
    let importer = create_importer(repo, dir.path(), DuplicatePolicy::LastWins);

    assert!(importer.process_import(family_records(5), vec![]).await.is_err());

    // 回滚后事务已结束，可再次开启
    let outcome = importer.process_import(vec![], vec![]).await.unwrap();
    assert_eq!(outcome.stats.families_processed, 0);
    assert_eq!(outcome.stats.products_processed, 0);
}

#[tokio::test]
async fn test_reimport_identical_batch_updates_everything() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = create_repo(&db_path);
    let importer = create_importer(repo.clone(), dir.path(), DuplicatePolicy::LastWins);

    let products = vec![
        product_record(1, "SKU-1", "FAM_TEST_001"),
        product_record(2, "SKU-2", "FAM_TEST_002"),
    ];

    let first = importer
        .process_import(family_records(4), products.clone())
        .await
        .unwrap();
    let before = repo.find_product("SKU-2").await.unwrap().unwrap();

    let second = importer
        .process_import(family_records(4), products)
        .await
        .unwrap();

    assert_eq!(first.stats.families_inserted, 4);
    assert_eq!(second.stats.families_inserted, 0);
    assert_eq!(second.stats.families_updated, 4);
    assert_eq!(second.stats.products_inserted, 0);
    assert_eq!(second.stats.products_updated, 2);
    assert_eq!(repo.find_product("SKU-2").await.unwrap().unwrap(), before);
    assert_eq!(count_rows(&db_path, "families"), 4);
    assert_eq!(count_rows(&db_path, "products"), 2);
}

#[tokio::test]
async fn test_validation_failures_are_isolated_and_counted() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let importer = create_importer(create_repo(&db_path), dir.path(), DuplicatePolicy::LastWins);

    let mut bad_status = family_record(2, "FAM_WIPERS_002", "Wipers");
    bad_status.status = Some("RETIRED".to_string());
    let mut missing_fields = family_record(3, "FAM_WIPERS_003", "Wipers");
    missing_fields.family_name = None;
    missing_fields.brand = Some("   ".to_string());

    let outcome = importer
        .process_import(
            vec![
                family_record(1, "FAM_WIPERS_001", "Wipers"),
                bad_status,
                missing_fields,
            ],
            vec![],
        )
        .await
        .unwrap();

    let stats = outcome.stats.families();
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.failed, 2);
    assert_counts_consistent(stats);

    let reasons: Vec<&str> = outcome
        .family_failures
        .iter()
        .map(|f| f.reason.as_str())
        .collect();
    assert_eq!(
        reasons,
        vec![
            "Status must be either ACTIVE or INACTIVE",
            "Family Name is required--Brand cannot be empty",
        ]
    );

    let report = outcome.failure_files.families.unwrap();
    let content = std::fs::read_to_string(report).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "rowNumber;familyCode;reason");
    assert_eq!(lines[1], "2;FAM_WIPERS_002;Status must be either ACTIVE or INACTIVE");
    assert_eq!(
        lines[2],
        "3;FAM_WIPERS_003;Family Name is required--Brand cannot be empty"
    );
}

#[tokio::test]
async fn test_products_reference_families_from_same_batch() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let importer = create_importer(create_repo(&db_path), dir.path(), DuplicatePolicy::LastWins);

    // 产品族行无效 → 产品引用失败
    let mut invalid_family = family_record(2, "FAM_BRAKES_001", "Brakes");
    invalid_family.status = None;

    let outcome = importer
        .process_import(
            vec![family_record(1, "FAM_WIPERS_001", "Wipers"), invalid_family],
            vec![
                product_record(1, "SKU-1", "FAM_WIPERS_001"),
                product_record(2, "SKU-2", "FAM_BRAKES_001"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome.stats.products_inserted, 1);
    assert_eq!(outcome.stats.products_failed, 1);
    assert_eq!(
        outcome.product_failures[0].reason,
        "family not found: FAM_BRAKES_001"
    );
}

#[tokio::test]
async fn test_reject_policy_fails_in_batch_duplicates() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = create_repo(&db_path);
    let importer = create_importer(repo.clone(), dir.path(), DuplicatePolicy::Reject);

    let mut repeat = product_record(3, "SKU-1", "FAM_WIPERS_001");
    repeat.name = Some("Repeat".to_string());

    let outcome = importer
        .process_import(
            vec![family_record(1, "FAM_WIPERS_001", "Wipers")],
            vec![
                product_record(1, "SKU-1", "FAM_WIPERS_001"),
                product_record(2, "SKU-2", "FAM_WIPERS_001"),
                repeat,
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome.stats.products_inserted, 2);
    assert_eq!(outcome.stats.products_failed, 1);
    assert_eq!(
        outcome.product_failures[0].reason,
        "duplicate sku in batch: SKU-1 (first seen at row 1)"
    );
    assert_eq!(
        repo.find_product("SKU-1").await.unwrap().unwrap().name,
        "Product SKU-1"
    );
}

#[tokio::test]
async fn test_last_wins_policy_keeps_later_row() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = create_repo(&db_path);
    let importer = create_importer(repo.clone(), dir.path(), DuplicatePolicy::LastWins);

    let mut repeat = product_record(2, "SKU-1", "FAM_WIPERS_001");
    repeat.name = Some("Repeat".to_string());

    let outcome = importer
        .process_import(
            vec![family_record(1, "FAM_WIPERS_001", "Wipers")],
            vec![product_record(1, "SKU-1", "FAM_WIPERS_001"), repeat],
        )
        .await
        .unwrap();

    assert_eq!(outcome.stats.products_inserted, 1);
    assert_eq!(outcome.stats.products_updated, 1);
    assert!(outcome.product_failures.is_empty());
    assert_eq!(repo.find_product("SKU-1").await.unwrap().unwrap().name, "Repeat");
}

#[tokio::test]
async fn test_empty_vehicle_type_is_stored_as_absent() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().unwrap();
    let dir = failure_dir();
    let repo = create_repo(&db_path);
    let importer = create_importer(repo.clone(), dir.path(), DuplicatePolicy::LastWins);

    let mut product = product_record(1, " SKU-1 ", "FAM_WIPERS_001");
    product.vehicle_type = Some("  ".to_string());

    importer
        .process_import(vec![family_record(1, "FAM_WIPERS_001", "Wipers")], vec![product])
        .await
        .unwrap();

    let stored = repo.find_product("SKU-1").await.unwrap().unwrap();
    assert_eq!(stored.vehicle_type, None);
}

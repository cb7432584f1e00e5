// ==========================================
// 产品目录导入系统 - 通用批处理器
// ==========================================
// 职责: 驱动单实体类型的逐行处理（清洗 → 校验 → 重复检测 → 引用检查 → 落库）
// 分级: 行级失败记录后继续；基础设施错误立即返回（由调用方回滚）
// ==========================================

use crate::domain::{
    EntityKind, EntityStats, FailureEntry, Family, FamilyRecord, Product, ProductRecord,
    UpsertAction,
};
use crate::importer::catalog_importer_trait::{
    ConflictHandler as ConflictHandlerTrait, DataCleaner, EntityPipeline, ImportRecord,
};
use crate::importer::conflict_handler::{ConflictHandler, PersistedKeys};
use crate::importer::error::ImportResult;
use crate::importer::record_validator::{RecordValidator, ValidationReport};
use crate::importer::referential_checker::ReferentialChecker;
use crate::importer::upsert_executor::UpsertExecutor;
use crate::repository::{CatalogRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

// ==========================================
// PhaseResult - 单阶段处理结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PhaseResult {
    pub stats: EntityStats,
    pub failures: Vec<FailureEntry>,
}

impl PhaseResult {
    fn fail(&mut self, row_number: usize, key: Option<String>, reason: String) {
        self.stats.record_failed();
        self.failures.push(FailureEntry {
            row_number,
            key,
            reason,
        });
    }
}

// ==========================================
// BatchProcessor
// ==========================================
pub struct BatchProcessor<'a> {
    conflict_handler: &'a ConflictHandler,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(conflict_handler: &'a ConflictHandler) -> Self {
        Self { conflict_handler }
    }

    /// 处理单实体类型的全部记录（按输入顺序）
    ///
    /// # 返回
    /// - Ok(PhaseResult): 统计 + 失败明细
    /// - Err: 基础设施错误（已处理的写入需由调用方回滚）
    pub async fn run<P: EntityPipeline>(
        &self,
        pipeline: &P,
        records: Vec<P::Record>,
    ) -> ImportResult<PhaseResult> {
        let kind = pipeline.kind();
        let total_rows = records.len();
        let phase_start = Instant::now();
        info!(entity = %kind, total_rows = total_rows, "phase started");

        let records: Vec<P::Record> = records.into_iter().map(|r| pipeline.clean(r)).collect();

        // 批内重复：只跟踪已成功落库的行
        let mut persisted = PersistedKeys::new();
        let mut result = PhaseResult::default();

        for record in records.iter() {
            let row_number = record.row_number();
            let key = record.identity().map(str::to_string);

            // 1. 字段校验
            let entity = match pipeline.validate(record) {
                Ok(entity) => entity,
                Err(report) => {
                    let reason = report.reason();
                    warn!(entity = %kind, row_number, key = ?key, reason = %reason, "row rejected by validation");
                    result.fail(row_number, key, reason);
                    continue;
                }
            };

            // 2. 批内重复
            if let Some(key_text) = key.as_deref() {
                if let Some(first_row) = persisted.first_row(key_text) {
                    if let Some(reason) = self.conflict_handler.resolve_duplicate(
                        kind.key_label(),
                        key_text,
                        row_number,
                        first_row,
                    ) {
                        warn!(entity = %kind, row_number, reason = %reason, "row rejected as in-batch duplicate");
                        result.fail(row_number, key, reason);
                        continue;
                    }
                }
            }

            // 3. 引用检查
            match pipeline.check_references(&entity).await {
                Ok(None) => {}
                Ok(Some(reason)) => {
                    warn!(entity = %kind, row_number, reason = %reason, "row rejected by reference check");
                    result.fail(row_number, key, reason);
                    continue;
                }
                Err(e) => {
                    if let Some(reason) = record_level_reason(&e) {
                        result.fail(row_number, key, reason);
                        continue;
                    }
                    error!(entity = %kind, row_number, error = %e, "reference check aborted the batch");
                    return Err(e.into());
                }
            }

            // 4. 落库
            match pipeline.upsert(&entity).await {
                Ok(action) => {
                    match action {
                        UpsertAction::Inserted => result.stats.record_inserted(),
                        UpsertAction::Updated => result.stats.record_updated(),
                    }
                    if let Some(key_text) = key.as_deref() {
                        persisted.remember(key_text, row_number);
                    }
                }
                Err(e) => {
                    if let Some(reason) = record_level_reason(&e) {
                        warn!(entity = %kind, row_number, reason = %reason, "row rejected by storage");
                        result.fail(row_number, key, reason);
                        continue;
                    }
                    error!(entity = %kind, row_number, error = %e, "upsert aborted the batch");
                    return Err(e.into());
                }
            }
        }

        let stats = result.stats;
        info!(
            entity = %kind,
            total_rows = total_rows,
            processed = stats.processed,
            inserted = stats.inserted,
            updated = stats.updated,
            failed = stats.failed,
            duration_ms = phase_start.elapsed().as_millis() as u64,
            success_rate = %format!("{:.2}%", stats.success_rate()),
            "phase completed"
        );

        Ok(result)
    }
}

/// 行级错误 → 失败原因；基础设施错误 → None
fn record_level_reason(err: &RepositoryError) -> Option<String> {
    if err.is_record_level() {
        Some(err.to_string())
    } else {
        None
    }
}

// ==========================================
// FamilyPipeline
// ==========================================
pub struct FamilyPipeline<R: CatalogRepository> {
    validator: Arc<RecordValidator>,
    cleaner: Arc<dyn DataCleaner>,
    executor: UpsertExecutor<R>,
}

impl<R: CatalogRepository> FamilyPipeline<R> {
    pub fn new(validator: Arc<RecordValidator>, cleaner: Arc<dyn DataCleaner>, repo: Arc<R>) -> Self {
        Self {
            validator,
            cleaner,
            executor: UpsertExecutor::new(repo),
        }
    }
}

#[async_trait]
impl<R: CatalogRepository> EntityPipeline for FamilyPipeline<R> {
    type Record = FamilyRecord;
    type Entity = Family;

    fn kind(&self) -> EntityKind {
        EntityKind::Families
    }

    fn clean(&self, record: FamilyRecord) -> FamilyRecord {
        self.cleaner.clean_family(record)
    }

    fn validate(&self, record: &FamilyRecord) -> Result<Family, ValidationReport> {
        let report = self.validator.validate_family(record);
        if !report.is_valid() {
            return Err(report);
        }
        record
            .to_family()
            .ok_or_else(|| ValidationReport::single("Family record is incomplete"))
    }

    async fn check_references(&self, _entity: &Family) -> RepositoryResult<Option<String>> {
        Ok(None)
    }

    async fn upsert(&self, entity: &Family) -> RepositoryResult<UpsertAction> {
        self.executor.upsert_family(entity).await
    }
}

// ==========================================
// ProductPipeline
// ==========================================
pub struct ProductPipeline<R: CatalogRepository> {
    validator: Arc<RecordValidator>,
    cleaner: Arc<dyn DataCleaner>,
    checker: ReferentialChecker<R>,
    executor: UpsertExecutor<R>,
}

impl<R: CatalogRepository> ProductPipeline<R> {
    pub fn new(validator: Arc<RecordValidator>, cleaner: Arc<dyn DataCleaner>, repo: Arc<R>) -> Self {
        Self {
            validator,
            cleaner,
            checker: ReferentialChecker::new(repo.clone()),
            executor: UpsertExecutor::new(repo),
        }
    }
}

#[async_trait]
impl<R: CatalogRepository> EntityPipeline for ProductPipeline<R> {
    type Record = ProductRecord;
    type Entity = Product;

    fn kind(&self) -> EntityKind {
        EntityKind::Products
    }

    fn clean(&self, record: ProductRecord) -> ProductRecord {
        self.cleaner.clean_product(record)
    }

    fn validate(&self, record: &ProductRecord) -> Result<Product, ValidationReport> {
        let report = self.validator.validate_product(record);
        if !report.is_valid() {
            return Err(report);
        }
        record
            .to_product()
            .ok_or_else(|| ValidationReport::single("Product record is incomplete"))
    }

    async fn check_references(&self, entity: &Product) -> RepositoryResult<Option<String>> {
        self.checker.check_product(entity).await
    }

    async fn upsert(&self, entity: &Product) -> RepositoryResult<UpsertAction> {
        self.executor.upsert_product(entity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationRules;
    use crate::db::ensure_schema;
    use crate::domain::DuplicatePolicy;
    use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
    use crate::repository::SqliteCatalogRepository;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup() -> (FamilyPipeline<SqliteCatalogRepository>, Arc<SqliteCatalogRepository>) {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let repo =
            Arc::new(SqliteCatalogRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap());
        let pipeline = FamilyPipeline::new(
            Arc::new(RecordValidator::new(ValidationRules::default())),
            Arc::new(DataCleanerImpl),
            repo.clone(),
        );
        (pipeline, repo)
    }

    fn product_pipeline(repo: Arc<SqliteCatalogRepository>) -> ProductPipeline<SqliteCatalogRepository> {
        ProductPipeline::new(
            Arc::new(RecordValidator::new(ValidationRules::default())),
            Arc::new(DataCleanerImpl),
            repo,
        )
    }

    fn product(row: usize, sku: &str, family_code: &str) -> ProductRecord {
        ProductRecord {
            sku: Some(sku.to_string()),
            name: Some(format!("Product {}", row)),
            family_code: Some(family_code.to_string()),
            ean_upc: Some("12345678".to_string()),
            vehicle_type: Some("CAR".to_string()),
            row_number: row,
        }
    }

    fn record(row: usize, code: &str, name: &str) -> FamilyRecord {
        FamilyRecord {
            family_code: Some(code.to_string()),
            family_name: Some(name.to_string()),
            product_line: Some("WIPERS".to_string()),
            brand: Some("VALEO".to_string()),
            status: Some("ACTIVE".to_string()),
            row_number: row,
        }
    }

    #[tokio::test]
    async fn test_last_wins_updates_earlier_row() {
        let (pipeline, repo) = setup();
        let handler = ConflictHandler::new(DuplicatePolicy::LastWins);
        let processor = BatchProcessor::new(&handler);

        let result = processor
            .run(
                &pipeline,
                vec![
                    record(1, "FAM_WIPERS_001", "First"),
                    record(2, "FAM_WIPERS_001", "Second"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(result.stats.inserted, 1);
        assert_eq!(result.stats.updated, 1);
        assert!(result.failures.is_empty());
        let stored = repo.find_family("FAM_WIPERS_001").await.unwrap().unwrap();
        assert_eq!(stored.family_name, "Second");
    }

    #[tokio::test]
    async fn test_reject_policy_fails_repeat() {
        let (pipeline, repo) = setup();
        let handler = ConflictHandler::new(DuplicatePolicy::Reject);
        let processor = BatchProcessor::new(&handler);

        let result = processor
            .run(
                &pipeline,
                vec![
                    record(1, "FAM_WIPERS_001", "First"),
                    record(2, "FAM_WIPERS_001", "Second"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(result.stats.inserted, 1);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(
            result.failures[0].reason,
            "duplicate family code in batch: FAM_WIPERS_001 (first seen at row 1)"
        );
        let stored = repo.find_family("FAM_WIPERS_001").await.unwrap().unwrap();
        assert_eq!(stored.family_name, "First");
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_row_and_key() {
        let (pipeline, _repo) = setup();
        let handler = ConflictHandler::default();
        let processor = BatchProcessor::new(&handler);

        let mut bad = record(4, " FAM_BAD ", "Bad");
        bad.status = Some("ACTIVE ".to_string());
        bad.brand = None;

        let result = processor.run(&pipeline, vec![bad]).await.unwrap();

        assert_eq!(result.stats.failed, 1);
        let failure = &result.failures[0];
        assert_eq!(failure.row_number, 4);
        assert_eq!(failure.key.as_deref(), Some("FAM_BAD"));
        assert_eq!(
            failure.reason,
            "Family Code must match pattern (e.g., FAM_WIPERS_001)--Brand is required"
        );
    }

    #[tokio::test]
    async fn test_reject_policy_ignores_invalid_first_row() {
        let (pipeline, repo) = setup();
        let handler = ConflictHandler::new(DuplicatePolicy::Reject);
        let processor = BatchProcessor::new(&handler);

        let mut invalid = record(1, "FAM_WIPERS_001", "Broken");
        invalid.status = Some("BOGUS".to_string());

        let result = processor
            .run(&pipeline, vec![invalid, record(2, "FAM_WIPERS_001", "Wipers")])
            .await
            .unwrap();

        assert_eq!(result.stats.inserted, 1);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].row_number, 1);
        assert_eq!(
            result.failures[0].reason,
            "Status must be either ACTIVE or INACTIVE"
        );
        let stored = repo.find_family("FAM_WIPERS_001").await.unwrap().unwrap();
        assert_eq!(stored.family_name, "Wipers");
    }

    #[tokio::test]
    async fn test_reject_policy_ignores_unresolved_first_product() {
        let (families, repo) = setup();
        let handler = ConflictHandler::new(DuplicatePolicy::Reject);
        let processor = BatchProcessor::new(&handler);
        processor
            .run(&families, vec![record(1, "FAM_WIPERS_001", "Wipers")])
            .await
            .unwrap();

        let products = product_pipeline(repo.clone());
        let result = processor
            .run(
                &products,
                vec![
                    product(1, "SKU-100", "FAM_UNKNOWN_999"),
                    product(2, "SKU-100", "FAM_WIPERS_001"),
                    product(3, "SKU-100", "FAM_WIPERS_001"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(result.stats.inserted, 1);
        assert_eq!(result.stats.failed, 2);
        assert_eq!(result.failures[0].row_number, 1);
        assert_eq!(result.failures[0].reason, "family not found: FAM_UNKNOWN_999");
        assert_eq!(result.failures[1].row_number, 3);
        assert_eq!(
            result.failures[1].reason,
            "duplicate sku in batch: SKU-100 (first seen at row 2)"
        );
        let stored = repo.find_product("SKU-100").await.unwrap().unwrap();
        assert_eq!(stored.name, "Product 2");
    }
}

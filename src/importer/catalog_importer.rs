// ==========================================
// 产品目录导入系统 - 导入编排器实现
// ==========================================
// 职责: 单次导入的完整编排（事务 → 产品族阶段 → 产品阶段 → 提交 → 失败报告）
// 红线: 产品族全部处理完成后才处理产品
// 红线: 基础设施错误 → 整批回滚并返回错误；行级失败不影响事务
// ==========================================

use crate::config::{ImportConfigReader, ValidationRules};
use crate::domain::{
    DuplicatePolicy, EntityKind, FailureFiles, FamilyRecord, ImportOutcome, ImportStats,
    ProductRecord,
};
use crate::importer::batch_processor::{BatchProcessor, FamilyPipeline, PhaseResult, ProductPipeline};
use crate::importer::catalog_importer_trait::{
    CatalogImporter, DataCleaner, FailureReporter, FieldMapper, FileParser,
};
use crate::importer::conflict_handler::ConflictHandler;
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::error::ImportResult;
use crate::importer::failure_reporter::CsvFailureReporter;
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::record_validator::RecordValidator;
use crate::importer::unit_of_work::UnitOfWork;
use crate::repository::CatalogRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};
use uuid::Uuid;

// ==========================================
// CatalogImporterImpl - 导入编排器
// ==========================================
pub struct CatalogImporterImpl<R: CatalogRepository> {
    repo: Arc<R>,

    // 实体管道
    family_pipeline: FamilyPipeline<R>,
    product_pipeline: ProductPipeline<R>,
    conflict_handler: ConflictHandler,

    // 文件导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,

    failure_reporter: Box<dyn FailureReporter>,

    // 同一实例（同一连接）上的导入串行执行
    import_lock: Mutex<()>,
}

impl<R: CatalogRepository> CatalogImporterImpl<R> {
    /// 创建导入编排器
    ///
    /// # 参数
    /// - repo: 目录仓储（事务与读写共用同一连接）
    /// - rules: 校验规则
    /// - policy: 批内重复策略
    /// - failure_reporter: 失败报告输出
    pub fn new(
        repo: Arc<R>,
        rules: ValidationRules,
        policy: DuplicatePolicy,
        failure_reporter: Box<dyn FailureReporter>,
    ) -> Self {
        let validator = Arc::new(RecordValidator::new(rules));
        let cleaner: Arc<dyn DataCleaner> = Arc::new(DataCleanerImpl);

        Self {
            family_pipeline: FamilyPipeline::new(validator.clone(), cleaner.clone(), repo.clone()),
            product_pipeline: ProductPipeline::new(validator, cleaner, repo.clone()),
            repo,
            conflict_handler: ConflictHandler::new(policy),
            file_parser: Box::new(UniversalFileParser),
            field_mapper: Box::new(FieldMapperImpl),
            failure_reporter,
            import_lock: Mutex::new(()),
        }
    }

    /// 按配置创建导入编排器（校验规则 / 重复策略 / 失败目录 / 报告分隔符）
    pub async fn from_config<C>(repo: Arc<R>, config: &C) -> ImportResult<Self>
    where
        C: ImportConfigReader + ?Sized,
    {
        let rules = config.get_validation_rules().await?;
        let policy = config.get_duplicate_policy().await?;
        let failure_dir = config.get_failure_dir().await?;
        let delimiter = config.get_report_delimiter().await?;

        info!(
            failure_dir = %failure_dir.display(),
            duplicate_policy = policy.as_str(),
            "catalog importer configured"
        );

        let reporter = CsvFailureReporter::new(failure_dir).with_delimiter(delimiter);
        Ok(Self::new(repo, rules, policy, Box::new(reporter)))
    }

    /// 事务内执行两个阶段
    async fn run_phases(
        &self,
        family_records: Vec<FamilyRecord>,
        product_records: Vec<ProductRecord>,
    ) -> ImportResult<(PhaseResult, PhaseResult)> {
        let processor = BatchProcessor::new(&self.conflict_handler);
        let families = processor.run(&self.family_pipeline, family_records).await?;
        let products = processor.run(&self.product_pipeline, product_records).await?;
        Ok((families, products))
    }
}

#[async_trait::async_trait]
impl<R: CatalogRepository> CatalogImporter for CatalogImporterImpl<R> {
    #[instrument(skip_all, fields(batch_id))]
    async fn process_import(
        &self,
        family_records: Vec<FamilyRecord>,
        product_records: Vec<ProductRecord>,
    ) -> ImportResult<ImportOutcome> {
        let _guard = self.import_lock.lock().await;

        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(
            batch_id = %batch_id,
            family_rows = family_records.len(),
            product_rows = product_records.len(),
            "catalog import started"
        );

        // === 步骤 1: 开启事务 ===
        let mut uow = UnitOfWork::begin(self.repo.clone()).await.map_err(|e| {
            error!(batch_id = %batch_id, error = %e, "failed to open transaction");
            e
        })?;

        // === 步骤 2: 产品族 → 产品 ===
        let (families, products) = match self.run_phases(family_records, product_records).await {
            Ok(results) => results,
            Err(e) => {
                error!(batch_id = %batch_id, error = %e, "catalog import aborted, rolling back");
                uow.rollback_if_active().await;
                return Err(e);
            }
        };

        // === 步骤 3: 提交 ===
        if let Err(e) = uow.commit().await {
            error!(batch_id = %batch_id, error = %e, "commit failed, rolling back");
            uow.rollback_if_active().await;
            return Err(e.into());
        }

        // === 步骤 4: 失败报告（提交之后） ===
        let failure_files = FailureFiles {
            families: self
                .failure_reporter
                .export(EntityKind::Families, &families.failures)?,
            products: self
                .failure_reporter
                .export(EntityKind::Products, &products.failures)?,
        };

        let stats = ImportStats::new(families.stats, products.stats);
        let duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            batch_id = %batch_id,
            families_processed = stats.families_processed,
            families_failed = stats.families_failed,
            products_processed = stats.products_processed,
            products_failed = stats.products_failed,
            duration_ms = duration_ms,
            "catalog import completed"
        );

        Ok(ImportOutcome {
            batch_id,
            stats,
            failure_files,
            family_failures: families.failures,
            product_failures: products.failures,
            duration_ms,
        })
    }

    #[instrument(skip(self))]
    async fn import_from_files(
        &self,
        families_path: &Path,
        products_path: &Path,
    ) -> ImportResult<ImportOutcome> {
        let family_rows = self.file_parser.parse_to_raw_rows(families_path).map_err(|e| {
            error!(error = %e, "families file could not be parsed");
            e
        })?;
        let product_rows = self.file_parser.parse_to_raw_rows(products_path).map_err(|e| {
            error!(error = %e, "products file could not be parsed");
            e
        })?;

        info!(
            family_rows = family_rows.len(),
            product_rows = product_rows.len(),
            "files parsed"
        );

        let family_records: Vec<FamilyRecord> = family_rows
            .iter()
            .map(|row| self.field_mapper.map_to_family(row))
            .collect();
        let product_records: Vec<ProductRecord> = product_rows
            .iter()
            .map(|row| self.field_mapper.map_to_product(row))
            .collect();

        self.process_import(family_records, product_records).await
    }
}

// ==========================================
// 产品目录导入系统 - 导入层
// ==========================================
// 职责: 外部目录数据导入（产品族 → 产品），生成失败报告
// 支持: CSV, Excel, 已解析记录
// ==========================================

// 模块声明
pub mod batch_processor;
pub mod catalog_importer;
pub mod catalog_importer_trait;
pub mod conflict_handler;
pub mod data_cleaner;
pub mod error;
pub mod failure_reporter;
pub mod field_mapper;
pub mod file_parser;
pub mod record_validator;
pub mod referential_checker;
pub mod unit_of_work;
pub mod upsert_executor;

// 重导出核心类型
pub use batch_processor::{BatchProcessor, FamilyPipeline, PhaseResult, ProductPipeline};
pub use catalog_importer::CatalogImporterImpl;
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use failure_reporter::CsvFailureReporter;
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, RawRow, UniversalFileParser};
pub use record_validator::{RecordValidator, ValidationReport, REASON_SEPARATOR};
pub use referential_checker::ReferentialChecker;
pub use unit_of_work::UnitOfWork;
pub use upsert_executor::UpsertExecutor;

// 重导出 Trait 接口
pub use catalog_importer_trait::{
    CatalogImporter, ConflictHandler, DataCleaner, EntityPipeline, FailureReporter, FieldMapper,
    FileParser, ImportRecord,
};

// ==========================================
// 产品目录导入系统 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 映射 → 清洗 → 校验 → 重复检测 → 引用检查 → 落库 → 失败报告
// ==========================================

use crate::domain::{
    EntityKind, FailureEntry, FamilyRecord, ImportOutcome, ProductRecord, UpsertAction,
};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawRow;
use crate::importer::record_validator::ValidationReport;
use crate::repository::RepositoryResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// ==========================================
// CatalogImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: CatalogImporterImpl
#[async_trait]
pub trait CatalogImporter: Send + Sync {
    /// 导入已解析的产品族/产品记录
    ///
    /// # 参数
    /// - family_records: 产品族记录（按输入顺序）
    /// - product_records: 产品记录（按输入顺序）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 统计 + 失败明细 + 失败报告位置 + 耗时
    /// - Err: 基础设施错误（整批已回滚）
    ///
    /// # 流程
    /// 1. 开启事务
    /// 2. 产品族逐行: 清洗 → 校验 → 落库
    /// 3. 产品逐行: 清洗 → 校验 → 引用检查 → 落库
    /// 4. 提交
    /// 5. 导出失败报告
    async fn process_import(
        &self,
        family_records: Vec<FamilyRecord>,
        product_records: Vec<ProductRecord>,
    ) -> ImportResult<ImportOutcome>;

    /// 从文件导入（.csv / .xlsx / .xls）
    ///
    /// 文件解析失败时不开启事务，直接返回错误
    async fn import_from_files(
        &self,
        families_path: &Path,
        products_path: &Path,
    ) -> ImportResult<ImportOutcome>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 返回
    /// - Ok(Vec<RawRow>): 非空行（行号保持源文件数据行编号，从 1 开始）
    /// - Err: 文件读取错误、格式错误
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列名 → 记录字段映射（支持别名）
// 约定: 列存在但为空 → Some("")；列不存在 → None
pub trait FieldMapper: Send + Sync {
    fn map_to_family(&self, row: &RawRow) -> FamilyRecord;

    fn map_to_product(&self, row: &RawRow) -> ProductRecord;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 记录级清洗（校验之前执行）
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM）
    fn clean_text(&self, value: Option<String>) -> Option<String>;

    /// 标准化可选字段（空白 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    fn clean_family(&self, record: FamilyRecord) -> FamilyRecord;

    fn clean_product(&self, record: ProductRecord) -> ProductRecord;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 批内重复标识判定
// 实现者: ConflictHandlerImpl
pub trait ConflictHandler: Send + Sync {
    /// 判定批内重复行的去留
    ///
    /// # 参数
    /// - key_label: 标识名称（"family code" / "sku"）
    /// - key: 重复的标识
    /// - row_number: 当前行号
    /// - first_row: 同一标识首次成功落库的行号
    ///
    /// # 返回
    /// - Some(reason): 当前行记为行级失败
    /// - None: 继续处理（后行覆盖前行）
    fn resolve_duplicate(
        &self,
        key_label: &str,
        key: &str,
        row_number: usize,
        first_row: usize,
    ) -> Option<String>;
}

// ==========================================
// FailureReporter Trait
// ==========================================
// 用途: 失败明细导出
// 实现者: CsvFailureReporter
pub trait FailureReporter: Send + Sync {
    /// 导出失败明细
    ///
    /// # 返回
    /// - Ok(Some(path)): 已生成报告
    /// - Ok(None): 无失败记录，不产生任何文件
    fn export(&self, kind: EntityKind, failures: &[FailureEntry]) -> ImportResult<Option<PathBuf>>;
}

// ==========================================
// ImportRecord Trait
// ==========================================
// 用途: 导入记录的公共访问（行号 + 标识）
pub trait ImportRecord: Send + Sync {
    /// 源文件数据行号（从 1 开始）
    fn row_number(&self) -> usize;

    /// 记录标识（family_code / sku，可能缺失）
    fn identity(&self) -> Option<&str>;
}

impl ImportRecord for FamilyRecord {
    fn row_number(&self) -> usize {
        self.row_number
    }

    fn identity(&self) -> Option<&str> {
        self.family_code.as_deref()
    }
}

impl ImportRecord for ProductRecord {
    fn row_number(&self) -> usize {
        self.row_number
    }

    fn identity(&self) -> Option<&str> {
        self.sku.as_deref()
    }
}

// ==========================================
// EntityPipeline Trait
// ==========================================
// 用途: 单实体类型的处理管道（由通用批处理器驱动）
// 实现者: FamilyPipeline, ProductPipeline
#[async_trait]
pub trait EntityPipeline: Send + Sync {
    type Record: ImportRecord;
    type Entity: Send + Sync;

    /// 实体类型（统计/报告/日志分组）
    fn kind(&self) -> EntityKind;

    /// 清洗
    fn clean(&self, record: Self::Record) -> Self::Record;

    /// 字段校验（纯函数）
    ///
    /// # 返回
    /// - Ok(Entity): 校验通过
    /// - Err(ValidationReport): 全部违规项
    fn validate(&self, record: &Self::Record) -> Result<Self::Entity, ValidationReport>;

    /// 引用检查
    ///
    /// # 返回
    /// - Ok(None): 通过
    /// - Ok(Some(reason)): 行级失败
    /// - Err: 存储错误
    async fn check_references(&self, entity: &Self::Entity) -> RepositoryResult<Option<String>>;

    /// 插入或更新
    async fn upsert(&self, entity: &Self::Entity) -> RepositoryResult<UpsertAction>;
}

// ==========================================
// 产品目录导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 产品族 / 产品批量导入（单事务，行级失败隔离，失败报告）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 校验规则与导入配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 调用方接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    DuplicatePolicy, EntityKind, EntityStats, FailureEntry, FailureFiles, Family, FamilyRecord,
    FamilyStatus, ImportOutcome, ImportStats, Product, ProductRecord, ProductWithFamily,
    UpsertAction,
};

// 导入
pub use importer::{CatalogImporter, CatalogImporterImpl, ImportError, ImportResult};

// API
pub use api::{ApiError, ApiResult, ImportApi, ImportApiResponse, SearchApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "catalog-import";

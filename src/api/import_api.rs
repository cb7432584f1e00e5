// ==========================================
// 产品目录导入系统 - 导入API
// ==========================================
// 职责: 封装数据库初始化、配置加载与导入调用
// 响应契约: { stats, failureFiles: { families, products }, duration }
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::domain::{FamilyRecord, ImportOutcome, ImportStats, ProductRecord};
use crate::importer::{CatalogImporter, CatalogImporterImpl, ImportError};
use crate::repository::SqliteCatalogRepository;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// 失败报告位置（无失败时为 null）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureFilesResponse {
    pub families: Option<String>,
    pub products: Option<String>,
}

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportApiResponse {
    /// 汇总统计
    pub stats: ImportStats,
    /// 失败报告位置
    pub failure_files: FailureFilesResponse,
    /// 导入耗时（毫秒）
    pub duration: u64,
}

impl From<&ImportOutcome> for ImportApiResponse {
    fn from(outcome: &ImportOutcome) -> Self {
        let to_string = |p: &Option<std::path::PathBuf>| p.as_ref().map(|p| p.display().to_string());
        Self {
            stats: outcome.stats,
            failure_files: FailureFilesResponse {
                families: to_string(&outcome.failure_files.families),
                products: to_string(&outcome.failure_files.products),
            },
            duration: outcome.duration_ms,
        }
    }
}

/// 导入API
pub struct ImportApi {
    importer: CatalogImporterImpl<SqliteCatalogRepository>,
    config_manager: ConfigManager,
}

impl ImportApi {
    /// 打开数据库、初始化表结构、加载配置并创建导入器
    ///
    /// # 返回
    /// - Err(ApiError::SchemaVersionMismatch): 数据库版本高于当前代码支持的版本
    pub async fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path).map_err(|e| {
            error!(db_path = %db_path, error = %e, "failed to open database");
            ApiError::DatabaseConnectionError(e.to_string())
        })?;
        Self::from_connection(conn).await
    }

    /// 基于已打开的连接创建
    pub async fn from_connection(conn: Connection) -> ApiResult<Self> {
        ensure_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        check_schema_version(&conn)?;

        let conn = Arc::new(Mutex::new(conn));
        let repo = Arc::new(SqliteCatalogRepository::from_connection(conn.clone())?);
        let config_manager = ConfigManager::from_connection(conn)?;
        let importer = CatalogImporterImpl::from_config(repo, &config_manager).await?;

        info!("import api ready");
        Ok(Self {
            importer,
            config_manager,
        })
    }

    /// 配置管理器（与导入器共用连接）
    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    /// 从文件导入产品族与产品
    pub async fn import_files(
        &self,
        families_path: &Path,
        products_path: &Path,
    ) -> ApiResult<ImportApiResponse> {
        let outcome = self
            .importer
            .import_from_files(families_path, products_path)
            .await?;
        Ok(ImportApiResponse::from(&outcome))
    }

    /// 导入已解析的记录
    pub async fn import_records(
        &self,
        family_records: Vec<FamilyRecord>,
        product_records: Vec<ProductRecord>,
    ) -> ApiResult<ImportApiResponse> {
        let outcome = self.import_records_detailed(family_records, product_records).await?;
        Ok(ImportApiResponse::from(&outcome))
    }

    /// 导入已解析的记录（返回含失败明细的完整结果）
    pub async fn import_records_detailed(
        &self,
        family_records: Vec<FamilyRecord>,
        product_records: Vec<ProductRecord>,
    ) -> ApiResult<ImportOutcome> {
        Ok(self
            .importer
            .process_import(family_records, product_records)
            .await?)
    }
}

fn check_schema_version(conn: &Connection) -> ApiResult<()> {
    let found = read_schema_version(conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    match found {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            error!(found = v, supported = CURRENT_SCHEMA_VERSION, "database schema is newer than supported");
            Err(ImportError::SchemaVersionMismatch {
                found: v,
                supported: CURRENT_SCHEMA_VERSION,
            }
            .into())
        }
        _ => Ok(()),
    }
}

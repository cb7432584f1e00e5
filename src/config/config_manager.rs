// ==========================================
// 产品目录导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 优先级: 环境变量 > config_kv(global) > 内置默认值
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::validation_rules::ValidationRules;
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::DuplicatePolicy;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// 失败报告目录环境变量
pub const ENV_FAILURE_DIR: &str = "CATALOG_IMPORT_FAILURE_DIR";
/// 数据库路径环境变量
pub const ENV_DB_PATH: &str = "CATALOG_IMPORT_DB_PATH";

/// 默认失败报告目录
pub const DEFAULT_FAILURE_DIR: &str = "./failures";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ImportError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ImportResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ImportError::DatabaseConnectionError(format!("lock failed: {}", e)))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("lock failed: {}", e),
        })?;

        conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImportError::DatabaseConnectionError(format!("lock failed: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析 usize 配置（缺失时返回 default）
    fn get_usize_or(&self, key: &str, default: usize) -> ImportResult<usize> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: "expected a positive integer".to_string(),
                }),
        }
    }

    /// 读取并编译正则配置（缺失时返回 default）
    fn get_regex_or(&self, key: &str, default: Regex) -> ImportResult<Regex> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => Regex::new(raw.trim()).map_err(|e| ImportError::ConfigValueError {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_failure_dir(&self) -> ImportResult<PathBuf> {
        if let Ok(dir) = std::env::var(ENV_FAILURE_DIR) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let dir = self
            .get_config_value(config_keys::FAILURE_DIR)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_DIR.to_string());
        Ok(PathBuf::from(dir))
    }

    async fn get_report_delimiter(&self) -> ImportResult<u8> {
        let raw = match self.get_config_value(config_keys::REPORT_DELIMITER)? {
            Some(v) => v,
            None => return Ok(b';'),
        };

        // 必须是单个 ASCII 字符，且不能是引号或换行
        match raw.as_bytes() {
            [b] if b.is_ascii() && !matches!(*b, b'"' | b'\n' | b'\r') => Ok(*b),
            _ => Err(ImportError::ConfigValueError {
                key: config_keys::REPORT_DELIMITER.to_string(),
                value: raw.clone(),
                message: "expected a single ASCII delimiter character".to_string(),
            }),
        }
    }

    async fn get_duplicate_policy(&self) -> ImportResult<DuplicatePolicy> {
        match self.get_config_value(config_keys::DUPLICATE_POLICY)? {
            None => Ok(DuplicatePolicy::default()),
            Some(raw) => raw
                .parse::<DuplicatePolicy>()
                .map_err(|message| ImportError::ConfigValueError {
                    key: config_keys::DUPLICATE_POLICY.to_string(),
                    value: raw.clone(),
                    message,
                }),
        }
    }

    async fn get_validation_rules(&self) -> ImportResult<ValidationRules> {
        let defaults = ValidationRules::default();

        let allowed_product_lines = self
            .get_config_value(config_keys::ALLOWED_PRODUCT_LINES)?
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<String>>()
            })
            .filter(|lines| !lines.is_empty());

        let rules = ValidationRules {
            family_code_pattern: self
                .get_regex_or(config_keys::FAMILY_CODE_PATTERN, defaults.family_code_pattern.clone())?,
            sku_pattern: self.get_regex_or(config_keys::SKU_PATTERN, defaults.sku_pattern.clone())?,
            max_family_code_len: self
                .get_usize_or(config_keys::MAX_FAMILY_CODE_LEN, defaults.max_family_code_len)?,
            max_family_name_len: self
                .get_usize_or(config_keys::MAX_FAMILY_NAME_LEN, defaults.max_family_name_len)?,
            max_product_line_len: self
                .get_usize_or(config_keys::MAX_PRODUCT_LINE_LEN, defaults.max_product_line_len)?,
            max_brand_len: self.get_usize_or(config_keys::MAX_BRAND_LEN, defaults.max_brand_len)?,
            max_product_name_len: self
                .get_usize_or(config_keys::MAX_PRODUCT_NAME_LEN, defaults.max_product_name_len)?,
            max_vehicle_type_len: self
                .get_usize_or(config_keys::MAX_VEHICLE_TYPE_LEN, defaults.max_vehicle_type_len)?,
            ean_upc_min_len: self.get_usize_or(config_keys::EAN_UPC_MIN_LEN, defaults.ean_upc_min_len)?,
            ean_upc_max_len: self.get_usize_or(config_keys::EAN_UPC_MAX_LEN, defaults.ean_upc_max_len)?,
            allowed_product_lines,
            ..defaults
        };

        if rules.ean_upc_min_len > rules.ean_upc_max_len {
            return Err(ImportError::ConfigValueError {
                key: config_keys::EAN_UPC_MIN_LEN.to_string(),
                value: rules.ean_upc_min_len.to_string(),
                message: format!("must not exceed {}", rules.ean_upc_max_len),
            });
        }

        Ok(rules)
    }
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 CATALOG_IMPORT_DB_PATH（非空时）
/// - 否则: 用户数据目录/catalog-import/catalog.db
/// - 无法获取数据目录时: ./catalog.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./catalog.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("catalog-import");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("catalog.db");
        }
    }

    path.to_string_lossy().to_string()
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入
    pub const FAILURE_DIR: &str = "import/failure_dir";
    pub const REPORT_DELIMITER: &str = "import/report_delimiter";
    pub const DUPLICATE_POLICY: &str = "import/duplicate_policy"; // LAST_WINS / REJECT

    // 校验规则
    pub const FAMILY_CODE_PATTERN: &str = "validation/family_code_pattern";
    pub const SKU_PATTERN: &str = "validation/sku_pattern";
    pub const MAX_FAMILY_CODE_LEN: &str = "validation/max_family_code_len";
    pub const MAX_FAMILY_NAME_LEN: &str = "validation/max_family_name_len";
    pub const MAX_PRODUCT_LINE_LEN: &str = "validation/max_product_line_len";
    pub const MAX_BRAND_LEN: &str = "validation/max_brand_len";
    pub const MAX_PRODUCT_NAME_LEN: &str = "validation/max_product_name_len";
    pub const MAX_VEHICLE_TYPE_LEN: &str = "validation/max_vehicle_type_len";
    pub const EAN_UPC_MIN_LEN: &str = "validation/ean_upc_min_len";
    pub const EAN_UPC_MAX_LEN: &str = "validation/ean_upc_max_len";
    pub const ALLOWED_PRODUCT_LINES: &str = "validation/allowed_product_lines"; // 逗号分隔
}

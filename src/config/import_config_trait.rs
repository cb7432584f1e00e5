// ==========================================
// 产品目录导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::validation_rules::ValidationRules;
use crate::domain::DuplicatePolicy;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::PathBuf;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取失败报告输出目录
    ///
    /// # 优先级
    /// 1. 环境变量 CATALOG_IMPORT_FAILURE_DIR
    /// 2. config_kv: import/failure_dir
    /// 3. 默认值 ./failures
    async fn get_failure_dir(&self) -> ImportResult<PathBuf>;

    /// 获取失败报告分隔符
    ///
    /// # 默认值
    /// - ';'
    async fn get_report_delimiter(&self) -> ImportResult<u8>;

    /// 获取批内重复策略
    ///
    /// # 默认值
    /// - LAST_WINS
    async fn get_duplicate_policy(&self) -> ImportResult<DuplicatePolicy>;

    /// 获取字段校验规则（默认规则 + config_kv 覆写）
    async fn get_validation_rules(&self) -> ImportResult<ValidationRules>;
}

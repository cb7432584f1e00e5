// ==========================================
// 产品目录导入系统 - 配置层
// ==========================================
// 职责: 导入配置管理（校验规则 / 失败报告 / 重复策略）
// 存储: config_kv 表，环境变量可覆写
// ==========================================

pub mod config_manager;
pub mod import_config_trait;
pub mod validation_rules;

// 重导出核心配置管理器
pub use config_manager::{config_keys, get_default_db_path, ConfigManager};
pub use import_config_trait::ImportConfigReader;
pub use validation_rules::ValidationRules;

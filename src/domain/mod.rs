// ==========================================
// 产品目录导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、导入中间结构、导入结果
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod family;
pub mod import;
pub mod product;
pub mod types;

// 重导出核心类型
pub use family::{Family, FamilyRecord};
pub use import::{EntityStats, FailureEntry, FailureFiles, ImportOutcome, ImportStats};
pub use product::{Product, ProductRecord, ProductWithFamily};
pub use types::{DuplicatePolicy, EntityKind, FamilyStatus, UpsertAction};

// ==========================================
// 产品目录导入系统 - 导入结果领域模型
// ==========================================
// 职责: 失败记录 / 导入统计 / 导入结果
// 生命周期: 仅在单次导入调用内
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ==========================================
// FailureEntry - 失败记录
// ==========================================
// 用途: 记录被拒绝的行（校验失败 / 引用失败 / 落库冲突）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEntry {
    pub row_number: usize,   // 原始文件数据行号
    pub key: Option<String>, // 标识（family_code 或 sku，可能缺失）
    pub reason: String,      // 失败原因
}

// ==========================================
// EntityStats - 单实体类型统计
// ==========================================
// 红线: 只增不减；failed == processed - inserted - updated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStats {
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
}

impl EntityStats {
    pub fn record_inserted(&mut self) {
        self.processed += 1;
        self.inserted += 1;
    }

    pub fn record_updated(&mut self) {
        self.processed += 1;
        self.updated += 1;
    }

    pub fn record_failed(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    /// 成功率（百分比，未处理任何行时为 0）
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        (self.processed - self.failed) as f64 / self.processed as f64 * 100.0
    }
}

// ==========================================
// ImportStats - 导入统计（对外契约）
// ==========================================
// 对齐: 调用方结果契约 stats.*（camelCase 平铺字段）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub families_processed: usize,
    pub families_inserted: usize,
    pub families_updated: usize,
    pub families_failed: usize,
    pub products_processed: usize,
    pub products_inserted: usize,
    pub products_updated: usize,
    pub products_failed: usize,
}

impl ImportStats {
    pub fn new(families: EntityStats, products: EntityStats) -> Self {
        Self {
            families_processed: families.processed,
            families_inserted: families.inserted,
            families_updated: families.updated,
            families_failed: families.failed,
            products_processed: products.processed,
            products_inserted: products.inserted,
            products_updated: products.updated,
            products_failed: products.failed,
        }
    }

    pub fn families(&self) -> EntityStats {
        EntityStats {
            processed: self.families_processed,
            inserted: self.families_inserted,
            updated: self.families_updated,
            failed: self.families_failed,
        }
    }

    pub fn products(&self) -> EntityStats {
        EntityStats {
            processed: self.products_processed,
            inserted: self.products_inserted,
            updated: self.products_updated,
            failed: self.products_failed,
        }
    }
}

// ==========================================
// FailureFiles - 失败报告位置
// ==========================================
// 无失败时为 None（不生成空报告）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureFiles {
    pub families: Option<PathBuf>,
    pub products: Option<PathBuf>,
}

// ==========================================
// ImportOutcome - 导入结果
// ==========================================
// 用途: 导入接口返回值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub batch_id: String,                   // 批次 ID（UUID，仅用于日志追溯）
    pub stats: ImportStats,                 // 汇总统计
    pub failure_files: FailureFiles,        // 失败报告位置
    pub family_failures: Vec<FailureEntry>, // 产品族失败明细（按输入顺序）
    pub product_failures: Vec<FailureEntry>, // 产品失败明细（按输入顺序）
    pub duration_ms: u64,                   // 总耗时（毫秒）
}

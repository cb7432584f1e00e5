// ==========================================
// 产品目录导入系统 - 冲突处理器实现
// ==========================================
// 职责: 处理同批次内重复标识（family_code / sku）
// 策略: LAST_WINS（后行覆盖前行，记录警告）/ REJECT（后行记为行级失败）
// 口径: 只有已成功落库的行才算"首次出现"
// ==========================================

use crate::domain::DuplicatePolicy;
use crate::importer::catalog_importer_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::HashMap;
use tracing::warn;

pub struct ConflictHandler {
    policy: DuplicatePolicy,
}

impl ConflictHandler {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }
}

impl Default for ConflictHandler {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl ConflictHandlerTrait for ConflictHandler {
    fn resolve_duplicate(
        &self,
        key_label: &str,
        key: &str,
        row_number: usize,
        first_row: usize,
    ) -> Option<String> {
        match self.policy {
            DuplicatePolicy::Reject => Some(duplicate_reason(key_label, key, first_row)),
            DuplicatePolicy::LastWins => {
                warn!(
                    key_label,
                    key,
                    row_number,
                    first_row,
                    "in-batch duplicate, later row overwrites earlier one"
                );
                None
            }
        }
    }
}

// ==========================================
// PersistedKeys - 批内已落库标识
// ==========================================
// 标识 → 首次成功落库的行号
#[derive(Debug, Default)]
pub struct PersistedKeys {
    first_rows: HashMap<String, usize>,
}

impl PersistedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询标识首次落库的行号（空标识交给校验器处理，恒为 None）
    pub fn first_row(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        self.first_rows.get(key).copied()
    }

    /// 记录落库成功的行；已有记录时保留最早的行号
    pub fn remember(&mut self, key: &str, row_number: usize) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        self.first_rows.entry(key.to_string()).or_insert(row_number);
    }
}

/// 批内重复失败原因文本
pub fn duplicate_reason(key_label: &str, key: &str, first_row: usize) -> String {
    format!(
        "duplicate {} in batch: {} (first seen at row {})",
        key_label, key, first_row
    )
}

// ==========================================
// 产品目录导入系统 - 领域类型定义
// ==========================================
// 职责: 产品族状态 / 实体类型 / 写入动作
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 产品族状态 (Family Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// 红线: 无默认值，必须由导入行显式提供
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FamilyStatus {
    Active,
    Inactive,
}

impl FamilyStatus {
    /// 数据库存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyStatus::Active => "ACTIVE",
            FamilyStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for FamilyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FamilyStatus {
    type Err = String;

    /// 严格匹配（不做大小写转换）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(FamilyStatus::Active),
            "INACTIVE" => Ok(FamilyStatus::Inactive),
            other => Err(format!("unknown family status: {}", other)),
        }
    }
}

// ==========================================
// 实体类型 (Entity Kind)
// ==========================================
// 用途: 统计/失败报告/日志的分组标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Families,
    Products,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Families => "families",
            EntityKind::Products => "products",
        }
    }

    /// 标识列名（失败报告表头）
    pub fn key_column(&self) -> &'static str {
        match self {
            EntityKind::Families => "familyCode",
            EntityKind::Products => "sku",
        }
    }

    /// 标识字段的可读名称（失败原因文本）
    pub fn key_label(&self) -> &'static str {
        match self {
            EntityKind::Families => "family code",
            EntityKind::Products => "sku",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 写入动作 (Upsert Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsertAction {
    Inserted,
    Updated,
}

impl UpsertAction {
    /// 是否为新建
    pub fn created(&self) -> bool {
        matches!(self, UpsertAction::Inserted)
    }
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Inserted => write!(f, "INSERT"),
            UpsertAction::Updated => write!(f, "UPDATE"),
        }
    }
}

// ==========================================
// 批内重复策略 (Duplicate Policy)
// ==========================================
// 同一批次内标识重复出现时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DuplicatePolicy {
    /// 后出现的行覆盖先出现的行（记录警告）
    #[default]
    LastWins,
    /// 后出现的行记为行级失败
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::LastWins => "LAST_WINS",
            DuplicatePolicy::Reject => "REJECT",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LAST_WINS" => Ok(DuplicatePolicy::LastWins),
            "REJECT" => Ok(DuplicatePolicy::Reject),
            other => Err(format!("unknown duplicate policy: {}", other)),
        }
    }
}

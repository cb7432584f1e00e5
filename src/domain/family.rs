// ==========================================
// 产品目录导入系统 - 产品族领域模型
// ==========================================
// 对齐: families 表
// ==========================================

use crate::domain::types::FamilyStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Family - 产品族主数据
// ==========================================
// 红线: family_code 全局唯一（主键）
// 用途: 导入层写入，查询层只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub family_code: String,  // 产品族编码（FAM_XXX_001）
    pub family_name: String,  // 产品族名称
    pub product_line: String, // 产品线
    pub brand: String,        // 品牌
    pub status: FamilyStatus, // 状态
}

// ==========================================
// FamilyRecord - 导入中间结构体
// ==========================================
// 用途: 导入管道中间产物（文件解析 → 字段映射 → 此结构）
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyRecord {
    // 源字段（原样，未校验）
    pub family_code: Option<String>,
    pub family_name: Option<String>,
    pub product_line: Option<String>,
    pub brand: Option<String>,
    pub status: Option<String>,

    // 元信息
    pub row_number: usize, // 原始文件数据行号（从 1 开始）
}

impl FamilyRecord {
    /// 转换为 Family（仅在校验通过后调用；字段缺失时返回 None）
    pub fn to_family(&self) -> Option<Family> {
        Some(Family {
            family_code: self.family_code.clone()?,
            family_name: self.family_name.clone()?,
            product_line: self.product_line.clone()?,
            brand: self.brand.clone()?,
            status: self.status.as_deref()?.parse().ok()?,
        })
    }
}

// ==========================================
// 产品目录导入系统 - 产品领域模型
// ==========================================
// 对齐: products 表
// 红线: 不允许孤儿产品（family_code 必须引用已存在的产品族）
// ==========================================

use crate::domain::types::FamilyStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Product - 产品主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub sku: String,                  // SKU（SKU-12345）
    pub name: String,                 // 产品名称
    pub ean_upc: String,              // 条码（8-14 位数字）
    pub vehicle_type: Option<String>, // 适用车型（可选）
    pub family_code: String,          // 所属产品族（外键）
}

// ==========================================
// ProductRecord - 导入中间结构体
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub family_code: Option<String>,
    pub ean_upc: Option<String>,
    pub vehicle_type: Option<String>,

    pub row_number: usize,
}

impl ProductRecord {
    /// 转换为 Product（仅在校验通过后调用）
    pub fn to_product(&self) -> Option<Product> {
        Some(Product {
            sku: self.sku.clone()?,
            name: self.name.clone()?,
            ean_upc: self.ean_upc.clone()?,
            vehicle_type: self.vehicle_type.clone(),
            family_code: self.family_code.clone()?,
        })
    }
}

// ==========================================
// ProductWithFamily - 查询视图（产品 + 所属产品族）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithFamily {
    pub sku: String,
    pub name: String,
    pub ean_upc: String,
    pub vehicle_type: Option<String>,
    pub family_code: String,
    pub family_name: String,
    pub product_line: String,
    pub brand: String,
    pub status: FamilyStatus,
}

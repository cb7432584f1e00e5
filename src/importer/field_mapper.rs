// ==========================================
// 产品目录导入系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 记录字段映射（别名 + 列名规范化）
// 规范化: 忽略大小写、空格、下划线、连字符（"Family Code" == "family_code" == "familyCode"）
// ==========================================

use crate::domain::{FamilyRecord, ProductRecord};
use crate::importer::catalog_importer_trait::FieldMapper as FieldMapperTrait;
use crate::importer::file_parser::RawRow;

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_family(&self, row: &RawRow) -> FamilyRecord {
        FamilyRecord {
            family_code: self.get_string(row, &["familycode", "code"]),
            family_name: self.get_string(row, &["familyname", "name"]),
            product_line: self.get_string(row, &["productline", "line"]),
            brand: self.get_string(row, &["brand"]),
            status: self.get_string(row, &["status", "familystatus"]),
            row_number: row.row_number,
        }
    }

    fn map_to_product(&self, row: &RawRow) -> ProductRecord {
        ProductRecord {
            sku: self.get_string(row, &["sku", "productsku"]),
            name: self.get_string(row, &["name", "productname"]),
            family_code: self.get_string(row, &["familycode", "family"]),
            ean_upc: self.get_string(row, &["eanupc", "ean", "upc", "barcode"]),
            vehicle_type: self.get_string(row, &["vehicletype", "vehicle"]),
            row_number: row.row_number,
        }
    }
}

impl FieldMapper {
    /// 提取字段原始值（按别名顺序匹配第一列）
    ///
    /// 列存在即返回 Some（即使为空），由校验阶段区分"缺失"与"为空"
    fn get_string(&self, row: &RawRow, aliases: &[&str]) -> Option<String> {
        for alias in aliases {
            let found = row
                .fields
                .iter()
                .find(|(column, _)| normalize_column(column) == *alias);
            if let Some((_, value)) = found {
                return Some(value.clone());
            }
        }
        None
    }
}

/// 列名规范化
fn normalize_column(column: &str) -> String {
    column
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

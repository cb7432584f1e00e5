// ==========================================
// 产品目录导入系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / 可选字段 NULL 标准化
// 红线: 不做大小写转换（状态等枚举值严格匹配）
// ==========================================

use crate::domain::{FamilyRecord, ProductRecord};
use crate::importer::catalog_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: Option<String>) -> Option<String> {
        value.map(|v| v.trim().to_string())
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        self.clean_text(value).filter(|v| !v.is_empty())
    }

    fn clean_family(&self, record: FamilyRecord) -> FamilyRecord {
        FamilyRecord {
            family_code: self.clean_text(record.family_code),
            family_name: self.clean_text(record.family_name),
            product_line: self.clean_text(record.product_line),
            brand: self.clean_text(record.brand),
            status: self.clean_text(record.status),
            row_number: record.row_number,
        }
    }

    fn clean_product(&self, record: ProductRecord) -> ProductRecord {
        ProductRecord {
            sku: self.clean_text(record.sku),
            name: self.clean_text(record.name),
            family_code: self.clean_text(record.family_code),
            ean_upc: self.clean_text(record.ean_upc),
            vehicle_type: self.normalize_null(record.vehicle_type),
            row_number: record.row_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_family_trims_without_uppercasing() {
        let cleaner = DataCleaner;
        let record = cleaner.clean_family(FamilyRecord {
            family_code: Some("  FAM_WIPERS_001 ".to_string()),
            status: Some(" active ".to_string()),
            row_number: 3,
            ..Default::default()
        });

        assert_eq!(record.family_code.as_deref(), Some("FAM_WIPERS_001"));
        assert_eq!(record.status.as_deref(), Some("active"));
        assert!(record.brand.is_none());
        assert_eq!(record.row_number, 3);
    }

    #[test]
    fn test_clean_product_blank_vehicle_type_is_absent() {
        let cleaner = DataCleaner;
        let record = cleaner.clean_product(ProductRecord {
            sku: Some("SKU-1 ".to_string()),
            name: Some("   ".to_string()),
            vehicle_type: Some("  ".to_string()),
            ..Default::default()
        });

        assert_eq!(record.sku.as_deref(), Some("SKU-1"));
        // 必填字段保留空串，由校验器报告 "cannot be empty"
        assert_eq!(record.name.as_deref(), Some(""));
        assert!(record.vehicle_type.is_none());
    }
}

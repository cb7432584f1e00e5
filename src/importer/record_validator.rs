// ==========================================
// 产品目录导入系统 - 记录校验器
// ==========================================
// 职责: 单行字段级校验（格式 / 必填 / 长度 / 枚举）
// 红线: 纯函数，无 I/O；收集全部违规项，不短路
// 说明: 引用存在性不在此处检查（见 referential_checker）
// ==========================================

use crate::config::ValidationRules;
use crate::domain::{FamilyRecord, ProductRecord};
use serde::{Deserialize, Serialize};

/// 失败原因分隔符
pub const REASON_SEPARATOR: &str = "--";

// ==========================================
// ValidationReport - 校验结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// 失败原因文本（多条以 "--" 连接）
    pub fn reason(&self) -> String {
        self.errors.join(REASON_SEPARATOR)
    }

    fn push(&mut self, message: String) {
        self.errors.push(message);
    }
}

// ==========================================
// RecordValidator
// ==========================================
pub struct RecordValidator {
    rules: ValidationRules,
}

impl RecordValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    /// 校验产品族记录
    pub fn validate_family(&self, record: &FamilyRecord) -> ValidationReport {
        let rules = &self.rules;
        let mut report = ValidationReport::default();

        if let Some(code) = required(&mut report, "Family Code", record.family_code.as_deref()) {
            if !rules.family_code_pattern.is_match(code) {
                report.push(format!(
                    "Family Code must match pattern (e.g., {})",
                    rules.family_code_example
                ));
            }
            max_len(&mut report, "Family Code", code, rules.max_family_code_len);
        }

        if let Some(name) = required(&mut report, "Family Name", record.family_name.as_deref()) {
            max_len(&mut report, "Family Name", name, rules.max_family_name_len);
        }

        if let Some(line) = required(&mut report, "Product Line", record.product_line.as_deref()) {
            max_len(&mut report, "Product Line", line, rules.max_product_line_len);
            if !rules.is_allowed_product_line(line) {
                if let Some(allowed) = &rules.allowed_product_lines {
                    report.push(format!("Product Line must be one of: {}", allowed.join(", ")));
                }
            }
        }

        if let Some(brand) = required(&mut report, "Brand", record.brand.as_deref()) {
            max_len(&mut report, "Brand", brand, rules.max_brand_len);
        }

        if let Some(status) = required(&mut report, "Status", record.status.as_deref()) {
            if !rules.is_allowed_status(status) {
                report.push(status_message(&rules.allowed_statuses));
            }
        }

        report
    }

    /// 校验产品记录
    pub fn validate_product(&self, record: &ProductRecord) -> ValidationReport {
        let rules = &self.rules;
        let mut report = ValidationReport::default();

        if let Some(sku) = required(&mut report, "SKU", record.sku.as_deref()) {
            if !rules.sku_pattern.is_match(sku) {
                report.push(format!("SKU must match pattern (e.g., {})", rules.sku_example));
            }
        }

        if let Some(name) = required(&mut report, "Product Name", record.name.as_deref()) {
            max_len(&mut report, "Product Name", name, rules.max_product_name_len);
        }

        if let Some(code) = required(&mut report, "Family Code", record.family_code.as_deref()) {
            max_len(&mut report, "Family Code", code, rules.max_family_code_len);
        }

        if let Some(ean) = required(&mut report, "EAN UPC", record.ean_upc.as_deref()) {
            if !ean.chars().all(|c| c.is_ascii_digit()) {
                report.push("EAN UPC must contain only digits".to_string());
            }
            let len = ean.chars().count();
            if len < rules.ean_upc_min_len || len > rules.ean_upc_max_len {
                report.push(format!(
                    "EAN UPC must be between {} and {} digits",
                    rules.ean_upc_min_len, rules.ean_upc_max_len
                ));
            }
        }

        if let Some(vehicle) = record.vehicle_type.as_deref() {
            max_len(&mut report, "Vehicle Type", vehicle, rules.max_vehicle_type_len);
        }

        report
    }
}

/// 必填检查：缺失 → "is required"；空 → "cannot be empty"
fn required<'a>(report: &mut ValidationReport, label: &str, value: Option<&'a str>) -> Option<&'a str> {
    match value {
        None => {
            report.push(format!("{} is required", label));
            None
        }
        Some(v) if v.trim().is_empty() => {
            report.push(format!("{} cannot be empty", label));
            None
        }
        Some(v) => Some(v),
    }
}

fn max_len(report: &mut ValidationReport, label: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        report.push(format!("{} must be at most {} characters", label, max));
    }
}

fn status_message(allowed: &[String]) -> String {
    match allowed {
        [a, b] => format!("Status must be either {} or {}", a, b),
        _ => format!("Status must be one of: {}", allowed.join(", ")),
    }
}

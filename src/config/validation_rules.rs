// ==========================================
// 产品目录导入系统 - 字段校验规则
// ==========================================
// 职责: 校验规则参数（正则 / 长度上限 / 枚举）
// 红线: 构造后不可变，由校验器持有
// ==========================================

use regex::Regex;
use std::sync::LazyLock;

/// 默认产品族编码正则
pub const DEFAULT_FAMILY_CODE_PATTERN: &str = r"^FAM_[A-Z_]+_\d{3}$";
/// 默认 SKU 正则
pub const DEFAULT_SKU_PATTERN: &str = r"^SKU-\d+$";

// 内置正则进程内只编译一次，Default 克隆
static DEFAULT_FAMILY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_builtin(DEFAULT_FAMILY_CODE_PATTERN));
static DEFAULT_SKU_REGEX: LazyLock<Regex> = LazyLock::new(|| compile_builtin(DEFAULT_SKU_PATTERN));

// ==========================================
// ValidationRules
// ==========================================
#[derive(Debug, Clone)]
pub struct ValidationRules {
    // ===== 格式 =====
    pub family_code_pattern: Regex,
    pub family_code_example: String, // 错误提示中的示例值
    pub sku_pattern: Regex,
    pub sku_example: String,

    // ===== 长度上限（字符数） =====
    pub max_family_code_len: usize,
    pub max_family_name_len: usize,
    pub max_product_line_len: usize,
    pub max_brand_len: usize,
    pub max_product_name_len: usize,
    pub max_vehicle_type_len: usize,

    // ===== EAN/UPC =====
    pub ean_upc_min_len: usize,
    pub ean_upc_max_len: usize,

    // ===== 枚举 =====
    pub allowed_statuses: Vec<String>,
    /// None: 产品线为自由文本
    pub allowed_product_lines: Option<Vec<String>>,
}

impl ValidationRules {
    /// 使用自定义正则构造（其余参数取默认值）
    pub fn with_patterns(family_code_pattern: &str, sku_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            family_code_pattern: Regex::new(family_code_pattern)?,
            sku_pattern: Regex::new(sku_pattern)?,
            ..Self::default()
        })
    }

    /// 产品线是否在允许范围内（未配置枚举时总是允许）
    pub fn is_allowed_product_line(&self, product_line: &str) -> bool {
        match &self.allowed_product_lines {
            None => true,
            Some(lines) => {
                let candidate = product_line.trim();
                lines.iter().any(|l| l.trim().eq_ignore_ascii_case(candidate))
            }
        }
    }

    /// 状态是否合法（严格匹配）
    pub fn is_allowed_status(&self, status: &str) -> bool {
        self.allowed_statuses.iter().any(|s| s == status)
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            family_code_pattern: DEFAULT_FAMILY_CODE_REGEX.clone(),
            family_code_example: "FAM_WIPERS_001".to_string(),
            sku_pattern: DEFAULT_SKU_REGEX.clone(),
            sku_example: "SKU-12345".to_string(),
            max_family_code_len: 50,
            max_family_name_len: 50,
            max_product_line_len: 50,
            max_brand_len: 50,
            max_product_name_len: 200,
            max_vehicle_type_len: 50,
            ean_upc_min_len: 8,
            ean_upc_max_len: 14,
            allowed_statuses: vec!["ACTIVE".to_string(), "INACTIVE".to_string()],
            allowed_product_lines: None,
        }
    }
}

/// 编译内置正则（常量模式，由 test_builtin_patterns_compile 覆盖）
fn compile_builtin(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("built-in pattern {} failed to compile: {}", pattern, e),
    }
}

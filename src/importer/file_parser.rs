// ==========================================
// 产品目录导入系统 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv，分号或逗号分隔) / Excel (.xlsx/.xls，首个工作表)
// 行号: 数据行编号（表头不计，从 1 开始）；空白行跳过但保留编号
// ==========================================

use crate::importer::catalog_importer_trait::FileParser;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

// ==========================================
// RawRow - 原始行记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub row_number: usize,               // 数据行号（从 1 开始）
    pub fields: HashMap<String, String>, // 列名 → 原始值
}

impl RawRow {
    fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

/// 检查文件存在及扩展名
fn check_file(path: &Path, allowed: &[&str]) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !allowed.contains(&ext.as_str()) {
        return Err(ImportError::UnsupportedFormat(ext));
    }
    Ok(())
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 根据表头行选择分隔符：含 ';' 用 ';'，否则用 ','
    fn detect_delimiter(content: &str) -> u8 {
        let header = content.lines().next().unwrap_or("");
        if header.contains(';') {
            b';'
        } else {
            b','
        }
    }

    /// 解析 CSV 文本
    pub fn parse_str(&self, content: &str) -> ImportResult<Vec<RawRow>> {
        // 去除 UTF-8 BOM
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let delimiter = Self::detect_delimiter(content);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(content.as_bytes());

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut row = RawRow {
                row_number: row_idx + 1,
                fields: HashMap::new(),
            };

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        row.fields.insert(header.clone(), value.to_string());
                    }
                }
            }

            // 跳过完全空白的行
            if row.is_blank() {
                debug!(row_number = row.row_number, "skip blank row");
                continue;
            }

            rows.push(row);
        }

        Ok(rows)
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        check_file(file_path, &["csv"])?;
        let content = std::fs::read_to_string(file_path)?;
        self.parse_str(&content)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        check_file(file_path, &["xlsx", "xls"])?;

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = match sheet_rows.next() {
            Some(row) => row,
            None => return Ok(Vec::new()),
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, data_row) in sheet_rows.enumerate() {
            let mut row = RawRow {
                row_number: row_idx + 1,
                fields: HashMap::new(),
            };

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        row.fields.insert(header.clone(), cell.to_string());
                    }
                }
            }

            if row.is_blank() {
                continue;
            }

            rows.push(row);
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_rows(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_rows(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_csv_parser_semicolon_file() {
        let file = csv_file(
            "familyCode;familyName;productLine;brand;status\n\
             FAM_WIPERS_001;Wiper Blades;WIPERS;VALEO;ACTIVE\n\
             FAM_FILTERS_001;Filters;FILTRATION;VALEO;INACTIVE\n",
        );

        let rows = CsvParser.parse_to_raw_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[0].fields.get("familyCode"), Some(&"FAM_WIPERS_001".to_string()));
        assert_eq!(rows[1].fields.get("status"), Some(&"INACTIVE".to_string()));
    }

    #[test]
    fn test_csv_parser_comma_fallback() {
        let rows = CsvParser
            .parse_str("sku,name,eanUpc\nSKU-1,\"Blade, 600mm\",12345678\n")
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields.get("name"), Some(&"Blade, 600mm".to_string()));
    }

    #[test]
    fn test_csv_parser_blank_rows_keep_numbering() {
        let rows = CsvParser
            .parse_str("sku;name\nSKU-1;A\n;\nSKU-3;C\n")
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 1);
        assert_eq!(rows[1].row_number, 3);
    }

    #[test]
    fn test_csv_parser_strips_bom() {
        let rows = CsvParser.parse_str("\u{feff}sku;name\nSKU-1;A\n").unwrap();
        assert_eq!(rows[0].fields.get("sku"), Some(&"SKU-1".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_rows(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse_to_raw_rows(Path::new("families.json"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}

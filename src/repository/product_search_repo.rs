// ==========================================
// 产品目录导入系统 - 产品查询 Repository
// ==========================================
// 职责: 产品 + 产品族联表查询（过滤 / 排序 / 分页）
// 红线: 只读，不参与导入事务
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{FamilyStatus, ProductWithFamily};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::{Type, Value};
use rusqlite::{params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// 默认页大小
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// 最大页大小
pub const MAX_PAGE_SIZE: usize = 100;

// ==========================================
// ProductSearchFilter - 查询条件
// ==========================================
// sku / name: 子串匹配；其余字段: 精确匹配
// 空白字符串视为未设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductSearchFilter {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub family_code: Option<String>,
    pub product_line: Option<String>,
    pub brand: Option<String>,
    pub status: Option<String>,
}

// ==========================================
// PageRequest - 分页参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,  // 从 1 开始
    pub limit: usize, // 1..=MAX_PAGE_SIZE
}

impl PageRequest {
    /// 规范化分页参数
    ///
    /// - page 缺省为 1，0 视为 1
    /// - limit 缺省为 DEFAULT_PAGE_SIZE，截断到 1..=MAX_PAGE_SIZE
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// 跳过的行数（超大页码饱和到 usize::MAX）
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

// ==========================================
// ProductSearchRepository
// ==========================================
pub struct ProductSearchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductSearchRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按条件分页查询
    ///
    /// # 返回
    /// - (当前页数据, 满足条件的总行数)
    pub fn search(
        &self,
        filter: &ProductSearchFilter,
        page: &PageRequest,
    ) -> RepositoryResult<(Vec<ProductWithFamily>, u64)> {
        let conn = self.get_conn()?;

        let (where_sql, mut values) = build_where_clause(filter);

        let count_sql = format!(
            "SELECT COUNT(*) FROM products p JOIN families f ON f.family_code = p.family_code{}",
            where_sql
        );
        let total: i64 = conn.query_row(&count_sql, params_from_iter(values.iter()), |row| {
            row.get(0)
        })?;

        let idx = values.len() + 1;
        let sql = format!(
            r#"SELECT p.sku, p.name, p.ean_upc, p.vehicle_type, p.family_code,
                      f.family_name, f.product_line, f.brand, f.status
               FROM products p
               JOIN families f ON f.family_code = p.family_code{}
               ORDER BY p.sku
               LIMIT ?{} OFFSET ?{}"#,
            where_sql,
            idx,
            idx + 1
        );
        values.push(Value::from(to_sql_int(page.limit)));
        values.push(Value::from(to_sql_int(page.offset())));

        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values), map_row)?
            .collect::<Result<Vec<ProductWithFamily>, _>>()?;

        Ok((items, total.max(0) as u64))
    }
}

/// 构建 WHERE 子句（参数化）
fn build_where_clause(filter: &ProductSearchFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    let mut push = |clause: &str, value: String| {
        values.push(Value::from(value));
        clauses.push(clause.replace("{}", &format!("?{}", values.len())));
    };

    let present = |v: &Option<String>| -> Option<String> {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(sku) = present(&filter.sku) {
        push("p.sku LIKE {} ESCAPE '\\'", like_pattern(&sku));
    }
    if let Some(name) = present(&filter.name) {
        push("p.name LIKE {} ESCAPE '\\'", like_pattern(&name));
    }
    if let Some(code) = present(&filter.family_code) {
        push("p.family_code = {}", code);
    }
    if let Some(line) = present(&filter.product_line) {
        push("f.product_line = {}", line);
    }
    if let Some(brand) = present(&filter.brand) {
        push("f.brand = {}", brand);
    }
    if let Some(status) = present(&filter.status) {
        push("f.status = {}", status);
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

/// 子串匹配模式（转义 LIKE 通配符）
fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductWithFamily> {
    let status_raw: String = row.get(8)?;
    let status = status_raw
        .parse::<FamilyStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, e.into()))?;

    Ok(ProductWithFamily {
        sku: row.get(0)?,
        name: row.get(1)?,
        ean_upc: row.get(2)?,
        vehicle_type: row.get(3)?,
        family_code: row.get(4)?,
        family_name: row.get(5)?,
        product_line: row.get(6)?,
        brand: row.get(7)?,
        status,
    })
}

/// SQLite 整数参数（超出 i64 时截断到 i64::MAX）
fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

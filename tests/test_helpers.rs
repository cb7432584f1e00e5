// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库 / 失败目录 / 记录构造 / 故障注入仓储
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_import::config::ValidationRules;
use catalog_import::db::{ensure_schema, open_sqlite_connection};
use catalog_import::domain::{
    DuplicatePolicy, Family, FamilyRecord, Product, ProductRecord,
};
use catalog_import::importer::{CatalogImporterImpl, CsvFailureReporter};
use catalog_import::repository::{
    CatalogRepository, RepositoryError, RepositoryResult, SqliteCatalogRepository,
};
use rusqlite::Connection;
use std::error::Error;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not valid UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（导入器与断言查询共用）
pub fn open_shared_connection(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()))
}

/// 创建 SQLite 仓储
pub fn create_repo(db_path: &str) -> Arc<SqliteCatalogRepository> {
    Arc::new(SqliteCatalogRepository::new(db_path).unwrap())
}

/// 创建导入器（默认规则）
pub fn create_importer<R: CatalogRepository>(
    repo: Arc<R>,
    failure_dir: &Path,
    policy: DuplicatePolicy,
) -> CatalogImporterImpl<R> {
    CatalogImporterImpl::new(
        repo,
        ValidationRules::default(),
        policy,
        Box::new(CsvFailureReporter::new(failure_dir)),
    )
}

/// 临时失败报告目录
pub fn failure_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// 目录下的文件数（目录不存在视为 0）
pub fn count_files(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

/// 直接计数某表的行数
pub fn count_rows(db_path: &str, table: &str) -> i64 {
    let conn = open_sqlite_connection(db_path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

// ==========================================
// 记录构造
// ==========================================

pub fn family_record(row: usize, code: &str, name: &str) -> FamilyRecord {
    FamilyRecord {
        family_code: Some(code.to_string()),
        family_name: Some(name.to_string()),
        product_line: Some("WIPERS".to_string()),
        brand: Some("VALEO".to_string()),
        status: Some("ACTIVE".to_string()),
        row_number: row,
    }
}

pub fn product_record(row: usize, sku: &str, family_code: &str) -> ProductRecord {
    ProductRecord {
        sku: Some(sku.to_string()),
        name: Some(format!("Product {}", sku)),
        family_code: Some(family_code.to_string()),
        ean_upc: Some("12345678".to_string()),
        vehicle_type: Some("CAR".to_string()),
        row_number: row,
    }
}

/// 生成 n 个合法产品族记录（FAM_TEST_001 ...）
pub fn family_records(n: usize) -> Vec<FamilyRecord> {
    (1..=n)
        .map(|i| family_record(i, &format!("FAM_TEST_{:03}", i), &format!("Family {}", i)))
        .collect()
}

// ==========================================
// FlakyRepository - 故障注入仓储
// ==========================================
// 前 N 次 insert_family 正常执行，之后返回连接错误
pub struct FlakyRepository {
    inner: SqliteCatalogRepository,
    inserts_before_failure: usize,
    family_inserts: AtomicUsize,
}

impl FlakyRepository {
    pub fn new(db_path: &str, inserts_before_failure: usize) -> Self {
        Self {
            inner: SqliteCatalogRepository::new(db_path).unwrap(),
            inserts_before_failure,
            family_inserts: AtomicUsize::new(0),
        }
    }

    pub fn family_inserts(&self) -> usize {
        self.family_inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogRepository for FlakyRepository {
    async fn begin(&self) -> RepositoryResult<()> {
        self.inner.begin().await
    }

    async fn commit(&self) -> RepositoryResult<()> {
        self.inner.commit().await
    }

    async fn rollback(&self) -> RepositoryResult<()> {
        self.inner.rollback().await
    }

    async fn find_family(&self, family_code: &str) -> RepositoryResult<Option<Family>> {
        self.inner.find_family(family_code).await
    }

    async fn family_exists(&self, family_code: &str) -> RepositoryResult<bool> {
        self.inner.family_exists(family_code).await
    }

    async fn insert_family(&self, family: &Family) -> RepositoryResult<()> {
        let attempt = self.family_inserts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.inserts_before_failure {
            return Err(RepositoryError::DatabaseConnectionError(
                "simulated storage outage".to_string(),
            ));
        }
        self.inner.insert_family(family).await
    }

    async fn update_family(&self, family: &Family) -> RepositoryResult<()> {
        self.inner.update_family(family).await
    }

    async fn find_product(&self, sku: &str) -> RepositoryResult<Option<Product>> {
        self.inner.find_product(sku).await
    }

    async fn insert_product(&self, product: &Product) -> RepositoryResult<()> {
        self.inner.insert_product(product).await
    }

    async fn update_product(&self, product: &Product) -> RepositoryResult<()> {
        self.inner.update_product(product).await
    }
}

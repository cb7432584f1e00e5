// ==========================================
// 产品目录导入系统 - 目录数据 Repository 实现
// ==========================================
// 职责: 实现产品族/产品数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::{Family, FamilyStatus, Product};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

// ==========================================
// SqliteCatalogRepository
// ==========================================
pub struct SqliteCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_family(row: &Row<'_>) -> rusqlite::Result<Family> {
        let status_raw: String = row.get(4)?;
        let status = status_raw
            .parse::<FamilyStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;

        Ok(Family {
            family_code: row.get(0)?,
            family_name: row.get(1)?,
            product_line: row.get(2)?,
            brand: row.get(3)?,
            status,
        })
    }

    fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
        Ok(Product {
            sku: row.get(0)?,
            name: row.get(1)?,
            ean_upc: row.get(2)?,
            vehicle_type: row.get(3)?,
            family_code: row.get(4)?,
        })
    }

    /// 事务控制语句失败统一归为事务错误（基础设施级）
    fn transaction_error(stage: &str, err: rusqlite::Error) -> RepositoryError {
        RepositoryError::DatabaseTransactionError(format!("{}: {}", stage, err))
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn begin(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if !conn.is_autocommit() {
            return Err(RepositoryError::DatabaseTransactionError(
                "BEGIN: a transaction is already open on this connection".to_string(),
            ));
        }
        // IMMEDIATE: 立即获取写锁，避免批次中途才发现锁冲突
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| Self::transaction_error("BEGIN", e))
    }

    async fn commit(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| Self::transaction_error("COMMIT", e))
    }

    async fn rollback(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        if conn.is_autocommit() {
            // 引擎已结束事务（例如 IO 错误触发的自动回滚）
            debug!("ROLLBACK skipped: no open transaction");
            return Ok(());
        }
        conn.execute_batch("ROLLBACK")
            .map_err(|e| Self::transaction_error("ROLLBACK", e))
    }

    async fn find_family(&self, family_code: &str) -> RepositoryResult<Option<Family>> {
        let conn = self.get_conn()?;
        let family = conn
            .query_row(
                r#"
                SELECT family_code, family_name, product_line, brand, status
                FROM families
                WHERE family_code = ?1
                "#,
                params![family_code],
                Self::map_family,
            )
            .optional()?;
        Ok(family)
    }

    async fn family_exists(&self, family_code: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM families WHERE family_code = ?1 LIMIT 1",
                params![family_code],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    async fn insert_family(&self, family: &Family) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO families (
                family_code, family_name, product_line, brand, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                family.family_code,
                family.family_name,
                family.product_line,
                family.brand,
                family.status.as_str(),
                now,
            ],
        )?;
        Ok(())
    }

    async fn update_family(&self, family: &Family) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE families
            SET family_name = ?2, product_line = ?3, brand = ?4, status = ?5, updated_at = ?6
            WHERE family_code = ?1
            "#,
            params![
                family.family_code,
                family.family_name,
                family.product_line,
                family.brand,
                family.status.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "family".to_string(),
                id: family.family_code.clone(),
            });
        }
        Ok(())
    }

    async fn find_product(&self, sku: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let product = conn
            .query_row(
                r#"
                SELECT sku, name, ean_upc, vehicle_type, family_code
                FROM products
                WHERE sku = ?1
                "#,
                params![sku],
                Self::map_product,
            )
            .optional()?;
        Ok(product)
    }

    async fn insert_product(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            r#"
            INSERT INTO products (
                sku, name, ean_upc, vehicle_type, family_code, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                product.sku,
                product.name,
                product.ean_upc,
                product.vehicle_type,
                product.family_code,
                now,
            ],
        )?;
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE products
            SET name = ?2, ean_upc = ?3, vehicle_type = ?4, family_code = ?5, updated_at = ?6
            WHERE sku = ?1
            "#,
            params![
                product.sku,
                product.name,
                product.ean_upc,
                product.vehicle_type,
                product.family_code,
                Utc::now().to_rfc3339(),
            ],
        )?;

        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "product".to_string(),
                id: product.sku.clone(),
            });
        }
        Ok(())
    }
}

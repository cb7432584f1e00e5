// ==========================================
// 产品目录导入系统 - 目录数据 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD + 事务边界
// ==========================================

use crate::domain::{Family, Product};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogRepository Trait
// ==========================================
// 用途: 产品族/产品数据访问 + 事务控制
// 实现者: SqliteCatalogRepository（使用 rusqlite）
//
// 约定: begin 之后的所有读写都在同一事务上下文中执行，
//       因此同批次内先写入的产品族对后续产品的引用检查可见。
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ===== 事务边界 =====

    /// 开启事务
    async fn begin(&self) -> RepositoryResult<()>;

    /// 提交事务
    async fn commit(&self) -> RepositoryResult<()>;

    /// 回滚事务
    ///
    /// # 说明
    /// - 若存储引擎已自行结束事务，应视为无操作并返回 Ok
    async fn rollback(&self) -> RepositoryResult<()>;

    // ===== 产品族 =====

    /// 按 family_code 查询产品族
    ///
    /// # 返回
    /// - Ok(Some(Family)): 找到
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    async fn find_family(&self, family_code: &str) -> RepositoryResult<Option<Family>>;

    /// 检查产品族是否存在
    async fn family_exists(&self, family_code: &str) -> RepositoryResult<bool>;

    /// 插入产品族（普通 INSERT，主键冲突返回 UniqueConstraintViolation）
    async fn insert_family(&self, family: &Family) -> RepositoryResult<()>;

    /// 更新产品族可变字段（未命中行返回 NotFound）
    async fn update_family(&self, family: &Family) -> RepositoryResult<()>;

    // ===== 产品 =====

    /// 按 SKU 查询产品
    async fn find_product(&self, sku: &str) -> RepositoryResult<Option<Product>>;

    /// 插入产品（普通 INSERT）
    async fn insert_product(&self, product: &Product) -> RepositoryResult<()>;

    /// 更新产品可变字段
    async fn update_product(&self, product: &Product) -> RepositoryResult<()>;
}

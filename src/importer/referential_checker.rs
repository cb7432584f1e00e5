// ==========================================
// 产品目录导入系统 - 引用检查器
// ==========================================
// 职责: 产品 → 产品族引用存在性检查
// 约束: 与落库共用同一连接与事务，批内先写入的产品族可见
// ==========================================

use crate::domain::Product;
use crate::repository::{CatalogRepository, RepositoryResult};
use std::sync::Arc;

pub struct ReferentialChecker<R: CatalogRepository> {
    repo: Arc<R>,
}

impl<R: CatalogRepository> ReferentialChecker<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn family_exists(&self, family_code: &str) -> RepositoryResult<bool> {
        self.repo.family_exists(family_code).await
    }

    /// 检查产品的产品族引用
    ///
    /// # 返回
    /// - Ok(None): 引用有效
    /// - Ok(Some(reason)): 产品族不存在
    pub async fn check_product(&self, product: &Product) -> RepositoryResult<Option<String>> {
        if self.family_exists(&product.family_code).await? {
            Ok(None)
        } else {
            Ok(Some(missing_family_reason(&product.family_code)))
        }
    }
}

/// 引用失败原因文本
pub fn missing_family_reason(family_code: &str) -> String {
    format!("family not found: {}", family_code)
}

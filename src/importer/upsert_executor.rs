// ==========================================
// 产品目录导入系统 - 落库执行器
// ==========================================
// 职责: 按标识查找 → 存在则 UPDATE，否则普通 INSERT
// 红线: 不使用 INSERT OR REPLACE；并发冲突以唯一约束错误暴露为行级失败
// ==========================================

use crate::domain::{Family, Product, UpsertAction};
use crate::repository::{CatalogRepository, RepositoryResult};
use std::sync::Arc;
use tracing::debug;

pub struct UpsertExecutor<R: CatalogRepository> {
    repo: Arc<R>,
}

impl<R: CatalogRepository> UpsertExecutor<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn upsert_family(&self, family: &Family) -> RepositoryResult<UpsertAction> {
        let action = match self.repo.find_family(&family.family_code).await? {
            Some(_) => {
                self.repo.update_family(family).await?;
                UpsertAction::Updated
            }
            None => {
                self.repo.insert_family(family).await?;
                UpsertAction::Inserted
            }
        };

        debug!(family_code = %family.family_code, action = %action, "family upserted");
        Ok(action)
    }

    pub async fn upsert_product(&self, product: &Product) -> RepositoryResult<UpsertAction> {
        let action = match self.repo.find_product(&product.sku).await? {
            Some(_) => {
                self.repo.update_product(product).await?;
                UpsertAction::Updated
            }
            None => {
                self.repo.insert_product(product).await?;
                UpsertAction::Inserted
            }
        };

        debug!(sku = %product.sku, action = %action, "product upserted");
        Ok(action)
    }
}

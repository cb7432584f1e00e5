// ==========================================
// 产品目录导入系统 - 工作单元
// ==========================================
// 职责: 单次导入的事务边界
// 约束: active 标记为真时才允许回滚；提交失败时保持 active，由调用方回滚
// ==========================================

use crate::repository::{CatalogRepository, RepositoryResult};
use std::sync::Arc;
use tracing::{debug, error};

pub struct UnitOfWork<R: CatalogRepository> {
    repo: Arc<R>,
    active: bool,
}

impl<R: CatalogRepository> UnitOfWork<R> {
    /// 开启事务
    pub async fn begin(repo: Arc<R>) -> RepositoryResult<Self> {
        repo.begin().await?;
        debug!("unit of work started");
        Ok(Self { repo, active: true })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 提交事务
    pub async fn commit(&mut self) -> RepositoryResult<()> {
        self.repo.commit().await?;
        self.active = false;
        debug!("unit of work committed");
        Ok(())
    }

    /// 若事务仍处于活动状态则回滚（尽力而为，失败只记录日志）
    pub async fn rollback_if_active(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        match self.repo.rollback().await {
            Ok(()) => debug!("unit of work rolled back"),
            Err(e) => error!(error = %e, "rollback failed"),
        }
    }
}

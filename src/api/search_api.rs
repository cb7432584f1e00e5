// ==========================================
// 产品目录导入系统 - 产品查询API
// ==========================================
// 职责: 产品 + 产品族联合查询，分页返回
// 分页: page ≥ 1（默认 1）；limit 限制在 1..=100（默认 20）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db::open_sqlite_connection;
use crate::domain::ProductWithFamily;
use crate::repository::{PageRequest, ProductSearchFilter, ProductSearchRepository};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 分页信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub page_size: usize,
    pub total_results: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Pagination {
    fn new(page: &PageRequest, total_results: u64) -> Self {
        let page_size = page.limit as u64;
        let total_pages = total_results.div_ceil(page_size);
        Self {
            current_page: page.page,
            page_size: page.limit,
            total_results,
            total_pages,
            has_next_page: (page.page as u64) < total_pages,
            has_previous_page: page.page > 1,
        }
    }
}

/// 产品查询响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSearchResponse {
    pub products: Vec<ProductWithFamily>,
    pub pagination: Pagination,
}

/// 产品查询API
pub struct SearchApi {
    search_repo: ProductSearchRepository,
}

impl SearchApi {
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            search_repo: ProductSearchRepository::from_connection(conn),
        }
    }

    /// 查询产品
    ///
    /// # 参数
    /// - filter: sku / name 为子串匹配；family_code / product_line / brand / status 为精确匹配
    /// - page: 页码（缺省 1）
    /// - limit: 每页条数（缺省 20，上限 100）
    pub fn search_products(
        &self,
        filter: &ProductSearchFilter,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> ApiResult<ProductSearchResponse> {
        let page = PageRequest::new(page, limit);
        let (products, total) = self.search_repo.search(filter, &page)?;

        debug!(
            page = page.page,
            limit = page.limit,
            returned = products.len(),
            total = total,
            "product search"
        );

        Ok(ProductSearchResponse {
            products,
            pagination: Pagination::new(&page, total),
        })
    }
}

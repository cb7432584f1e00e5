// ==========================================
// 产品目录导入系统 - API 层
// ==========================================
// 职责: 提供调用方接口（导入 / 产品查询）
// ==========================================

pub mod error;
pub mod import_api;
pub mod search_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{FailureFilesResponse, ImportApi, ImportApiResponse};
pub use search_api::{Pagination, ProductSearchResponse, SearchApi};

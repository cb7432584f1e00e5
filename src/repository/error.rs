// ==========================================
// 产品目录导入系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: 行级错误（记录失败，批次继续）/ 基础设施错误（整批回滚）
// ==========================================

use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 行级错误 =====
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("unique constraint violated: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    // ===== 基础设施错误 =====
    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database lock failed: {0}")]
    LockError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failed: {0}")]
    DatabaseQueryError(String),

    // ===== 通用错误 =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 是否为行级错误（可归因于单行数据，不影响其他行）
    ///
    /// 其余错误均视为基础设施错误：中止批次并回滚
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            RepositoryError::NotFound { .. }
                | RepositoryError::UniqueConstraintViolation(_)
                | RepositoryError::ForeignKeyViolation(_)
                | RepositoryError::ConstraintViolation(_)
        )
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg) => {
                let msg = msg.unwrap_or_else(|| e.to_string());
                match e.code {
                    ErrorCode::ConstraintViolation => match e.extended_code {
                        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                            RepositoryError::UniqueConstraintViolation(msg)
                        }
                        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => RepositoryError::ForeignKeyViolation(msg),
                        _ if msg.contains("UNIQUE") => RepositoryError::UniqueConstraintViolation(msg),
                        _ if msg.contains("FOREIGN KEY") => RepositoryError::ForeignKeyViolation(msg),
                        _ => RepositoryError::ConstraintViolation(msg),
                    },
                    ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::SystemIoFailure => RepositoryError::DatabaseConnectionError(msg),
                    _ => RepositoryError::DatabaseQueryError(msg),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

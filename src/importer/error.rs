// ==========================================
// 产品目录导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 本类型只承载批次级错误；行级失败记录为 FailureEntry，不走 Err
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .csv/.xlsx/.xls)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("csv parse failed: {0}")]
    CsvParseError(String),

    // ===== 数据库错误 =====
    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failed: {0}")]
    DatabaseQueryError(String),

    #[error("schema version {found} is newer than supported version {supported}")]
    SchemaVersionMismatch { found: i64, supported: i64 },

    // ===== 配置错误 =====
    #[error("config read failed (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("invalid config value (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 失败报告 =====
    #[error("failure report export failed: {0}")]
    FailureExportError(String),

    // ===== 通用错误 =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::DatabaseQueryError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<RepositoryError>
//
// 仅用于批次级传播：行级错误在编排器内已被转为 FailureEntry
impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseConnectionError(msg) | RepositoryError::LockError(msg) => {
                ImportError::DatabaseConnectionError(msg)
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ImportError::DatabaseTransactionError(msg)
            }
            RepositoryError::Other(e) => ImportError::Other(e),
            other => ImportError::DatabaseQueryError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_mapping() {
        let err: ImportError = RepositoryError::DatabaseConnectionError("disk gone".into()).into();
        assert!(matches!(err, ImportError::DatabaseConnectionError(_)));

        let err: ImportError = RepositoryError::LockError("poisoned".into()).into();
        assert!(matches!(err, ImportError::DatabaseConnectionError(_)));

        let err: ImportError = RepositoryError::DatabaseTransactionError("COMMIT".into()).into();
        assert!(matches!(err, ImportError::DatabaseTransactionError(_)));
    }

    #[test]
    fn test_io_error_mapping() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ImportError = io.into();
        assert!(err.to_string().contains("denied"));
    }
}

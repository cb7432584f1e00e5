// ==========================================
// 产品目录导入系统 - 失败报告导出
// ==========================================
// 输出: <UTC 时间戳>-<families|products>_failures-<短 ID>.csv
// 表头: rowNumber;<familyCode|sku>;reason
// 红线: 无失败记录时不创建任何文件
// ==========================================

use crate::domain::{EntityKind, FailureEntry};
use crate::importer::catalog_importer_trait::FailureReporter;
use crate::importer::error::{ImportError, ImportResult};
use chrono::Utc;
use csv::{QuoteStyle, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

pub struct CsvFailureReporter {
    failure_dir: PathBuf,
    delimiter: u8,
}

impl CsvFailureReporter {
    pub fn new(failure_dir: impl Into<PathBuf>) -> Self {
        Self {
            failure_dir: failure_dir.into(),
            delimiter: b';',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn failure_dir(&self) -> &PathBuf {
        &self.failure_dir
    }

    fn file_name(kind: EntityKind) -> String {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
        let short_id = Uuid::new_v4().simple().to_string();
        format!("{}-{}_failures-{}.csv", timestamp, kind.as_str(), &short_id[..8])
    }

    fn write_file(&self, path: &Path, kind: EntityKind, failures: &[FailureEntry]) -> ImportResult<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .from_path(path)
            .map_err(|e| ImportError::FailureExportError(e.to_string()))?;

        writer
            .write_record(["rowNumber", kind.key_column(), "reason"])
            .map_err(|e| ImportError::FailureExportError(e.to_string()))?;

        for failure in failures {
            writer
                .write_record([
                    failure.row_number.to_string().as_str(),
                    failure.key.as_deref().unwrap_or(""),
                    failure.reason.as_str(),
                ])
                .map_err(|e| ImportError::FailureExportError(e.to_string()))?;
        }

        writer
            .flush()
            .map_err(|e| ImportError::FailureExportError(e.to_string()))
    }
}

impl FailureReporter for CsvFailureReporter {
    fn export(&self, kind: EntityKind, failures: &[FailureEntry]) -> ImportResult<Option<PathBuf>> {
        if failures.is_empty() {
            info!(entity = %kind, "no failures to export");
            return Ok(None);
        }

        std::fs::create_dir_all(&self.failure_dir).map_err(|e| {
            ImportError::FailureExportError(format!(
                "cannot create {}: {}",
                self.failure_dir.display(),
                e
            ))
        })?;

        let path = self.failure_dir.join(Self::file_name(kind));
        if let Err(e) = self.write_file(&path, kind, failures) {
            error!(entity = %kind, path = %path.display(), error = %e, "failure export failed");
            return Err(e);
        }

        info!(
            entity = %kind,
            failure_count = failures.len(),
            path = %path.display(),
            "failures exported"
        );
        Ok(Some(path))
    }
}

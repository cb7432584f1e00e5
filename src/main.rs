// ==========================================
// 产品目录导入系统 - 命令行入口
// ==========================================
// 用法:
//   catalog-import <families file> <products file> [db path]
//
// 导入结果 JSON 输出到 stdout；日志输出到 stderr
// 基础设施错误时以非零状态退出
// ==========================================

use anyhow::{bail, Context};
use catalog_import::api::ImportApi;
use catalog_import::config::get_default_db_path;
use catalog_import::logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let (families_path, products_path) = match (args.next(), args.next()) {
        (Some(f), Some(p)) => (PathBuf::from(f), PathBuf::from(p)),
        _ => bail!("usage: catalog-import <families file> <products file> [db path]"),
    };
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    tracing::info!(
        app = catalog_import::APP_NAME,
        version = catalog_import::VERSION,
        db_path = %db_path,
        "starting"
    );

    if let Some(parent) = PathBuf::from(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create database directory {}", parent.display()))?;
        }
    }

    let api = ImportApi::new(&db_path)
        .await
        .with_context(|| format!("cannot open catalog database {}", db_path))?;

    let response = api
        .import_files(&families_path, &products_path)
        .await
        .context("catalog import failed")?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

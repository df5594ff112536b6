//! プロジェクトローダー
//!
//! プロジェクトルートの決定と `shipyard.kdl` の読み込みを行います。
//! 上位ディレクトリの探索は行いません。

use crate::error::Result;
use crate::model::Project;
use crate::parser::parse_kdl_file;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// プロジェクト定義ファイル名
pub const PROJECT_FILE: &str = "shipyard.kdl";

/// プロジェクトルートを決定
///
/// 1. 環境変数 SHIPYARD_PROJECT_ROOT
/// 2. カレントディレクトリ（環境変数が空の場合も含む）
pub fn project_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var("SHIPYARD_PROJECT_ROOT")
        && !root.is_empty()
    {
        debug!(env_root = %root, "Using SHIPYARD_PROJECT_ROOT");
        return Ok(PathBuf::from(root));
    }
    Ok(std::env::current_dir()?)
}

/// ルートディレクトリの shipyard.kdl からプロジェクトをロード
#[instrument(skip(root), fields(project_root = %root.display()))]
pub fn load_project(root: &Path) -> Result<Project> {
    load_project_file(&root.join(PROJECT_FILE))
}

/// 指定ファイルからプロジェクトをロード
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_project_file(path: &Path) -> Result<Project> {
    let project = parse_kdl_file(path)?;
    info!(
        project = %project.name,
        apps = project.apps.len(),
        "Project loaded successfully"
    );
    Ok(project)
}

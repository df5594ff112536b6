//! Project定義

use super::app::BuildConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project - ビルド対象アプリケーションの集合
///
/// `apps` は定義ファイルに書かれた順序を保持します。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// プロジェクト名
    pub name: String,
    /// プロジェクトルート（相対パスの基準）
    pub root: PathBuf,
    /// このプロジェクトで定義されるアプリケーション
    #[serde(default)]
    pub apps: Vec<BuildConfig>,
}

impl Project {
    /// ビルド設定の一覧（定義順）
    pub fn build_configs(&self) -> &[BuildConfig] {
        &self.apps
    }

    /// 名前でアプリケーションを取得
    pub fn app(&self, name: &str) -> Option<&BuildConfig> {
        self.apps.iter().find(|app| app.name == name)
    }
}

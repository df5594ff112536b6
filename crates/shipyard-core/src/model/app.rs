//! アプリケーション（ビルド設定）定義

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// ビルド設定
///
/// KDL形式：
/// ```kdl
/// app "backend" {
///     dockerfile "docker/backend.Dockerfile"
///     context "."
///     target "release"
///     args {
///         KEY "value"
///     }
///     git "vendor/shared"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// アプリケーション名
    pub name: String,
    /// Dockerfileのパス（プロジェクトルートからの相対パス）
    pub dockerfile: Option<PathBuf>,
    /// ビルドコンテキストのパス（プロジェクトルートからの相対パス）
    /// 未指定の場合はプロジェクトルート
    pub context: Option<PathBuf>,
    /// ビルド引数
    #[serde(default)]
    pub args: HashMap<String, String>,
    /// マルチステージビルドのターゲット
    pub target: Option<String>,
    /// ビルド前に fetch するローカル git チェックアウト
    #[serde(default)]
    pub git: Vec<PathBuf>,
}

impl BuildConfig {
    /// 名前だけを持つビルド設定を作成
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

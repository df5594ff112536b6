//! エクスポート契約
//!
//! 1つのアプリケーションをビルドしてレジストリへ送り出す処理の境界を定義します。

use crate::error::BuildResult;
use crate::tag::TagFormat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shipyard_core::{BuildConfig, Project};

/// エクスポート時の動作フラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// ビルド前の git fetch を行わない
    pub ignore_git_fetch: bool,
    /// エクスポートの一部として必ずビルドする
    pub should_be_built: bool,
}

impl ExportOptions {
    /// spush で固定的に使うフラグ
    pub const SPUSH: ExportOptions = ExportOptions {
        ignore_git_fetch: true,
        should_be_built: true,
    };
}

/// 1回のエクスポート呼び出しに紐づくコンテキスト
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    /// 対象のビルド設定
    pub config: &'a BuildConfig,
    /// ビルド設定を所有するプロジェクト
    pub project: &'a Project,
    pub options: ExportOptions,
}

impl<'a> ExportContext<'a> {
    pub fn new(config: &'a BuildConfig, project: &'a Project, options: ExportOptions) -> Self {
        Self {
            config,
            project,
            options,
        }
    }
}

/// エクスポート結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOutcome {
    /// エクスポートしたアプリケーション名
    pub app: String,
    /// プッシュした `repo:tag` 参照（タグ順）
    pub references: Vec<String>,
}

/// エクスポートを実行するコラボレーター
#[async_trait]
pub trait Exporter: Send + Sync {
    /// コンテキストのアプリケーションを `repo` へエクスポート
    ///
    /// `format` の `%{repo}` は `repo` に、`%{tag}` は実装側が決めたタグに置換されます。
    async fn export(
        &self,
        context: &ExportContext<'_>,
        repo: &str,
        format: &TagFormat,
    ) -> BuildResult<ExportOutcome>;
}

//! git 連携
//!
//! ローカル git チェックアウトの fetch と、タグ用のブランチ・コミット取得を行います。

use crate::error::{BuildError, BuildResult};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// プロジェクトルートの git 情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    /// 現在のブランチ名（detached HEAD の場合は None）
    pub branch: Option<String>,
    /// HEAD のコミットID
    pub commit: Option<String>,
}

impl GitInfo {
    /// `git rev-parse` で現在のブランチとコミットを取得
    ///
    /// git リポジトリでない場合や git が無い場合は空の情報を返します。
    pub async fn detect(root: &Path) -> Self {
        let branch = rev_parse(root, &["--abbrev-ref", "HEAD"])
            .await
            .filter(|b| b != "HEAD");
        let commit = rev_parse(root, &["HEAD"]).await;
        tracing::debug!(?branch, ?commit, "Detected git info");
        Self { branch, commit }
    }
}

async fn rev_parse(root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .arg("rev-parse")
        .args(args)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// アプリケーションが参照する git チェックアウトを fetch
///
/// `sources` はプロジェクトルートからの相対パスです。
pub async fn fetch_sources(root: &Path, sources: &[PathBuf]) -> BuildResult<()> {
    for source in sources {
        let path = root.join(source);
        if !path.is_dir() {
            return Err(BuildError::GitFetchFailed {
                path,
                message: "directory not found".to_string(),
            });
        }

        tracing::info!(path = %path.display(), "Fetching git source");

        let output = Command::new("git")
            .arg("-C")
            .arg(&path)
            .args(["fetch", "--quiet", "--all"])
            .output()
            .await
            .map_err(|e| BuildError::GitFetchFailed {
                path: path.clone(),
                message: format!("failed to run git: {}", e),
            })?;

        if !output.status.success() {
            return Err(BuildError::GitFetchFailed {
                path,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
    }

    Ok(())
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Unexpected application count: spush requires exactly one app")]
    UnexpectedApplicationCount,

    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Image not built: {0}")]
    ImageNotBuilt(String),

    #[error("Invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid tag: {tag}")]
    InvalidTag { tag: String },

    #[error("Tag source unavailable: {origin}")]
    TagUnavailable { origin: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Git fetch failed for {path}: {message}")]
    GitFetchFailed { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::UnexpectedApplicationCount => {
                "spush はアプリケーションがちょうど1つのプロジェクトでのみ実行できます\n\
                 \n\
                 shipyard.kdl の app 定義を1つにしてください。"
                    .to_string()
            }
            BuildError::DockerfileNotFound(path) => {
                format!(
                    "Dockerfileが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. Dockerfileのパスを確認してください\n\
                     2. shipyard.kdlで明示的にパスを指定してください:\n\
                        dockerfile \"path/to/Dockerfile\"",
                    path.display()
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "ビルドコンテキストが見つかりません: {}\n\
                     \n\
                     shipyard.kdlでcontextパスを確認してください。",
                    path.display()
                )
            }
            BuildError::DockerConnection(e) => {
                format!(
                    "Docker接続エラー: {}\n\
                     \n\
                     解決方法:\n\
                     • Dockerが起動しているか確認してください\n\
                     • docker ps コマンドが正常に動作するか確認してください",
                    e
                )
            }
            BuildError::BuildFailed(msg) => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Dockerfileの内容を確認してください。",
                    msg
                )
            }
            BuildError::ImageNotBuilt(image) => {
                format!("イメージがまだビルドされていません: {}", image)
            }
            BuildError::InvalidTag { tag } => {
                format!(
                    "無効なタグです: {}\n\
                     \n\
                     タグは128文字以下の英数字・ピリオド・ハイフン・アンダースコアで指定してください。",
                    tag
                )
            }
            BuildError::TagUnavailable { origin } => {
                format!("タグを決定できません（{} が取得できません）", origin)
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;

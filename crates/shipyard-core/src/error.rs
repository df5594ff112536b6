use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "プロジェクトファイルが見つかりません: {0}\nヒント: shipyard.kdl を含むディレクトリで実行するか --file で指定してください"
    )]
    ProjectFileNotFound(PathBuf),

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("アプリケーション '{0}' が重複して定義されています")]
    DuplicateApp(String),
}

pub type Result<T> = std::result::Result<T, ProjectError>;

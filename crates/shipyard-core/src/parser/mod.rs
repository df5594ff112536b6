//! KDLパーサー
//!
//! `shipyard.kdl` をパースして `Project` を生成します。

mod app;

use app::parse_app;

use crate::error::{ProjectError, Result};
use crate::model::Project;
use kdl::{KdlDocument, KdlNode, KdlValue};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// KDLファイルをパースしてProjectを生成
///
/// プロジェクトルートはファイルの親ディレクトリになります。
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Project> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProjectError::ProjectFileNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = directory_name(&root);
    parse_kdl_string(&content, name, root)
}

/// ディレクトリ名（`.` や `..` は実際のパスに解決してから取る）
fn directory_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            fs::canonicalize(root)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "unnamed".to_string())
}

/// KDL文字列をパース
pub fn parse_kdl_string(content: &str, default_name: String, root: PathBuf) -> Result<Project> {
    let doc: KdlDocument = content.parse()?;

    let mut name = default_name;
    let mut parsed = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "project" => {
                if let Some(project_name) = first_string(node) {
                    name = project_name;
                }
            }
            "app" => {
                parsed.push(parse_app(node)?);
            }
            other => {
                tracing::debug!(node = other, "Skipping unknown node");
            }
        }
    }

    // 名前なしの app はプロジェクト名を引き継ぐ
    let mut seen = HashSet::new();
    let mut apps = Vec::with_capacity(parsed.len());
    for (app_name, mut app) in parsed {
        app.name = app_name.unwrap_or_else(|| name.clone());
        if !seen.insert(app.name.clone()) {
            return Err(ProjectError::DuplicateApp(app.name));
        }
        apps.push(app);
    }

    tracing::debug!(project = %name, apps = apps.len(), "Parsed project");

    Ok(Project { name, root, apps })
}

/// ノードの最初の位置引数を文字列として取得
pub(crate) fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| value_to_string(e.value()))
}

/// スカラー値を文字列に変換（null は None）
pub(crate) fn value_to_string(value: &KdlValue) -> Option<String> {
    match value {
        KdlValue::String(s) => Some(s.clone()),
        KdlValue::Integer(i) => Some(i.to_string()),
        KdlValue::Float(f) => Some(f.to_string()),
        KdlValue::Bool(b) => Some(b.to_string()),
        KdlValue::Null => None,
    }
}

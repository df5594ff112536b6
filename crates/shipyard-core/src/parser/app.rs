//! app ノードのパース

use super::{first_string, value_to_string};
use crate::error::{ProjectError, Result};
use crate::model::BuildConfig;
use kdl::KdlNode;
use std::path::PathBuf;

/// app ノードをパース
///
/// 名前が省略された場合は `None` を返し、呼び出し側でプロジェクト名を割り当てます。
pub fn parse_app(node: &KdlNode) -> Result<(Option<String>, BuildConfig)> {
    let name = first_string(node);
    if let Some(n) = &name
        && n.trim().is_empty()
    {
        return Err(ProjectError::InvalidConfig(
            "app name must not be empty".to_string(),
        ));
    }

    let mut app = BuildConfig::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "dockerfile" => {
                    app.dockerfile = Some(PathBuf::from(required_string(child, "dockerfile")?));
                }
                "context" => {
                    app.context = Some(PathBuf::from(required_string(child, "context")?));
                }
                "target" => {
                    app.target = Some(required_string(child, "target")?);
                }
                "args" => {
                    if let Some(args) = child.children() {
                        for arg in args.nodes() {
                            let key = arg.name().value().to_string();
                            let value = first_string(arg).unwrap_or_default();
                            app.args.insert(key, value);
                        }
                    }
                }
                "git" => {
                    // git "a" "b" のように複数指定も可能
                    for entry in child.entries().iter().filter(|e| e.name().is_none()) {
                        if let Some(path) = value_to_string(entry.value()) {
                            app.git.push(PathBuf::from(path));
                        }
                    }
                }
                other => {
                    tracing::debug!(node = other, "Skipping unknown app field");
                }
            }
        }
    }

    Ok((name, app))
}

fn required_string(node: &KdlNode, field: &str) -> Result<String> {
    first_string(node)
        .ok_or_else(|| ProjectError::InvalidConfig(format!("{} requires a value", field)))
}

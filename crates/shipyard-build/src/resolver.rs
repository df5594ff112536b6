use crate::error::{BuildError, BuildResult};
use crate::tag::slugify;
use shipyard_core::BuildConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// ローカルイメージに付けるタグ
pub const LOCAL_TAG: &str = "shipyard";

pub struct BuildResolver {
    project_root: PathBuf,
}

impl BuildResolver {
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Dockerfileのパスを解決
    ///
    /// 1. 明示的な指定（プロジェクトルートからの相対パス）
    /// 2. ビルドコンテキスト直下の Dockerfile
    pub fn resolve_dockerfile(&self, app: &BuildConfig, context: &Path) -> BuildResult<PathBuf> {
        let path = match &app.dockerfile {
            Some(dockerfile) => self.project_root.join(dockerfile),
            None => context.join("Dockerfile"),
        };

        if !path.is_file() {
            return Err(BuildError::DockerfileNotFound(path));
        }

        tracing::debug!(
            "Found Dockerfile for app '{}' at: {}",
            app.name,
            path.display()
        );
        Ok(path)
    }

    /// ビルドコンテキストのパスを解決
    ///
    /// デフォルトはプロジェクトルート
    pub fn resolve_context(&self, app: &BuildConfig) -> BuildResult<PathBuf> {
        let context = match &app.context {
            Some(ctx) => self.project_root.join(ctx),
            None => self.project_root.clone(),
        };

        if !context.exists() {
            return Err(BuildError::ContextNotFound(context));
        }

        if !context.is_dir() {
            return Err(BuildError::InvalidConfig(format!(
                "Build context is not a directory: {}",
                context.display()
            )));
        }

        Ok(context)
    }

    /// ビルド引数の変数展開
    pub fn resolve_build_args(
        &self,
        app: &BuildConfig,
        variables: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        app.args
            .iter()
            .map(|(key, value)| {
                self.validate_build_arg(key);
                (key.clone(), expand_variables(value, variables))
            })
            .collect()
    }

    /// ローカルに作るイメージ名: `{project}-{app}:shipyard`
    ///
    /// アプリケーション名がプロジェクト名と同じ場合は `{project}:shipyard`。
    pub fn resolve_local_image(&self, project_name: &str, app: &BuildConfig) -> String {
        let repository = if app.name == project_name {
            slugify(project_name)
        } else {
            slugify(&format!("{}-{}", project_name, app.name))
        };
        format!("{}:{}", repository, LOCAL_TAG)
    }

    /// ビルド引数の検証（機密情報の警告）
    fn validate_build_arg(&self, key: &str) {
        let sensitive_patterns = ["password", "token", "secret", "api_key", "private_key"];

        let key_lower = key.to_lowercase();
        if sensitive_patterns.iter().any(|p| key_lower.contains(p)) {
            tracing::warn!(
                "警告: ビルド引数 '{}' は機密情報を含む可能性があります。\n\
                 ビルド引数はイメージ履歴に記録されます。",
                key
            );
        }
    }
}

/// テンプレート文字列内の {VAR_NAME} を実際の値に置換
///
/// 置換は1パスで行い、置換後の値に含まれる `{...}` は展開しません。
/// 未定義の変数はそのまま残します。
fn expand_variables(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match variables.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

//! 単一アプリケーションのプッシュ（spush）
//!
//! プロジェクトのアプリケーションがちょうど1つであることを確認し、
//! 固定フラグのコンテキストでエクスポーターに処理を委ねます。

use crate::error::{BuildError, BuildResult};
use crate::export::{ExportContext, ExportOptions, ExportOutcome, Exporter};
use crate::tag::TagFormat;
use shipyard_core::{BuildConfig, Project};
use thiserror::Error;

/// アプリケーション数が1つでない理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppCountError {
    #[error("no applications defined")]
    Empty,
    #[error("{0} applications defined")]
    TooMany(usize),
}

impl From<AppCountError> for BuildError {
    fn from(_: AppCountError) -> Self {
        BuildError::UnexpectedApplicationCount
    }
}

/// ビルド設定がちょうど1つならそれを返す
pub fn single_app(configs: &[BuildConfig]) -> Result<&BuildConfig, AppCountError> {
    match configs {
        [] => Err(AppCountError::Empty),
        [only] => Ok(only),
        many => Err(AppCountError::TooMany(many.len())),
    }
}

/// 単一アプリケーションのエクスポートを行うハンドラ
pub struct SingleAppExporter<E> {
    exporter: E,
}

impl<E: Exporter> SingleAppExporter<E> {
    pub fn new(exporter: E) -> Self {
        Self { exporter }
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// プロジェクト唯一のアプリケーションを `repo` へエクスポート
    ///
    /// アプリケーションが0個または2個以上の場合は、エクスポーターを呼ばずに
    /// `BuildError::UnexpectedApplicationCount` を返します。
    /// エクスポーターの結果はそのまま返します。
    pub async fn run(&self, project: &Project, repo: &str) -> BuildResult<ExportOutcome> {
        let config = single_app(project.build_configs()).map_err(|e| {
            tracing::debug!(project = %project.name, reason = %e, "spush rejected");
            BuildError::from(e)
        })?;

        let context = ExportContext::new(config, project, ExportOptions::SPUSH);
        tracing::info!(project = %project.name, app = %config.name, repo, "spush");

        self.exporter
            .export(&context, repo, &TagFormat::SPUSH)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// export 呼び出しの記録
    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        app: String,
        project: String,
        options: ExportOptions,
        repo: String,
        format: String,
    }

    #[derive(Default)]
    struct RecordingExporter {
        calls: Mutex<Vec<Call>>,
        fail_with_push_error: bool,
    }

    impl RecordingExporter {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Exporter for RecordingExporter {
        async fn export(
            &self,
            context: &ExportContext<'_>,
            repo: &str,
            format: &TagFormat,
        ) -> BuildResult<ExportOutcome> {
            self.calls.lock().unwrap().push(Call {
                app: context.config.name.clone(),
                project: context.project.name.clone(),
                options: context.options,
                repo: repo.to_string(),
                format: format.as_str().to_string(),
            });

            if self.fail_with_push_error {
                return Err(BuildError::PushFailed {
                    message: "denied: requested access to the resource is denied".to_string(),
                });
            }

            Ok(ExportOutcome {
                app: context.config.name.clone(),
                references: vec![format.render(repo, "latest")],
            })
        }
    }

    fn project_with(names: &[&str]) -> Project {
        Project {
            name: "shop".to_string(),
            root: PathBuf::from("/work/shop"),
            apps: names.iter().map(|n| BuildConfig::named(*n)).collect(),
        }
    }

    #[test]
    fn test_single_app_arity() {
        assert_eq!(single_app(&[]), Err(AppCountError::Empty));

        let one = [BuildConfig::named("a")];
        assert_eq!(single_app(&one).map(|c| c.name.as_str()), Ok("a"));

        let two = [BuildConfig::named("a"), BuildConfig::named("b")];
        assert_eq!(single_app(&two), Err(AppCountError::TooMany(2)));
    }

    #[test]
    fn test_app_count_error_collapses_into_one_kind() {
        assert!(matches!(
            BuildError::from(AppCountError::Empty),
            BuildError::UnexpectedApplicationCount
        ));
        assert!(matches!(
            BuildError::from(AppCountError::TooMany(3)),
            BuildError::UnexpectedApplicationCount
        ));
    }

    #[tokio::test]
    async fn test_run_single_app_delegates_once() {
        let spush = SingleAppExporter::new(RecordingExporter::default());
        let project = project_with(&["A"]);

        let outcome = spush
            .run(&project, "registry.example.com/app")
            .await
            .unwrap();

        assert_eq!(
            spush.exporter().calls(),
            vec![Call {
                app: "A".to_string(),
                project: "shop".to_string(),
                options: ExportOptions {
                    ignore_git_fetch: true,
                    should_be_built: true,
                },
                repo: "registry.example.com/app".to_string(),
                format: "%{repo}:%{tag}".to_string(),
            }]
        );
        assert_eq!(outcome.app, "A");
        assert_eq!(outcome.references, vec!["registry.example.com/app:latest"]);
    }

    #[tokio::test]
    async fn test_run_no_apps_rejected() {
        let spush = SingleAppExporter::new(RecordingExporter::default());
        let result = spush.run(&project_with(&[]), "registry.example.com/app").await;

        assert!(matches!(result, Err(BuildError::UnexpectedApplicationCount)));
        assert!(spush.exporter().calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_many_apps_rejected() {
        let spush = SingleAppExporter::new(RecordingExporter::default());
        let result = spush
            .run(&project_with(&["A", "B"]), "registry.example.com/app")
            .await;

        assert!(matches!(result, Err(BuildError::UnexpectedApplicationCount)));
        assert!(spush.exporter().calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_propagates_exporter_error_unchanged() {
        let spush = SingleAppExporter::new(RecordingExporter {
            fail_with_push_error: true,
            ..Default::default()
        });
        let result = spush.run(&project_with(&["A"]), "ghcr.io/acme/app").await;

        match result {
            Err(BuildError::PushFailed { message }) => {
                assert_eq!(message, "denied: requested access to the resource is denied");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(spush.exporter().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_run_twice_exports_twice() {
        let spush = SingleAppExporter::new(RecordingExporter::default());
        let project = project_with(&["A"]);

        spush.run(&project, "ghcr.io/acme/app").await.unwrap();
        spush.run(&project, "ghcr.io/acme/app").await.unwrap();

        let calls = spush.exporter().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }
}

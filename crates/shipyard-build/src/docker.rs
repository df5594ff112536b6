//! Docker エクスポーター
//!
//! `Exporter` の Docker デーモン実装。git fetch、ビルド、タグ付け、プッシュを順に行います。

use crate::builder::{BuildRequest, ImageBuilder};
use crate::context::ContextBuilder;
use crate::error::{BuildError, BuildResult};
use crate::export::{ExportContext, ExportOutcome, Exporter};
use crate::git;
use crate::progress::BuildProgress;
use crate::pusher::{ImagePusher, split_image_tag};
use crate::resolver::BuildResolver;
use crate::tag::{TagFormat, TagOptions};
use async_trait::async_trait;
use bollard::Docker;
use std::collections::HashMap;

/// Docker デーモンを使うエクスポーター
///
/// クライアントは `export` の中で、リポジトリとタグの検証が済んでから作ります。
pub struct DockerExporter {
    docker: Option<Docker>,
    tags: TagOptions,
    no_cache: bool,
    show_progress: bool,
}

impl DockerExporter {
    /// ローカルのデフォルト設定（`DOCKER_HOST` など）で接続するエクスポーター
    pub fn new(tags: TagOptions) -> Self {
        Self {
            docker: None,
            tags,
            no_cache: false,
            show_progress: true,
        }
    }

    /// 接続済みのクライアントを使う
    pub fn with_client(mut self, docker: Docker) -> Self {
        self.docker = Some(docker);
        self
    }

    /// キャッシュを使わずにビルドする
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// 標準出力への進捗表示を無効化
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn client(&self) -> BuildResult<Docker> {
        match &self.docker {
            Some(docker) => Ok(docker.clone()),
            None => Ok(Docker::connect_with_local_defaults()?),
        }
    }

    async fn build(
        &self,
        builder: &ImageBuilder,
        context: &ExportContext<'_>,
        image: &str,
    ) -> BuildResult<()> {
        let app = context.config;
        let resolver = BuildResolver::new(context.project.root.clone());

        let context_path = resolver.resolve_context(app)?;
        let dockerfile_path = resolver.resolve_dockerfile(app, &context_path)?;
        tracing::debug!(
            dockerfile = %dockerfile_path.display(),
            context = %context_path.display(),
            "Resolved build inputs"
        );

        let variables: HashMap<String, String> = std::env::vars().collect();
        let request = BuildRequest {
            image,
            build_args: resolver.resolve_build_args(app, &variables),
            target: app.target.as_deref(),
            no_cache: self.no_cache,
        };

        let build_context = ContextBuilder::create_context(&context_path, &dockerfile_path)?;
        let progress = if self.show_progress {
            BuildProgress::new(&app.name)
        } else {
            BuildProgress::hidden()
        };

        builder
            .build_image(build_context, &request, &progress)
            .await
    }
}

#[async_trait]
impl Exporter for DockerExporter {
    async fn export(
        &self,
        context: &ExportContext<'_>,
        repo: &str,
        format: &TagFormat,
    ) -> BuildResult<ExportOutcome> {
        let project = context.project;
        let app = context.config;

        if repo.trim().is_empty() {
            return Err(BuildError::InvalidConfig(
                "repository must not be empty".to_string(),
            ));
        }

        // Docker に触れる前にタグを確定させる
        let tags = self.tags.resolve(&project.root).await?;

        let docker = self.client()?;
        docker.ping().await?;
        let builder = ImageBuilder::new(docker.clone());
        let pusher = if self.show_progress {
            ImagePusher::new(docker)
        } else {
            ImagePusher::new(docker).quiet()
        };

        if context.options.ignore_git_fetch {
            tracing::info!(app = %app.name, "Skipping git fetch");
        } else {
            git::fetch_sources(&project.root, &app.git).await?;
        }

        let resolver = BuildResolver::new(project.root.clone());
        let local_image = resolver.resolve_local_image(&project.name, app);

        if context.options.should_be_built {
            self.build(&builder, context, &local_image).await?;
        } else if !builder.image_exists(&local_image).await? {
            return Err(BuildError::ImageNotBuilt(local_image));
        }

        let mut references = Vec::with_capacity(tags.len());
        for tag in &tags {
            let reference = format.render(repo, tag);
            let (image, image_tag) = split_image_tag(&reference);
            pusher.tag(&local_image, &image, &image_tag).await?;
            references.push(pusher.push(&image, &image_tag).await?);
        }

        tracing::info!(app = %app.name, pushed = references.len(), "Export complete");

        Ok(ExportOutcome {
            app: app.name.clone(),
            references,
        })
    }
}

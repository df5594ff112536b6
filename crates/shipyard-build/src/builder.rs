use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::progress::BuildProgress;
use bollard::Docker;
use bollard::models::BuildInfo;
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
use http_body_util::{Either, Full};
use std::collections::HashMap;

/// ビルド1回分の指定
#[derive(Debug, Clone, Default)]
pub struct BuildRequest<'a> {
    /// 付与するイメージ名（`name:tag`）
    pub image: &'a str,
    pub build_args: HashMap<String, String>,
    pub target: Option<&'a str>,
    pub no_cache: bool,
}

#[derive(Clone)]
pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// イメージをビルド
    pub async fn build_image(
        &self,
        context: BuildContext,
        request: &BuildRequest<'_>,
        progress: &BuildProgress,
    ) -> BuildResult<()> {
        tracing::info!("Building image: {}", request.image);

        let build_args: HashMap<&str, &str> = request
            .build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: context.dockerfile.as_str(),
            t: request.image,
            buildargs: build_args,
            target: request.target.unwrap_or(""),
            nocache: request.no_cache,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            pull: true,    // ベースイメージを常にpull
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);

        let body = Full::new(Bytes::from(context.archive));
        let stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        follow_build(stream, progress).await?;
        tracing::info!("Successfully built: {}", request.image);
        Ok(())
    }

    /// イメージの存在確認
    pub async fn image_exists(&self, image: &str) -> BuildResult<bool> {
        match self.docker.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                ..
            }) => Ok(false),
            Err(e) => Err(BuildError::DockerConnection(e)),
        }
    }
}

/// ビルド出力ストリームを最後まで読む
///
/// 失敗した場合はプログレスをエラー表示で終了させます。
async fn follow_build<S>(stream: S, progress: &BuildProgress) -> BuildResult<()>
where
    S: Stream<Item = Result<BuildInfo, bollard::errors::Error>>,
{
    let mut stream = std::pin::pin!(stream);
    while let Some(msg) = stream.next().await {
        let result = msg
            .map_err(|e| BuildError::BuildFailed(e.to_string()))
            .and_then(|output| handle_build_output(output, progress));
        if let Err(e) = result {
            progress.finish_error(&e.to_string());
            return Err(e);
        }
    }

    progress.finish_success();
    Ok(())
}

/// ビルド出力の処理
fn handle_build_output(output: BuildInfo, progress: &BuildProgress) -> BuildResult<()> {
    if let Some(stream) = output.stream {
        for line in stream.lines() {
            tracing::debug!(target: "shipyard::build", "{}", line);
            progress.observe(line);
        }
    }

    if let Some(error) = output.error {
        return Err(BuildError::BuildFailed(error));
    }

    if let Some(error_detail) = output.error_detail {
        let error_msg = error_detail
            .message
            .unwrap_or_else(|| "Unknown build error".to_string());
        return Err(BuildError::BuildFailed(error_msg));
    }

    if let Some(status) = output.status {
        // ステータスメッセージ（pull等）
        progress.observe(&status);
        tracing::debug!(target: "shipyard::build", "{}", status);
    }

    Ok(())
}

//! イメージプッシュ処理
//!
//! ビルドしたイメージにタグを付け、コンテナレジストリにプッシュします。
//! レジストリ認証は Docker デーモン側の設定に従います。

use crate::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::models::PushImageInfo;
use colored::Colorize;
use futures_util::StreamExt;
use std::io::Write;

/// イメージプッシュを実行するハンドラ
#[derive(Clone)]
pub struct ImagePusher {
    docker: Docker,
    /// 進捗を標準出力に表示するか
    verbose: bool,
}

impl ImagePusher {
    pub fn new(docker: Docker) -> Self {
        Self {
            docker,
            verbose: true,
        }
    }

    /// 進捗表示を無効化
    pub fn quiet(mut self) -> Self {
        self.verbose = false;
        self
    }

    /// ローカルイメージに `image:tag` を付与
    pub async fn tag(&self, source: &str, image: &str, tag: &str) -> BuildResult<()> {
        tracing::debug!("Tagging {} as {}:{}", source, image, tag);

        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions {
            repo: image,
            tag,
        };

        self.docker.tag_image(source, Some(options)).await?;
        Ok(())
    }

    /// イメージをレジストリにプッシュ
    ///
    /// # Arguments
    /// * `image` - イメージ名（レジストリ込み、タグなし）
    /// * `tag` - イメージタグ
    ///
    /// # Returns
    /// プッシュ成功時は完全なイメージ名を返す
    pub async fn push(&self, image: &str, tag: &str) -> BuildResult<String> {
        let full_image = format!("{}:{}", image, tag);

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        if self.verbose {
            println!("  → {}", full_image.cyan());
        }

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(image, Some(options), None);

        let mut last_status = String::new();
        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else if self.verbose {
                        self.handle_progress(&info, &mut last_status);
                    }
                }
                Err(e) => {
                    return Err(BuildError::PushFailed {
                        message: e.to_string(),
                    });
                }
            }
        }

        if self.verbose {
            println!();
        }

        if let Some(err) = error_message {
            return Err(BuildError::PushFailed { message: err });
        }

        tracing::info!("Pushed {}", full_image);
        Ok(full_image)
    }

    /// プッシュ進捗を表示
    fn handle_progress(&self, info: &PushImageInfo, last_status: &mut String) {
        if let Some(status) = &info.status {
            let progress = info.progress.as_deref().unwrap_or("");

            match status.as_str() {
                "Pushing" => {
                    print!("\r  ↑ {} {}     ", status, progress);
                    std::io::stdout().flush().ok();
                }
                "Pushed" => {
                    println!("\r  {} Pushed                    ", "✓".green());
                }
                "Layer already exists" => {
                    println!("\r  {} Layer already exists      ", "✓".green());
                }
                "Preparing" | "Waiting" => {
                    // 準備中は表示をスキップ（ノイズ軽減）
                }
                _ => {
                    if status != last_status {
                        println!("\r  ℹ {}                    ", status);
                        *last_status = status.clone();
                    }
                }
            }
        }
    }
}

/// イメージ参照をリポジトリとタグに分離
///
/// 最後の `:` 以降に `/` を含まなければタグとみなします。
///
/// # Examples
/// - `ghcr.io/org/app:v1.0` -> `("ghcr.io/org/app", "v1.0")`
/// - `ghcr.io/org/app` -> `("ghcr.io/org/app", "latest")`
/// - `localhost:5000/app` -> `("localhost:5000/app", "latest")`
/// - `registry.example.com/app:1234` -> `("registry.example.com/app", "1234")`
pub fn split_image_tag(image: &str) -> (String, String) {
    if let Some((repository, tag)) = image.rsplit_once(':')
        && !tag.contains('/')
    {
        return (repository.to_string(), tag.to_string());
    }

    (image.to_string(), "latest".to_string())
}

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shipyard")]
#[command(about = "ひとつのアプリを、ビルドして、届ける。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 唯一のアプリケーションをビルドしてレジストリにプッシュ
    Spush {
        /// プッシュ先リポジトリ（例: registry.example.com/app）
        #[arg(env = "SHIPYARD_REPO")]
        repo: String,
        /// プロジェクトファイル（省略時は <project root>/shipyard.kdl）
        #[arg(short, long, env = "SHIPYARD_FILE")]
        file: Option<PathBuf>,
        /// イメージタグ（複数指定可）
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// 現在の git ブランチ名をタグにする
        #[arg(long)]
        tag_branch: bool,
        /// 現在の git コミットをタグにする
        #[arg(long)]
        tag_commit: bool,
        /// CI のビルド番号をタグにする
        #[arg(long)]
        tag_build_id: bool,
        /// CI の git タグまたはブランチ名をタグにする
        #[arg(long)]
        tag_ci: bool,
        /// キャッシュを使用しない
        #[arg(long)]
        no_cache: bool,
        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrに出力
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match cli.command {
        Commands::Spush {
            repo,
            file,
            tags,
            tag_branch,
            tag_commit,
            tag_build_id,
            tag_ci,
            no_cache,
            json,
        } => {
            let args = commands::spush::SpushArgs {
                repo,
                file,
                tags: shipyard_build::TagOptions {
                    tags,
                    tag_branch,
                    tag_commit,
                    tag_build_id,
                    tag_ci,
                },
                no_cache,
                json,
            };
            commands::spush::handle(args).await?;
        }
        Commands::Version => {
            println!("shipyard {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

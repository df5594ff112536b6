use colored::Colorize;
use shipyard_build::{BuildError, DockerExporter, SingleAppExporter, TagOptions};
use shipyard_core::Project;
use std::path::PathBuf;

pub struct SpushArgs {
    pub repo: String,
    pub file: Option<PathBuf>,
    pub tags: TagOptions,
    pub no_cache: bool,
    pub json: bool,
}

/// spush コマンドを処理
pub async fn handle(args: SpushArgs) -> anyhow::Result<()> {
    let project = match &args.file {
        Some(file) => shipyard_core::load_project_file(file)?,
        None => shipyard_core::load_project(&shipyard_core::project_root()?)?,
    };
    tracing::debug!(
        project = %project.name,
        apps = project.build_configs().len(),
        "Loaded project"
    );

    if !args.json {
        println!("{}", "イメージをビルド＆プッシュ中...".green());
        println!("プロジェクト: {}", project.name.cyan());
        println!("リポジトリ: {}", args.repo.cyan());
        println!();
    }

    // アプリ数とタグの検証は Docker への接続より先に行われる
    let mut exporter = DockerExporter::new(args.tags).with_no_cache(args.no_cache);
    if args.json {
        exporter = exporter.quiet();
    }

    let spush = SingleAppExporter::new(exporter);
    let outcome = match spush.run(&project, &args.repo).await {
        Ok(outcome) => outcome,
        Err(e) => {
            report(&e, &project);
            return Err(anyhow::anyhow!("spush に失敗しました"));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!(
        "{}",
        format!("✓ {} をプッシュしました！", outcome.app).green().bold()
    );
    for reference in &outcome.references {
        println!("  {} {}", "✓".green(), reference.cyan());
    }

    Ok(())
}

fn report(error: &BuildError, project: &Project) {
    eprintln!();
    eprintln!("{} {}", "✗".red().bold(), error.user_message());

    if matches!(error, BuildError::UnexpectedApplicationCount) {
        let apps = project.build_configs();
        eprintln!();
        eprintln!("定義されているアプリケーション: {} 個", apps.len());
        for app in apps {
            eprintln!("  • {}", app.name.yellow());
        }
    }
}

use crate::error::{BuildError, BuildResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tar::Builder;

/// コンテキスト外の Dockerfile を格納するアーカイブ内の名前
const EXTERNAL_DOCKERFILE: &str = ".shipyard.Dockerfile";

/// tar.gz 化したビルドコンテキスト
#[derive(Debug)]
pub struct BuildContext {
    pub archive: Vec<u8>,
    /// アーカイブ内での Dockerfile のパス
    pub dockerfile: String,
}

pub struct ContextBuilder;

impl ContextBuilder {
    /// ビルドコンテキストをtar.gzアーカイブとして作成
    ///
    /// `.dockerignore` にマッチするパスは含めません。
    /// Dockerfile がコンテキスト内にあればそのパスを、外にあれば
    /// `.shipyard.Dockerfile` として追加したパスを返します。
    pub fn create_context(context_path: &Path, dockerfile_path: &Path) -> BuildResult<BuildContext> {
        tracing::debug!("Creating build context from: {}", context_path.display());

        let ignore = IgnoreRules::load(context_path)?;
        let inner_dockerfile = dockerfile_path
            .strip_prefix(context_path)
            .ok()
            .map(archive_name);

        let mut archive = Vec::new();
        let dockerfile = {
            let encoder = GzEncoder::new(&mut archive, Compression::default());
            let mut tar = Builder::new(encoder);

            append_tree(&mut tar, context_path, Path::new(""), &ignore)?;

            // 無視対象でも Dockerfile 自体は必ず含める
            let dockerfile = match inner_dockerfile {
                Some(name) if !ignore.is_ignored(&name) => name,
                _ => {
                    let content = fs::read(dockerfile_path)
                        .map_err(|_| BuildError::DockerfileNotFound(dockerfile_path.to_path_buf()))?;
                    let mut header = tar::Header::new_gnu();
                    header.set_size(content.len() as u64);
                    header.set_mode(0o644);
                    header.set_cksum();
                    tar.append_data(&mut header, EXTERNAL_DOCKERFILE, &content[..])?;
                    EXTERNAL_DOCKERFILE.to_string()
                }
            };

            tar.into_inner()?.finish()?;
            dockerfile
        };

        tracing::debug!(
            "Build context created: {} bytes (dockerfile: {})",
            archive.len(),
            dockerfile
        );

        Self::check_context_size(archive.len());

        Ok(BuildContext {
            archive,
            dockerfile,
        })
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024; // 500MB

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: ビルドコンテキストが大きすぎます（{}MB）\n\
                 .dockerignoreファイルで不要なファイルを除外することを推奨します。",
                size / 1024 / 1024
            );
        }
    }
}

fn append_tree<W: std::io::Write>(
    tar: &mut Builder<W>,
    root: &Path,
    relative: &Path,
    ignore: &IgnoreRules,
) -> BuildResult<()> {
    let dir = root.join(relative);
    let mut entries: Vec<_> = fs::read_dir(&dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let rel: PathBuf = relative.join(entry.file_name());
        let name = archive_name(&rel);
        if ignore.is_ignored(&name) {
            tracing::debug!(path = %name, "Excluded by .dockerignore");
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            tar.append_dir(&rel, entry.path())?;
            append_tree(tar, root, &rel, ignore)?;
        } else if file_type.is_file() || file_type.is_symlink() {
            tar.append_path_with_name(entry.path(), &rel)?;
        }
    }

    Ok(())
}

/// アーカイブ内のパス表記（区切りは常に `/`）
fn archive_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// パターン照合の設定（`*` は `/` をまたがない）
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// `.dockerignore` の1行分のルール
#[derive(Debug)]
struct IgnoreRule {
    pattern: Pattern,
    /// `!` で始まる除外の取り消し
    negated: bool,
}

impl IgnoreRule {
    /// パス自身か、その親ディレクトリのいずれかにマッチするか
    fn matches(&self, name: &str) -> bool {
        let mut candidate = name;
        loop {
            if self.pattern.matches_with(candidate, MATCH_OPTIONS) {
                return true;
            }
            match candidate.rsplit_once('/') {
                Some((parent, _)) => candidate = parent,
                None => return false,
            }
        }
    }
}

/// `.dockerignore` のルール
///
/// パターンはコンテキストのルートを基準に評価します（`*.log` はルート直下のみ、
/// 任意の階層は `**/*.log`）。後に書かれたルールが優先されます。
#[derive(Debug, Default)]
struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    fn load(context_path: &Path) -> BuildResult<Self> {
        let path = context_path.join(".dockerignore");
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    fn parse(content: &str) -> BuildResult<Self> {
        let mut rules = Vec::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (negated, raw) = match line.strip_prefix('!') {
                Some(rest) => (true, rest.trim()),
                None => (false, line),
            };
            let raw = raw.trim_start_matches("./").trim_matches('/');
            if raw.is_empty() {
                continue;
            }

            let pattern = Pattern::new(raw).map_err(|e| {
                BuildError::InvalidConfig(format!("invalid .dockerignore pattern '{}': {}", raw, e))
            })?;
            rules.push(IgnoreRule { pattern, negated });
        }

        Ok(Self { rules })
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.rules.iter().fold(false, |ignored, rule| {
            if rule.matches(name) {
                !rule.negated
            } else {
                ignored
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn unpack(context: &BuildContext) -> tempfile::TempDir {
        let extract_dir = tempdir().unwrap();
        let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(&context.archive));
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();
        extract_dir
    }

    #[test]
    fn test_create_context() {
        let temp_dir = tempdir().unwrap();

        fs::write(temp_dir.path().join("file1.txt"), "content1").unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("file2.txt"), "content2").unwrap();

        let dockerfile = temp_dir.path().join("Dockerfile");
        fs::write(&dockerfile, "FROM alpine\nRUN echo test").unwrap();

        let context = ContextBuilder::create_context(temp_dir.path(), &dockerfile).unwrap();
        assert_eq!(context.dockerfile, "Dockerfile");

        let extracted = unpack(&context);
        assert!(extracted.path().join("Dockerfile").exists());
        assert!(extracted.path().join("subdir/file2.txt").exists());
    }

    #[test]
    fn test_create_context_external_dockerfile() {
        let context_dir = tempdir().unwrap();
        let other_dir = tempdir().unwrap();
        fs::write(context_dir.path().join("main.rs"), "fn main() {}").unwrap();
        let dockerfile = other_dir.path().join("build.Dockerfile");
        fs::write(&dockerfile, "FROM rust").unwrap();

        let context = ContextBuilder::create_context(context_dir.path(), &dockerfile).unwrap();
        assert_eq!(context.dockerfile, EXTERNAL_DOCKERFILE);

        let extracted = unpack(&context);
        let content = fs::read_to_string(extracted.path().join(EXTERNAL_DOCKERFILE)).unwrap();
        assert_eq!(content, "FROM rust");
    }

    #[test]
    fn test_create_context_respects_dockerignore() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join(".dockerignore"),
            "# comment\ntarget/\n*.log\n",
        )
        .unwrap();
        fs::create_dir(temp_dir.path().join("target")).unwrap();
        fs::write(temp_dir.path().join("target/app"), "bin").unwrap();
        fs::write(temp_dir.path().join("debug.log"), "log").unwrap();
        fs::create_dir(temp_dir.path().join("logs")).unwrap();
        fs::write(temp_dir.path().join("logs/app.log"), "log").unwrap();
        fs::write(temp_dir.path().join("Cargo.toml"), "[package]").unwrap();
        let dockerfile = temp_dir.path().join("Dockerfile");
        fs::write(&dockerfile, "FROM alpine").unwrap();

        let context = ContextBuilder::create_context(temp_dir.path(), &dockerfile).unwrap();
        let extracted = unpack(&context);

        assert!(extracted.path().join("Cargo.toml").exists());
        assert!(!extracted.path().join("target").exists());
        assert!(!extracted.path().join("debug.log").exists());
        // ルート以外の .log は *.log の対象外
        assert!(extracted.path().join("logs/app.log").exists());
    }

    #[test]
    fn test_ignored_dockerfile_is_still_included() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join(".dockerignore"), "Dockerfile\n").unwrap();
        let dockerfile = temp_dir.path().join("Dockerfile");
        fs::write(&dockerfile, "FROM alpine").unwrap();

        let context = ContextBuilder::create_context(temp_dir.path(), &dockerfile).unwrap();
        assert_eq!(context.dockerfile, EXTERNAL_DOCKERFILE);
    }

    fn rules(content: &str) -> IgnoreRules {
        IgnoreRules::parse(content).unwrap()
    }

    #[test]
    fn test_ignore_directory_prefix() {
        let ignore = rules("target/\n");
        assert!(ignore.is_ignored("target"));
        assert!(ignore.is_ignored("target/debug/app"));
        assert!(!ignore.is_ignored("targets"));
    }

    #[test]
    fn test_ignore_patterns_are_anchored_at_root() {
        let ignore = rules("*.log\n");
        assert!(ignore.is_ignored("debug.log"));
        assert!(!ignore.is_ignored("logs/app.log"));
    }

    #[test]
    fn test_ignore_double_star_matches_any_depth() {
        let ignore = rules("**/*.log\n");
        assert!(ignore.is_ignored("debug.log"));
        assert!(ignore.is_ignored("logs/app.log"));
        assert!(ignore.is_ignored("a/b/c/trace.log"));
        assert!(!ignore.is_ignored("logs/app.txt"));
    }

    #[test]
    fn test_ignore_star_does_not_cross_directories() {
        let ignore = rules("docs/*.md\n");
        assert!(ignore.is_ignored("docs/readme.md"));
        assert!(!ignore.is_ignored("docs/guide/intro.md"));
        assert!(!ignore.is_ignored("src/readme.md"));
    }

    #[test]
    fn test_ignore_negation_last_rule_wins() {
        let ignore = rules("*.md\n!README.md\n");
        assert!(ignore.is_ignored("CHANGELOG.md"));
        assert!(!ignore.is_ignored("README.md"));

        let ignore = rules("!README.md\n*.md\n");
        assert!(ignore.is_ignored("README.md"));
    }

    #[test]
    fn test_ignore_invalid_pattern() {
        assert!(matches!(
            IgnoreRules::parse("[unclosed\n"),
            Err(BuildError::InvalidConfig(_))
        ));
    }
}

//! タグの決定とフォーマット

use crate::error::{BuildError, BuildResult};
use crate::git::GitInfo;
use std::borrow::Cow;
use std::path::Path;

/// Docker タグの最大長
const MAX_TAG_LEN: usize = 128;

/// CI のビルド番号を持つ環境変数（優先順）
const BUILD_ID_VARS: [&str; 3] = ["CI_JOB_ID", "CI_BUILD_ID", "TRAVIS_BUILD_NUMBER"];
/// CI の git タグを持つ環境変数（優先順）
const CI_TAG_VARS: [&str; 3] = ["CI_COMMIT_TAG", "CI_BUILD_TAG", "TRAVIS_TAG"];
/// CI のブランチ名を持つ環境変数（優先順）
const CI_REF_VARS: [&str; 3] = ["CI_COMMIT_REF_NAME", "CI_BUILD_REF_NAME", "TRAVIS_BRANCH"];

/// 参照文字列のテンプレート
///
/// `%{repo}` と `%{tag}` の2つのプレースホルダを持ちます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFormat {
    template: Cow<'static, str>,
}

impl TagFormat {
    /// spush が使うテンプレート
    pub const SPUSH: TagFormat = TagFormat::from_static("%{repo}:%{tag}");

    pub const fn from_static(template: &'static str) -> Self {
        Self {
            template: Cow::Borrowed(template),
        }
    }

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: Cow::Owned(template.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// プレースホルダを置換した参照を返す
    ///
    /// 置換は1パスで行い、値の中の `%{...}` は展開しません。
    /// 未知のプレースホルダはそのまま残します。
    pub fn render(&self, repo: &str, tag: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + repo.len() + tag.len());
        let mut rest: &str = &self.template;

        while let Some(start) = rest.find("%{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    match &after[..end] {
                        "repo" => out.push_str(repo),
                        "tag" => out.push_str(tag),
                        other => {
                            out.push_str("%{");
                            out.push_str(other);
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
}

/// タグの決定方法
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    /// 明示的に指定されたタグ
    pub tags: Vec<String>,
    /// 現在の git ブランチ名をタグにする
    pub tag_branch: bool,
    /// 現在の HEAD コミットをタグにする
    pub tag_commit: bool,
    /// CI のビルド番号をタグにする
    pub tag_build_id: bool,
    /// CI の git タグ（なければブランチ名）をタグにする
    pub tag_ci: bool,
}

impl TagOptions {
    /// プロセス環境とプロジェクトの git 情報からタグを決定
    pub async fn resolve(&self, project_root: &Path) -> BuildResult<Vec<String>> {
        let git = if self.tag_branch || self.tag_commit {
            Some(GitInfo::detect(project_root).await)
        } else {
            None
        };
        self.resolve_with(|key| std::env::var(key).ok(), git.as_ref())
    }

    /// 環境変数の参照方法と git 情報を与えてタグを決定
    ///
    /// 何も決まらなければ `latest` になります。重複は最初の出現のみ残します。
    pub fn resolve_with<F>(&self, env: F, git: Option<&GitInfo>) -> BuildResult<Vec<String>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |vars: &[&str]| {
            vars.iter()
                .filter_map(|key| env(*key))
                .find(|v| !v.trim().is_empty())
        };

        let mut tags: Vec<String> = self.tags.clone();

        if self.tag_branch {
            let branch = git
                .and_then(|g| g.branch.as_deref())
                .ok_or_else(|| unavailable("git branch"))?;
            tags.push(slugify(branch));
        }

        if self.tag_commit {
            let commit = git
                .and_then(|g| g.commit.as_deref())
                .ok_or_else(|| unavailable("git commit"))?;
            tags.push(commit.to_string());
        }

        if self.tag_build_id {
            let id = lookup(&BUILD_ID_VARS[..]).ok_or_else(|| unavailable(&BUILD_ID_VARS.join("/")))?;
            tags.push(slugify(&id));
        }

        if self.tag_ci {
            let value = lookup(&CI_TAG_VARS[..])
                .or_else(|| lookup(&CI_REF_VARS[..]))
                .ok_or_else(|| unavailable("CI tag/branch"))?;
            tags.push(slugify(&value));
        }

        if tags.is_empty() {
            tags.push("latest".to_string());
        }

        let mut resolved: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            validate_tag(&tag)?;
            if !resolved.contains(&tag) {
                resolved.push(tag);
            }
        }

        tracing::debug!(tags = ?resolved, "Resolved tags");
        Ok(resolved)
    }
}

fn unavailable(origin: &str) -> BuildError {
    BuildError::TagUnavailable {
        origin: origin.to_string(),
    }
}

/// タグのバリデーション
///
/// Docker タグの制約:
/// - 128文字以下
/// - 英数字、ピリオド、ハイフン、アンダースコアのみ
/// - 先頭はピリオドまたはハイフンではない
pub fn validate_tag(tag: &str) -> BuildResult<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > MAX_TAG_LEN {
        return Err(BuildError::InvalidTag {
            tag: format!("Tag too long ({} characters, max 128)", tag.len()),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '.' && *c != '-' && *c != '_')
    {
        return Err(BuildError::InvalidTag {
            tag: format!("Invalid character '{}' in tag: {}", c, tag),
        });
    }

    Ok(())
}

/// 任意の文字列をタグとして使える形に変換
///
/// 例: `feature/Add-Login` -> `feature-add-login`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
            c
        } else {
            '-'
        };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let trimmed = slug.trim_start_matches(['.', '-']).trim_end_matches('-');
    let mut slug: String = trimmed.chars().take(MAX_TAG_LEN).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

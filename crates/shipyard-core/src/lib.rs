//! Shipyard core
//!
//! プロジェクトモデル（`Project` / `BuildConfig`）と、
//! `shipyard.kdl` からプロジェクトを読み込むローダーを提供します。

pub mod error;
pub mod loader;
pub mod model;
pub mod parser;

pub use error::{ProjectError, Result};
pub use loader::{PROJECT_FILE, load_project, load_project_file, project_root};
pub use model::{BuildConfig, Project};
pub use parser::parse_kdl_string;

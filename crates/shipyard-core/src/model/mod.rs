//! モデル定義
//!
//! Shipyardで使用されるデータモデルを定義します。

mod app;
mod project;

// Re-exports
pub use app::*;
pub use project::*;

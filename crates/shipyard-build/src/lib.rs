//! Shipyard image export
//!
//! 単一アプリケーションのビルド＆プッシュ（spush）と、
//! それを実行する Docker エクスポーターを提供します。

pub mod builder;
pub mod context;
pub mod docker;
pub mod error;
pub mod export;
pub mod git;
pub mod progress;
pub mod pusher;
pub mod resolver;
pub mod spush;
pub mod tag;

pub use builder::ImageBuilder;
pub use context::{BuildContext, ContextBuilder};
pub use docker::DockerExporter;
pub use error::{BuildError, BuildResult};
pub use export::{ExportContext, ExportOptions, ExportOutcome, Exporter};
pub use progress::BuildProgress;
pub use pusher::{ImagePusher, split_image_tag};
pub use resolver::BuildResolver;
pub use spush::{AppCountError, SingleAppExporter, single_app};
pub use tag::{TagFormat, TagOptions, slugify, validate_tag};

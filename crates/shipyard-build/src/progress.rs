use indicatif::{ProgressBar, ProgressStyle};

pub struct BuildProgress {
    progress_bar: ProgressBar,
}

impl BuildProgress {
    pub fn new(app_name: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        pb.set_message(format!("Building {}...", app_name));

        Self { progress_bar: pb }
    }

    /// 非表示のプログレス（テストや --json 出力用）
    pub fn hidden() -> Self {
        Self {
            progress_bar: ProgressBar::hidden(),
        }
    }

    /// ビルドの出力行を受け取り、ステップ行だけを表示する
    pub fn observe(&self, line: &str) {
        let line = line.trim();
        if line.starts_with("Step ") || line.starts_with('#') {
            self.progress_bar.set_message(line.to_string());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress_bar.is_finished()
    }

    pub fn finish_success(&self) {
        self.progress_bar.finish_with_message("Build completed ✓");
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("Build failed: {}", error));
    }
}

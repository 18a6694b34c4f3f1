pub mod job;
pub mod merged;
pub mod settings;

use std::path::{Path, PathBuf};

use settings::Settings;

use crate::error::OcrPdfError;

/// ジョブファイルと同じディレクトリから自動で読み込む設定ファイル名
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// ジョブファイルのあるディレクトリ。相対パスはここを基準に解決する。
pub fn job_dir(job_file_path: &Path) -> crate::error::Result<PathBuf> {
    job_file_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| OcrPdfError::config("Cannot determine job file directory"))
}

/// 相対パスを `base_dir` 基準で解決する。絶対パスはそのまま返す。
pub fn resolve_job_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// ジョブファイルの隣の `settings.yaml` を読む。無ければデフォルト設定。
///
/// `font_path` と `staging_dir` の相対パスはジョブファイルのディレクトリ基準に直す。
pub fn load_settings_for_job(job_file_path: &Path) -> crate::error::Result<Settings> {
    let dir = job_dir(job_file_path)?;
    let settings_path = dir.join(SETTINGS_FILE_NAME);

    let mut settings = if settings_path.exists() {
        Settings::from_file(&settings_path)?
    } else {
        Settings::default()
    };

    settings.font_path = settings.font_path.map(|p| resolve_job_path(&dir, &p));
    settings.staging_dir = settings.staging_dir.map(|p| resolve_job_path(&dir, &p));
    Ok(settings)
}

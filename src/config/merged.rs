use std::path::PathBuf;

use super::job::Job;
use super::settings::{Settings, validate_dpi, validate_jpeg_quality};

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub dpi: u32,
    pub jpeg_quality: u8,
    pub debug: bool,
    pub debug_dir: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
}

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    pub fn new(settings: &Settings, job: &Job) -> Self {
        MergedConfig {
            dpi: job.dpi.unwrap_or(settings.dpi),
            jpeg_quality: job.jpeg_quality.unwrap_or(settings.jpeg_quality),
            debug: job.debug.unwrap_or(settings.debug),
            debug_dir: job.debug_dir.as_ref().map(PathBuf::from),
            staging_dir: settings.staging_dir.clone(),
        }
    }

    /// ジョブ側の上書き値も含めて範囲を検証する。
    pub fn validate(&self) -> crate::error::Result<()> {
        validate_dpi(self.dpi)?;
        validate_jpeg_quality(self.jpeg_quality)
    }
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// 外部エンジン（検出・認識）を起動するコマンド定義。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dpi: u32,
    pub jpeg_quality: u8,
    pub font_path: Option<PathBuf>,
    pub detector: Option<EngineCommand>,
    pub recognizer: Option<EngineCommand>,
    pub debug: bool,
    pub staging_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            // pdfium scale 1.0: 1 pixel per point
            dpi: 72,
            jpeg_quality: 90,
            font_path: None,
            detector: None,
            recognizer: None,
            debug: false,
            staging_dir: None,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let settings: Settings = serde_yml::from_str(yaml).map_err(|e| {
            crate::error::OcrPdfError::config(format!("Failed to parse settings YAML: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> crate::error::Result<()> {
        validate_dpi(self.dpi)?;
        validate_jpeg_quality(self.jpeg_quality)
    }
}

pub(crate) fn validate_dpi(dpi: u32) -> crate::error::Result<()> {
    if dpi == 0 {
        return Err(crate::error::OcrPdfError::config("dpi must be greater than 0"));
    }
    Ok(())
}

pub(crate) fn validate_jpeg_quality(quality: u8) -> crate::error::Result<()> {
    if !(1..=100).contains(&quality) {
        return Err(crate::error::OcrPdfError::config(format!(
            "jpeg_quality must be 1-100, got {quality}"
        )));
    }
    Ok(())
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub input: String,
    pub output: Option<String>,
    pub dpi: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub debug: Option<bool>,
    pub debug_dir: Option<String>,
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let job_file: JobFile = serde_yml::from_str(yaml).map_err(|e| {
            crate::error::OcrPdfError::config(format!("Failed to parse job YAML: {e}"))
        })?;
        if job_file.jobs.is_empty() {
            return Err(crate::error::OcrPdfError::config(
                "Job file contains no jobs",
            ));
        }
        Ok(job_file)
    }
}

impl Job {
    /// 出力パスを返す。未指定の場合は入力ファイルと同じディレクトリの
    /// `<stem>_ocr.pdf` を使う。
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => PathBuf::from(output),
            None => default_output_path(Path::new(&self.input)),
        }
    }
}

/// `scan.pdf` -> `scan_ocr.pdf` (same directory as the input).
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_ocr.pdf"))
}

// ジョブ単位: 入力判定 → ページごとのPDF生成 → 結合 → 出力先へ確定

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::merged::MergedConfig;
use crate::config::settings::{validate_dpi, validate_jpeg_quality};
use crate::error::OcrPdfError;
use crate::pdf::merge::merge_pdf_files;
use crate::pipeline::Pipeline;
use crate::pipeline::page_processor::{PageContext, RasterPage, process_page};
use crate::pipeline::staging::{Staging, promote};

/// 画像入力は 1px = 1pt として扱う。
pub const IMAGE_INPUT_DPI: u32 = 72;

/// 入力ファイルの種類（拡張子で判定、大文字小文字は区別しない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Image,
}

impl InputKind {
    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" | "jpg" | "jpeg" => Ok(Self::Image),
            _ => Err(OcrPdfError::unsupported_input(format!(
                "unsupported file extension '{}' (expected .pdf, .png, .jpg or .jpeg)",
                ext
            ))),
        }
    }
}

/// Configuration for a single job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub dpi: u32,
    pub jpeg_quality: u8,
    /// Some の場合、ページごとのデバッグ画像をこのディレクトリへ出力する
    pub debug_dir: Option<PathBuf>,
    /// 一時ディレクトリの親。None なら出力先と同じディレクトリ
    pub staging_dir: Option<PathBuf>,
}

impl JobConfig {
    /// 既定値（72 DPI、JPEG品質90、デバッグ無し）で作る。
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            dpi: 72,
            jpeg_quality: 90,
            debug_dir: None,
            staging_dir: None,
        }
    }

    /// マージ済み設定から作る。デバッグ有効で `debug_dir` 未指定なら出力先ディレクトリを使う。
    pub fn from_merged(
        input_path: PathBuf,
        output_path: PathBuf,
        merged: &MergedConfig,
    ) -> Self {
        let debug_dir = if merged.debug {
            Some(
                merged
                    .debug_dir
                    .clone()
                    .unwrap_or_else(|| parent_dir(&output_path)),
            )
        } else {
            None
        };
        Self {
            input_path,
            output_path,
            dpi: merged.dpi,
            jpeg_quality: merged.jpeg_quality,
            debug_dir,
            staging_dir: merged.staging_dir.clone(),
        }
    }

    fn staging_parent(&self) -> PathBuf {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| parent_dir(&self.output_path))
    }

    /// `<入力のstem>_page_<n>_debug.png`
    fn debug_image_path(&self, page_number: u32) -> Option<PathBuf> {
        let dir = self.debug_dir.as_ref()?;
        let stem = self
            .input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "page".to_string());
        Some(dir.join(format!("{stem}_page_{page_number}_debug.png")))
    }
}

/// Result of processing a single job.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pages_processed: usize,
    pub regions_recognized: usize,
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// 1つの入力ファイルを処理して出力PDFを作る。
///
/// 失敗時のエラーは入力パス付きの [`OcrPdfError::JobFailed`] になる。
/// 出力先は全ページ成功時にだけ作られ、一時ファイルはどの経路でも削除される。
pub fn run_job(pipeline: &Pipeline, config: &JobConfig) -> crate::error::Result<JobResult> {
    run_job_inner(pipeline, config).map_err(|e| e.for_job(&config.input_path))
}

fn run_job_inner(pipeline: &Pipeline, config: &JobConfig) -> crate::error::Result<JobResult> {
    let kind = InputKind::from_path(&config.input_path)?;
    if !config.input_path.is_file() {
        return Err(OcrPdfError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", config.input_path.display()),
        )));
    }
    validate_dpi(config.dpi)?;
    validate_jpeg_quality(config.jpeg_quality)?;

    if let Some(dir) = &config.debug_dir {
        std::fs::create_dir_all(dir)?;
    }

    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        ?kind,
        "job started"
    );

    let staging = Staging::create_in(&config.staging_parent())?;
    let result = match kind {
        InputKind::Pdf => process_pdf(pipeline, config, &staging),
        InputKind::Image => process_image(pipeline, config, &staging),
    }?;
    staging.cleanup();

    info!(
        output = %result.output_path.display(),
        pages = result.pages_processed,
        regions = result.regions_recognized,
        "job completed"
    );
    Ok(result)
}

fn page_context<'a>(
    pipeline: &'a Pipeline,
    config: &JobConfig,
    debug_image: Option<&'a Path>,
) -> PageContext<'a> {
    PageContext {
        detector: pipeline.detector(),
        recognizer: pipeline.recognizer(),
        font: pipeline.font(),
        order: pipeline.order(),
        jpeg_quality: config.jpeg_quality,
        debug_image,
    }
}

fn process_pdf(
    pipeline: &Pipeline,
    config: &JobConfig,
    staging: &Staging,
) -> crate::error::Result<JobResult> {
    let page_count = pipeline.rasterizer().page_count(&config.input_path)?;
    if page_count == 0 {
        return Err(OcrPdfError::pdf_read("document has no pages"));
    }

    let mut page_pdfs: Vec<PathBuf> = Vec::with_capacity(page_count as usize);
    let mut regions_recognized = 0usize;

    let rendered = pipeline.rasterizer().rasterize(
        &config.input_path,
        config.dpi,
        &mut |page_index, image| {
            let page_number = page_index + 1;
            info!(page = page_number, total = page_count, "processing page");

            let raster = RasterPage::new(image, config.dpi);
            let page_pdf = staging.page_pdf_path(page_number);
            let debug_image = config.debug_image_path(page_number);
            let ctx = page_context(pipeline, config, debug_image.as_deref());

            let summary = process_page(&raster, &ctx, &page_pdf)?;
            regions_recognized += summary.recognized;
            page_pdfs.push(page_pdf);
            Ok(())
        },
    )?;

    // 欠けたページのまま出力を確定しない
    if rendered != page_count || page_pdfs.len() != page_count as usize {
        return Err(OcrPdfError::render(format!(
            "rasterized {} of {} pages",
            page_pdfs.len(),
            page_count
        )));
    }

    if page_pdfs.len() == 1 {
        promote(&page_pdfs[0], &config.output_path)?;
    } else {
        let merged = staging.merged_pdf_path();
        merge_pdf_files(&page_pdfs, &merged)?;
        promote(&merged, &config.output_path)?;
    }

    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        pages_processed: page_pdfs.len(),
        regions_recognized,
    })
}

fn process_image(
    pipeline: &Pipeline,
    config: &JobConfig,
    staging: &Staging,
) -> crate::error::Result<JobResult> {
    let image = image::open(&config.input_path).map_err(|e| {
        OcrPdfError::unsupported_input(format!(
            "failed to decode image {}: {}",
            config.input_path.display(),
            e
        ))
    })?;

    let raster = RasterPage::new(image, IMAGE_INPUT_DPI);
    let page_pdf = staging.page_pdf_path(1);
    let debug_image = config.debug_image_path(1);
    let ctx = page_context(pipeline, config, debug_image.as_deref());

    let summary = process_page(&raster, &ctx, &page_pdf)?;
    promote(&page_pdf, &config.output_path)?;

    Ok(JobResult {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        pages_processed: 1,
        regions_recognized: summary.recognized,
    })
}

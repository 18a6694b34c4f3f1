// pdfium-render wrapper: PDF -> ページごとの DynamicImage（メモリ上のみ）

use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

use crate::error::OcrPdfError;
use crate::render::Rasterizer;

/// Resolves the path to the pdfium shared library.
///
/// Search order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` environment variable
/// 2. `vendor/pdfium/lib/` relative to the project root (for development)
///
/// Returns `Ok(None)` when neither is available.
fn resolve_pdfium_lib_path() -> crate::error::Result<Option<PathBuf>> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        let p = PathBuf::from(&path);
        if p.exists() {
            return Ok(Some(p));
        }
        return Err(OcrPdfError::render(format!(
            "PDFIUM_DYNAMIC_LIB_PATH is set to '{}' but the path does not exist",
            path
        )));
    }

    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let vendor_path = PathBuf::from(&manifest_dir).join("vendor/pdfium/lib");
        if vendor_path.exists() {
            return Ok(Some(vendor_path));
        }
    }

    Ok(None)
}

/// Creates a new Pdfium instance by dynamically loading the shared library.
///
/// Falls back to the system library when no explicit location is configured.
fn create_pdfium() -> crate::error::Result<Pdfium> {
    let bindings = match resolve_pdfium_lib_path()? {
        Some(lib_path) => {
            let lib_path_str = lib_path.to_str().ok_or_else(|| {
                OcrPdfError::render("pdfium library path contains non-UTF-8 characters")
            })?;
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(lib_path_str))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| {
        OcrPdfError::render(format!(
            "pdfium library not found ({e}): set PDFIUM_DYNAMIC_LIB_PATH or place libpdfium.so in vendor/pdfium/lib/"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Target bitmap size for a page of `points` at `dpi` (72 DPI = 1 point per pixel).
pub fn pixels_for_points(points: f32, dpi: u32) -> i32 {
    ((points * dpi as f32 / 72.0).round() as i32).max(1)
}

/// Renders a single page at the given DPI.
fn render_loaded_page(page: &PdfPage, dpi: u32) -> crate::error::Result<DynamicImage> {
    if dpi == 0 {
        return Err(OcrPdfError::render("dpi must be greater than 0"));
    }
    let width_px = pixels_for_points(page.width().value, dpi);
    let height_px = pixels_for_points(page.height().value, dpi);

    let config = PdfRenderConfig::new()
        .set_target_width(width_px)
        .set_target_height(height_px);

    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| OcrPdfError::render(e.to_string()))?;

    Ok(bitmap.as_image())
}

/// pdfium を使うラスタライザ。
///
/// ライブラリは `rasterize` 呼び出しごとに読み込む。
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn page_count(&self, pdf_path: &Path) -> crate::error::Result<u32> {
        let pdfium = create_pdfium()?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| OcrPdfError::render(format!("{}: {}", pdf_path.display(), e)))?;
        Ok(document.pages().len() as u32)
    }

    fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        on_page: &mut dyn FnMut(u32, DynamicImage) -> crate::error::Result<()>,
    ) -> crate::error::Result<u32> {
        let pdfium = create_pdfium()?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| OcrPdfError::render(format!("{}: {}", pdf_path.display(), e)))?;

        let mut rendered = 0u32;
        for (index, page) in document.pages().iter().enumerate() {
            let image = render_loaded_page(&page, dpi)?;
            debug!(
                page = index + 1,
                width = image.width(),
                height = image.height(),
                dpi,
                "rendered page"
            );
            on_page(index as u32, image)?;
            rendered += 1;
        }

        Ok(rendered)
    }
}

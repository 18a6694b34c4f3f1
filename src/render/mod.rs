// ページラスタライズの抽象化

use std::path::Path;

use image::DynamicImage;

#[cfg(feature = "pdfium")]
pub mod pdfium;

/// PDFをページ単位のラスタ画像に変換する。
///
/// 実装はページを1枚ずつ順に `on_page(page_index, image)` へ渡す（0-indexed）。
/// 全ページを同時にメモリへ載せてはならない。
/// `on_page` がエラーを返した場合はそこで中断してそのエラーを返す。
/// 戻り値はラスタライズしたページ数。
pub trait Rasterizer {
    /// ページ数を返す。
    fn page_count(&self, pdf_path: &Path) -> crate::error::Result<u32>;

    fn rasterize(
        &self,
        pdf_path: &Path,
        dpi: u32,
        on_page: &mut dyn FnMut(u32, DynamicImage) -> crate::error::Result<()>,
    ) -> crate::error::Result<u32>;
}

/// ビルド構成に応じた既定のラスタライザ。
#[cfg(feature = "pdfium")]
pub fn default_rasterizer() -> Box<dyn Rasterizer> {
    Box::new(pdfium::PdfiumRasterizer::new())
}

/// ビルド構成に応じた既定のラスタライザ。
#[cfg(not(feature = "pdfium"))]
pub fn default_rasterizer() -> Box<dyn Rasterizer> {
    Box::new(UnavailableRasterizer)
}

/// `pdfium` feature 無しでビルドした場合のラスタライザ。PDF入力は常にエラー。
#[cfg(not(feature = "pdfium"))]
struct UnavailableRasterizer;

#[cfg(not(feature = "pdfium"))]
impl Rasterizer for UnavailableRasterizer {
    fn page_count(&self, _pdf_path: &Path) -> crate::error::Result<u32> {
        Err(crate::error::OcrPdfError::render(
            "PDF rasterization requires the `pdfium` feature",
        ))
    }

    fn rasterize(
        &self,
        pdf_path: &Path,
        _dpi: u32,
        _on_page: &mut dyn FnMut(u32, DynamicImage) -> crate::error::Result<()>,
    ) -> crate::error::Result<u32> {
        self.page_count(pdf_path)
    }
}

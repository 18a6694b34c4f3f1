// ページ単位処理: 検出 → 正規化 → 切り出し・認識 → 補正 → 配置 → 1ページPDF

use std::path::Path;

use image::{DynamicImage, RgbImage};
use tracing::{debug, info, warn};

use crate::engine::{TextDetector, TextRecognizer};
use crate::ocr::RecognizedText;
use crate::ocr::corrector::correct_text;
use crate::ocr::layout::{PlacedText, TextMeasure, fit_text};
use crate::ocr::region::{NormalizedRegion, RegionOrder, normalize_regions};
use crate::pdf::font::EmbeddedFont;
use crate::pdf::writer::{ComposeStats, OverlayPageWriter, PageGeometry};

/// ラスタライズ済みの1ページ。ページPDFを書き出したら破棄する。
pub struct RasterPage {
    pub image: DynamicImage,
    pub dpi: u32,
}

impl RasterPage {
    pub fn new(image: DynamicImage, dpi: u32) -> Self {
        Self { image, dpi }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.width(), self.height(), self.dpi)
    }
}

/// ページ処理に必要な外部資源と設定。
pub struct PageContext<'a> {
    pub detector: &'a dyn TextDetector,
    pub recognizer: &'a dyn TextRecognizer,
    pub font: &'a EmbeddedFont,
    pub order: RegionOrder,
    pub jpeg_quality: u8,
    /// Some の場合、検出領域を描き込んだPNGをここへ保存する
    pub debug_image: Option<&'a Path>,
}

/// 1ページ分の処理結果の集計。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSummary {
    pub detected: usize,
    pub normalized: usize,
    pub recognized: usize,
    pub compose: ComposeStats,
}

/// 正規化済み領域を順に切り出して認識する。
///
/// 認識エラーと空文字列の領域は捨てる（ページは中断しない）。
pub fn recognize_regions(
    page: &RgbImage,
    regions: &[NormalizedRegion],
    recognizer: &dyn TextRecognizer,
) -> Vec<RecognizedText> {
    let mut recognized = Vec::with_capacity(regions.len());

    for (idx, region) in regions.iter().enumerate() {
        let bbox = region.bbox;
        let crop = image::imageops::crop_imm(
            page,
            bbox.x_min,
            bbox.y_min,
            bbox.width(),
            bbox.height(),
        )
        .to_image();
        if crop.width() == 0 || crop.height() == 0 {
            continue;
        }

        let raw = match recognizer.recognize(&crop) {
            Ok(text) => text,
            Err(e) => {
                warn!(region = idx, "recognition failed, skipping region: {e}");
                continue;
            }
        };

        let text = correct_text(&raw);
        if text.trim().is_empty() {
            debug!(region = idx, "empty recognition result");
            continue;
        }
        debug!(region = idx, raw = %raw, text = %text, "recognized region");

        recognized.push(RecognizedText {
            text,
            polygon: region.polygon.clone(),
            bbox,
        });
    }

    recognized
}

/// 認識結果をページ座標系（ピクセル、原点左下）に配置する。
pub fn place_texts(
    texts: &[RecognizedText],
    page_height: f64,
    measure: &dyn TextMeasure,
) -> Vec<PlacedText> {
    texts
        .iter()
        .map(|t| fit_text(&t.text, &t.polygon, page_height, measure))
        .collect()
}

/// 1ページを処理して `output` に1ページPDFを書き出す。
///
/// 検出器のエラーと書き出しのエラーはページ（＝ファイル）単位で致命的。
pub fn process_page(
    page: &RasterPage,
    ctx: &PageContext<'_>,
    output: &Path,
) -> crate::error::Result<PageSummary> {
    let rgb = page.image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let detections = ctx.detector.detect(&rgb)?;
    let regions = normalize_regions(&detections, width, height, ctx.order);

    if let Some(debug_path) = ctx.debug_image
        && let Err(e) = crate::visualize::save_debug_overlay(
            &rgb,
            &regions,
            ctx.font.font_data(),
            debug_path,
        )
    {
        warn!("failed to write debug image: {e}");
    }

    let recognized = recognize_regions(&rgb, &regions, ctx.recognizer);
    let placed = place_texts(&recognized, height as f64, ctx.font);

    let mut writer = OverlayPageWriter::new();
    let compose = writer.write_page(
        &page.image,
        &page.geometry(),
        &placed,
        ctx.font,
        ctx.jpeg_quality,
    )?;
    writer.save(output)?;

    let summary = PageSummary {
        detected: detections.len(),
        normalized: regions.len(),
        recognized: recognized.len(),
        compose,
    };
    info!(
        output = %output.display(),
        detected = summary.detected,
        recognized = summary.recognized,
        drawn = compose.drawn,
        "page composed"
    );
    Ok(summary)
}

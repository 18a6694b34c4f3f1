// 背景画像 + 半透明テキストレイヤーの1ページPDFを組み立てる

use std::fmt::Write;
use std::path::Path;

use image::DynamicImage;
use lopdf::{Document, Object, Stream, dictionary};
use tracing::{debug, warn};

use crate::error::OcrPdfError;
use crate::ocr::layout::PlacedText;
use crate::pdf::font::{EmbeddedFont, EncodedText, GlyphUsage};
use crate::pdf::jpeg::encode_background_jpeg;

/// テキストレイヤーの塗り色 (RGB)。
pub const OVERLAY_COLOR: (f64, f64, f64) = (0.0, 0.0, 1.0);

/// テキストレイヤーの不透明度。背景画像が透けて見えるようにする。
pub const OVERLAY_ALPHA: f64 = 0.3;

const BACKGROUND_NAME: &str = "BgImg";
const FONT_NAME: &str = "F1";
const GSTATE_NAME: &str = "GS1";

/// ラスタ画像のピクセル寸法と解像度。
///
/// コンテンツはピクセル単位で記述し、`cm` で `72 / dpi` 倍してポイントに変換する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGeometry {
    pub width_px: u32,
    pub height_px: u32,
    pub dpi: u32,
}

impl PageGeometry {
    pub fn new(width_px: u32, height_px: u32, dpi: u32) -> Self {
        Self {
            width_px,
            height_px,
            dpi,
        }
    }

    /// 1ピクセルあたりのポイント数
    pub fn scale(&self) -> f64 {
        72.0 / self.dpi as f64
    }

    pub fn width_pts(&self) -> f64 {
        self.width_px as f64 * self.scale()
    }

    pub fn height_pts(&self) -> f64 {
        self.height_px as f64 * self.scale()
    }
}

/// 描画準備済みのテキスト1件。
#[derive(Debug, Clone)]
pub struct TextRun {
    pub encoded: EncodedText,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// `write_page` の結果集計。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeStats {
    /// 描画したテキスト数
    pub drawn: usize,
    /// ASCII置換で描画したテキスト数
    pub sanitized: usize,
    /// フォントサイズ不正・空文字列で描画しなかった数
    pub skipped: usize,
}

/// テキストをフォントで符号化する。
///
/// 符号化できない文字がある場合は印字可能ASCII以外を `?` に置換して再試行する。
/// 再試行は失敗しない。戻り値の `bool` は置換したかどうか。
pub fn encode_for_drawing(font: &EmbeddedFont, text: &str) -> (EncodedText, bool) {
    match font.encode(text) {
        Ok(encoded) => (encoded, false),
        Err(e) => {
            warn!("text not encodable, falling back to ASCII: {e}");
            (font.encode_lossy(text), true)
        }
    }
}

/// PDF演算子用の数値表記（小数4桁、末尾の0を除去）。
pub fn fmt_num(value: f64) -> String {
    let mut s = format!("{:.4}", value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// 1ページ分のオーバーレイPDFを組み立てる。
pub struct OverlayPageWriter {
    doc: Document,
}

impl Default for OverlayPageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayPageWriter {
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
        }
    }

    /// 内部のlopdf Documentへの参照を返す。
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// 背景JPEG XObjectを追加する。
    ///
    /// 戻り値はXObjectのオブジェクトID。
    pub fn add_background_xobject(
        &mut self,
        jpeg_data: &[u8],
        width: u32,
        height: u32,
    ) -> lopdf::ObjectId {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        let stream = Stream::new(dict, jpeg_data.to_vec());
        self.doc.add_object(Object::Stream(stream))
    }

    /// テキストレイヤー用の半透明グラフィックス状態を追加する。
    pub fn add_overlay_graphics_state(&mut self) -> lopdf::ObjectId {
        self.doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(OVERLAY_ALPHA as f32),
            "CA" => Object::Real(OVERLAY_ALPHA as f32),
        })
    }

    /// オーバーレイ用のコンテンツストリームバイト列を生成する。
    ///
    /// `q s 0 0 s 0 0 cm q W 0 0 H 0 0 cm /BgImg Do Q q /GS1 gs r g b rg BT ... ET Q Q`
    /// テキストが無い場合はテキストブロックを出力しない。
    pub fn build_overlay_content_stream(geometry: &PageGeometry, runs: &[TextRun]) -> Vec<u8> {
        let mut buf = String::new();
        let scale = fmt_num(geometry.scale());

        // NOTE: `String` への `fmt::Write` は失敗しないため、戻り値は無視してよい。
        let _ = writeln!(buf, "q\n{scale} 0 0 {scale} 0 0 cm");
        let _ = writeln!(
            buf,
            "q {} 0 0 {} 0 0 cm /{BACKGROUND_NAME} Do Q",
            geometry.width_px, geometry.height_px
        );

        if !runs.is_empty() {
            let (r, g, b) = OVERLAY_COLOR;
            let _ = writeln!(
                buf,
                "q\n/{GSTATE_NAME} gs\n{} {} {} rg\nBT",
                fmt_num(r),
                fmt_num(g),
                fmt_num(b)
            );
            for run in runs {
                let _ = writeln!(
                    buf,
                    "/{FONT_NAME} {} Tf\n1 0 0 1 {} {} Tm\n{} Tj",
                    fmt_num(run.font_size),
                    fmt_num(run.x),
                    fmt_num(run.y),
                    run.encoded.to_hex_string()
                );
            }
            buf.push_str("ET\nQ\n");
        }

        buf.push_str("Q\n");
        buf.into_bytes()
    }

    /// 背景画像とテキストレイヤーから1ページを構築する。
    ///
    /// テキスト単位の失敗（符号化不可・不正なサイズ）はページを中断しない。
    pub fn write_page(
        &mut self,
        background: &DynamicImage,
        geometry: &PageGeometry,
        placed: &[PlacedText],
        font: &EmbeddedFont,
        jpeg_quality: u8,
    ) -> crate::error::Result<ComposeStats> {
        let mut stats = ComposeStats::default();
        let mut usage = GlyphUsage::new();
        let mut runs: Vec<TextRun> = Vec::with_capacity(placed.len());

        for text in placed {
            if !(text.font_size.is_finite() && text.font_size > 0.0)
                || !text.x.is_finite()
                || !text.y.is_finite()
            {
                debug!(text = %text.text, font_size = text.font_size, "skipping text with invalid placement");
                stats.skipped += 1;
                continue;
            }
            let (encoded, sanitized) = encode_for_drawing(font, &text.text);
            if encoded.glyphs.is_empty() {
                stats.skipped += 1;
                continue;
            }
            if sanitized {
                stats.sanitized += 1;
            }
            usage.record(&encoded);
            runs.push(TextRun {
                encoded,
                x: text.x,
                y: text.y,
                font_size: text.font_size,
            });
            stats.drawn += 1;
        }

        let jpeg = encode_background_jpeg(background, jpeg_quality)?;
        let bg_id = self.add_background_xobject(&jpeg, geometry.width_px, geometry.height_px);

        let mut xobject_dict = lopdf::Dictionary::new();
        xobject_dict.set(BACKGROUND_NAME, Object::Reference(bg_id));

        let mut resources = dictionary! {
            "XObject" => Object::Dictionary(xobject_dict),
        };
        if !usage.is_empty() {
            let font_id = font.add_to_document(&mut self.doc, &usage);
            let gs_id = self.add_overlay_graphics_state();
            let mut font_dict = lopdf::Dictionary::new();
            font_dict.set(FONT_NAME, Object::Reference(font_id));
            let mut gs_dict = lopdf::Dictionary::new();
            gs_dict.set(GSTATE_NAME, Object::Reference(gs_id));
            resources.set("Font", Object::Dictionary(font_dict));
            resources.set("ExtGState", Object::Dictionary(gs_dict));
        }
        let resources_id = self.doc.add_object(resources);

        let pages_id = self.doc.new_object_id();

        let content_bytes = Self::build_overlay_content_stream(geometry, &runs);
        let content_stream = Stream::new(dictionary! {}, content_bytes);
        let content_id = self.doc.add_object(Object::Stream(content_stream));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(geometry.width_pts() as f32),
                Object::Real(geometry.height_pts() as f32),
            ],
            "Resources" => resources_id,
            "Contents" => content_id,
        });

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        self.doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        Ok(stats)
    }

    /// PDFドキュメントをバイト列として出力する（ストリームは圧縮される）。
    pub fn save_to_bytes(&mut self) -> crate::error::Result<Vec<u8>> {
        crate::pdf::optimizer::optimize(&mut self.doc);
        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| OcrPdfError::pdf_write(e.to_string()))?;
        Ok(buf)
    }

    /// PDFドキュメントをファイルに書き出す。
    pub fn save(&mut self, path: &Path) -> crate::error::Result<()> {
        let bytes = self.save_to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| {
            OcrPdfError::pdf_write(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

// デバッグ用: 検出領域と処理番号をページ画像に描き込む

use std::path::Path;

use ab_glyph::FontRef;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};

use crate::error::OcrPdfError;
use crate::ocr::region::NormalizedRegion;

/// 領域ポリゴンの線色
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// 処理番号ラベルの色
pub const LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// ラベルの文字高さ（ピクセル）
const LABEL_SCALE: f32 = 14.0;

/// ラベルのポリゴン上端からの距離（ピクセル）
const LABEL_OFFSET: i32 = 5;

/// 線分を矩形 `[x_lo, x_hi] × [y_lo, y_hi]` に切り詰める（Liang-Barsky）。
///
/// 線分が矩形と交わらない場合は `None`。
fn clip_segment(
    p1: [f64; 2],
    p2: [f64; 2],
    (x_lo, y_lo, x_hi, y_hi): (f64, f64, f64, f64),
) -> Option<([f64; 2], [f64; 2])> {
    let (dx, dy) = (p2[0] - p1[0], p2[1] - p1[1]);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    let edges = [
        (-dx, p1[0] - x_lo),
        (dx, x_hi - p1[0]),
        (-dy, p1[1] - y_lo),
        (dy, y_hi - p1[1]),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        [p1[0] + t0 * dx, p1[1] + t0 * dy],
        [p1[0] + t1 * dx, p1[1] + t1 * dy],
    ))
}

/// 閉じたポリゴンを2ピクセル幅で描く。キャンバス外の部分は描かない。
fn draw_polygon_outline(canvas: &mut RgbImage, polygon: &[[f64; 2]]) {
    let bounds = (
        -1.0,
        -1.0,
        canvas.width() as f64 + 1.0,
        canvas.height() as f64 + 1.0,
    );
    let n = polygon.len();
    for i in 0..n {
        let Some((p1, p2)) = clip_segment(polygon[i], polygon[(i + 1) % n], bounds) else {
            continue;
        };
        let (x1, y1) = (p1[0] as f32, p1[1] as f32);
        let (x2, y2) = (p2[0] as f32, p2[1] as f32);

        draw_line_segment_mut(canvas, (x1, y1), (x2, y2), OUTLINE_COLOR);
        draw_line_segment_mut(canvas, (x1 + 1.0, y1), (x2 + 1.0, y2), OUTLINE_COLOR);
        draw_line_segment_mut(canvas, (x1, y1 + 1.0), (x2, y2 + 1.0), OUTLINE_COLOR);
    }
}

/// 番号ラベルの左上座標。ポリゴンの最小x、最小yの `LABEL_OFFSET` 上にベースラインを置く。
///
/// 座標は `width` × `height` のキャンバス内に収める。
pub fn label_origin(polygon: &[[f64; 2]], width: u32, height: u32) -> (i32, i32) {
    let x_min = polygon.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let y_min = polygon.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
    let top = y_min - LABEL_OFFSET as f64 - LABEL_SCALE as f64;
    (
        x_min.clamp(0.0, width as f64) as i32,
        top.clamp(0.0, height as f64) as i32,
    )
}

/// ページ画像のコピーに全領域の輪郭と処理番号（0始まり）を描く。
///
/// `font` が `None` の場合は輪郭のみ描く。
pub fn draw_debug_overlay(
    page: &RgbImage,
    regions: &[NormalizedRegion],
    font: Option<&FontRef<'_>>,
) -> RgbImage {
    let mut canvas = page.clone();

    for (idx, region) in regions.iter().enumerate() {
        draw_polygon_outline(&mut canvas, &region.polygon);

        if let Some(font) = font {
            let (x, y) = label_origin(&region.polygon, canvas.width(), canvas.height());
            draw_text_mut(
                &mut canvas,
                LABEL_COLOR,
                x,
                y,
                LABEL_SCALE,
                font,
                &idx.to_string(),
            );
        }
    }

    canvas
}

/// デバッグ画像をPNGとして保存する。
///
/// `font_data` はラベル描画用のTrueTypeデータ。読めない場合はラベルを省略する。
pub fn save_debug_overlay(
    page: &RgbImage,
    regions: &[NormalizedRegion],
    font_data: &[u8],
    path: &Path,
) -> crate::error::Result<()> {
    let font = FontRef::try_from_slice(font_data).ok();
    let canvas = draw_debug_overlay(page, regions, font.as_ref());
    canvas.save(path).map_err(|e| {
        OcrPdfError::image_encode(format!(
            "failed to write debug image {}: {}",
            path.display(),
            e
        ))
    })
}

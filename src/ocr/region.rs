// 検出領域の正規化: スコアフィルタ → パディング → クリップ → 退化ボックス除去

use tracing::debug;

use crate::engine::DetectedRegion;

/// これ未満のスコアの検出領域は破棄する。
pub const MIN_SCORE: f32 = 0.5;

/// 切り出し前に各辺へ加えるパディング（ピクセル）。
pub const BOX_PADDING: i64 = 5;

/// ページ境界内にクリップ済みの軸平行ボックス（ピクセル座標、原点左上）。
///
/// 不変条件: `x_max > x_min` かつ `y_max > y_min`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedBox {
    pub x_min: u32,
    pub y_min: u32,
    pub x_max: u32,
    pub y_max: u32,
}

impl NormalizedBox {
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }
}

/// 切り出し可能な状態になった検出領域。
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRegion {
    pub bbox: NormalizedBox,
    /// 検出器が返した元のポリゴン（配置計算に使用）
    pub polygon: Vec<[f64; 2]>,
    pub score: f32,
}

/// 正規化後の領域の処理順。
///
/// 現状は検出器の出力順を反転する一種類のみ。認識順とデバッグ描画の
/// 番号付けがこの順序に従う。読み順を意味するものではない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegionOrder {
    #[default]
    ReverseEmission,
}

/// ポリゴンの外接矩形を整数に切り捨てて返す `(x_min, y_min, x_max, y_max)`。
///
/// 頂点が3未満、または非有限値を含む場合は `None`。
pub fn polygon_bounds(polygon: &[[f64; 2]]) -> Option<(i64, i64, i64, i64)> {
    if polygon.len() < 3 {
        return None;
    }
    if polygon.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return None;
    }

    let x_min = polygon.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let x_max = polygon.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
    let y_min = polygon.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
    let y_max = polygon.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);

    // `as` はゼロ方向への切り捨て。i64 の範囲外は飽和する
    Some((x_min as i64, y_min as i64, x_max as i64, y_max as i64))
}

/// パディングを加えてページ境界 `[0, width] × [0, height]` にクリップする。
///
/// クリップ後に面積が0以下になる場合は `None`。
pub fn pad_and_clip(
    bounds: (i64, i64, i64, i64),
    width: u32,
    height: u32,
) -> Option<NormalizedBox> {
    let (x1, y1, x2, y2) = bounds;
    // 外接矩形は飽和キャスト済みなので、パディングも飽和演算で行う
    let x1 = x1.saturating_sub(BOX_PADDING).clamp(0, width as i64);
    let y1 = y1.saturating_sub(BOX_PADDING).clamp(0, height as i64);
    let x2 = x2.saturating_add(BOX_PADDING).clamp(0, width as i64);
    let y2 = y2.saturating_add(BOX_PADDING).clamp(0, height as i64);

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(NormalizedBox {
        x_min: x1 as u32,
        y_min: y1 as u32,
        x_max: x2 as u32,
        y_max: y2 as u32,
    })
}

/// 1ページ分の検出結果を切り出し可能な領域列に変換する。
///
/// 1. ポリゴン → 整数の外接矩形
/// 2. スコア `< MIN_SCORE` を除外
/// 3. `BOX_PADDING` だけ拡張してページ境界にクリップ
/// 4. 面積0の矩形を除外
/// 5. `order` に従って並べ替え
pub fn normalize_regions(
    regions: &[DetectedRegion],
    width: u32,
    height: u32,
    order: RegionOrder,
) -> Vec<NormalizedRegion> {
    let mut kept: Vec<NormalizedRegion> = Vec::with_capacity(regions.len());
    let mut low_score = 0usize;
    let mut degenerate = 0usize;

    for region in regions {
        let Some(bounds) = polygon_bounds(&region.polygon) else {
            degenerate += 1;
            continue;
        };
        if region.score.is_nan() || region.score < MIN_SCORE {
            low_score += 1;
            continue;
        }
        let Some(bbox) = pad_and_clip(bounds, width, height) else {
            degenerate += 1;
            continue;
        };
        kept.push(NormalizedRegion {
            bbox,
            polygon: region.polygon.clone(),
            score: region.score,
        });
    }

    match order {
        RegionOrder::ReverseEmission => kept.reverse(),
    }

    debug!(
        detected = regions.len(),
        kept = kept.len(),
        low_score,
        degenerate,
        "normalized detection regions"
    );

    kept
}

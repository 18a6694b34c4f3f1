// テキスト配置計算: フォントサイズ・位置・幅合わせ

/// 指定フォントサイズでの文字列の描画幅を返す。
///
/// 計測できない場合（グリフが無い等）は `None`。
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f64) -> Option<f64>;
}

/// PDF座標系（原点左下）に配置されたテキスト。
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

fn polygon_min_max(polygon: &[[f64; 2]]) -> (f64, f64, f64, f64) {
    let x_min = polygon.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
    let x_max = polygon.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
    let y_min = polygon.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
    let y_max = polygon.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);
    (x_min, x_max, y_min, y_max)
}

/// 初期フォントサイズと描画位置を計算する。
///
/// - フォントサイズ = 外接矩形の高さ
/// - `x = min(xs)`
/// - `y = page_height - max(ys) + 0.1 × 高さ`（左上原点 → 左下原点、わずかに持ち上げる）
///
/// 戻り値: `(x, y, font_size, bbox_width)`
pub fn initial_placement(polygon: &[[f64; 2]], page_height: f64) -> (f64, f64, f64, f64) {
    let (x_min, x_max, y_min, y_max) = polygon_min_max(polygon);
    let bbox_width = x_max - x_min;
    let bbox_height = y_max - y_min;

    let font_size = bbox_height;
    let x = x_min;
    let y = page_height - y_max + bbox_height * 0.1;

    (x, y, font_size, bbox_width)
}

/// 描画幅が `bbox_width` に一致するようにフォントサイズを拡縮する。
///
/// 計測に失敗した場合、または幅が0の場合は `font_size` をそのまま返す。
pub fn fit_font_size_to_width(
    text: &str,
    bbox_width: f64,
    font_size: f64,
    measure: &dyn TextMeasure,
) -> f64 {
    match measure.text_width(text, font_size) {
        Some(width) if width.is_finite() && width > 0.0 => font_size * bbox_width / width,
        _ => font_size,
    }
}

/// 認識済みテキストの配置を計算する。
pub fn fit_text(
    text: &str,
    polygon: &[[f64; 2]],
    page_height: f64,
    measure: &dyn TextMeasure,
) -> PlacedText {
    let (x, y, font_size, bbox_width) = initial_placement(polygon, page_height);
    let font_size = fit_font_size_to_width(text, bbox_width, font_size, measure);

    PlacedText {
        text: text.to_string(),
        x,
        y,
        font_size,
    }
}

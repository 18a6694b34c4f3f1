// 検出領域の正規化テスト

use searchable_pdf::engine::DetectedRegion;
use searchable_pdf::ocr::region::{
    BOX_PADDING, MIN_SCORE, NormalizedBox, RegionOrder, normalize_regions, pad_and_clip,
    polygon_bounds,
};

fn quad(x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<[f64; 2]> {
    vec![[x1, y1], [x2, y1], [x2, y2], [x1, y2]]
}

// ============================================================
// 1. polygon_bounds
// ============================================================

#[test]
fn test_polygon_bounds_truncates_toward_zero() {
    let bounds = polygon_bounds(&[[10.9, 20.2], [50.7, 20.9], [50.1, 40.99], [10.2, 40.5]]);
    assert_eq!(bounds, Some((10, 20, 50, 40)));
}

#[test]
fn test_polygon_bounds_rejects_short_polygons() {
    assert_eq!(polygon_bounds(&[]), None);
    assert_eq!(polygon_bounds(&[[1.0, 1.0], [5.0, 5.0]]), None);
}

#[test]
fn test_polygon_bounds_rejects_non_finite() {
    let polygon = [[0.0, 0.0], [f64::NAN, 1.0], [3.0, 3.0]];
    assert_eq!(polygon_bounds(&polygon), None);

    let polygon = [[0.0, 0.0], [f64::INFINITY, 1.0], [3.0, 3.0]];
    assert_eq!(polygon_bounds(&polygon), None);
}

// ============================================================
// 2. pad_and_clip
// ============================================================

#[test]
fn test_pad_and_clip_expands_by_padding() {
    let bbox = pad_and_clip((10, 20, 50, 40), 200, 100).expect("box should survive");
    assert_eq!(
        bbox,
        NormalizedBox {
            x_min: 10 - BOX_PADDING as u32,
            y_min: 20 - BOX_PADDING as u32,
            x_max: 50 + BOX_PADDING as u32,
            y_max: 40 + BOX_PADDING as u32,
        }
    );
}

#[test]
fn test_pad_and_clip_clamps_to_page() {
    let bbox = pad_and_clip((2, 1, 198, 99), 200, 100).expect("box should survive");
    assert_eq!(bbox.x_min, 0);
    assert_eq!(bbox.y_min, 0);
    assert_eq!(bbox.x_max, 200);
    assert_eq!(bbox.y_max, 100);
}

#[test]
fn test_pad_and_clip_drops_box_outside_page() {
    // 完全にページ外（右側）の矩形はクリップ後に面積0になる
    assert_eq!(pad_and_clip((300, 10, 320, 20), 200, 100), None);
    // 負の座標側
    assert_eq!(pad_and_clip((-50, -50, -20, -20), 200, 100), None);
}

// ============================================================
// 3. normalize_regions
// ============================================================

#[test]
fn test_normalize_filters_low_scores() {
    let regions = vec![
        DetectedRegion::new(quad(10.0, 10.0, 50.0, 30.0), 0.9),
        DetectedRegion::new(quad(60.0, 10.0, 90.0, 30.0), 0.49),
        DetectedRegion::new(quad(10.0, 40.0, 50.0, 60.0), MIN_SCORE),
        DetectedRegion::new(quad(60.0, 40.0, 90.0, 60.0), f32::NAN),
    ];

    let normalized = normalize_regions(&regions, 100, 100, RegionOrder::ReverseEmission);

    assert_eq!(normalized.len(), 2, "0.49 and NaN should be dropped");
    assert!(normalized.iter().all(|r| r.score >= MIN_SCORE));
}

#[test]
fn test_normalize_reverses_emission_order() {
    let regions = vec![
        DetectedRegion::new(quad(10.0, 10.0, 20.0, 20.0), 0.9),
        DetectedRegion::new(quad(30.0, 10.0, 40.0, 20.0), 0.8),
        DetectedRegion::new(quad(50.0, 10.0, 60.0, 20.0), 0.7),
    ];

    let normalized = normalize_regions(&regions, 100, 100, RegionOrder::default());

    let scores: Vec<f32> = normalized.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![0.7, 0.8, 0.9]);
    // 元のポリゴンは配置計算のためそのまま保持される
    assert_eq!(normalized[0].polygon, regions[2].polygon);
}

#[test]
fn test_normalize_boxes_stay_within_page() {
    let regions = vec![
        DetectedRegion::new(quad(-10.0, -10.0, 30.0, 30.0), 0.9),
        DetectedRegion::new(quad(70.0, 40.0, 130.0, 80.0), 0.9),
        DetectedRegion::new(quad(0.0, 0.0, 100.0, 50.0), 0.9),
    ];
    let (width, height) = (100u32, 50u32);

    let normalized = normalize_regions(&regions, width, height, RegionOrder::ReverseEmission);

    assert_eq!(normalized.len(), 3);
    for region in &normalized {
        let b = region.bbox;
        assert!(b.x_max <= width && b.y_max <= height, "{b:?}");
        assert!(b.x_min < b.x_max && b.y_min < b.y_max, "{b:?}");
    }
}

#[test]
fn test_normalize_drops_degenerate_and_offpage_regions() {
    let regions = vec![
        // 2頂点のみ
        DetectedRegion::new(vec![[10.0, 10.0], [20.0, 20.0]], 0.9),
        // ページ外
        DetectedRegion::new(quad(500.0, 500.0, 600.0, 600.0), 0.9),
        // 有効
        DetectedRegion::new(quad(10.0, 10.0, 20.0, 20.0), 0.9),
    ];

    let normalized = normalize_regions(&regions, 100, 100, RegionOrder::ReverseEmission);

    assert_eq!(normalized.len(), 1);
    assert_eq!(
        normalized[0].bbox,
        NormalizedBox {
            x_min: 5,
            y_min: 5,
            x_max: 25,
            y_max: 25
        }
    );
}

#[test]
fn test_normalize_empty_input() {
    let normalized = normalize_regions(&[], 100, 100, RegionOrder::ReverseEmission);
    assert!(normalized.is_empty());
}

#[test]
fn test_normalize_extreme_coordinates_clip_to_page() {
    let regions = vec![
        DetectedRegion::new(vec![[-1e19, 10.0], [50.0, 10.0], [50.0, 30.0], [-1e19, 30.0]], 0.9),
        DetectedRegion::new(quad(40.0, 20.0, 1e19, 1e19), 0.9),
        DetectedRegion::new(quad(-1e19, -1e19, 1e19, 1e19), 0.9),
    ];

    let normalized = normalize_regions(&regions, 100, 100, RegionOrder::ReverseEmission);

    let boxes: Vec<NormalizedBox> = normalized.iter().map(|r| r.bbox).collect();
    assert_eq!(
        boxes,
        vec![
            NormalizedBox { x_min: 0, y_min: 0, x_max: 100, y_max: 100 },
            NormalizedBox { x_min: 35, y_min: 15, x_max: 100, y_max: 100 },
            NormalizedBox { x_min: 0, y_min: 5, x_max: 55, y_max: 35 },
        ]
    );
}

#[test]
fn test_pad_and_clip_saturates_at_integer_limits() {
    assert_eq!(
        pad_and_clip((i64::MIN, i64::MIN, i64::MAX, i64::MAX), 80, 60),
        Some(NormalizedBox { x_min: 0, y_min: 0, x_max: 80, y_max: 60 })
    );
    assert_eq!(pad_and_clip((i64::MAX, 0, i64::MAX, 10), 80, 60), None);
}

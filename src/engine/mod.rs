// 検出器・認識器の抽象化。モデル本体はクレート外にあり、この2つのトレイトで差し替える

pub mod command;

use image::RgbImage;
use serde::Deserialize;

/// One text region reported by a detector.
///
/// Coordinates are image pixels with the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectedRegion {
    pub polygon: Vec<[f64; 2]>,
    pub score: f32,
}

impl DetectedRegion {
    pub fn new(polygon: Vec<[f64; 2]>, score: f32) -> Self {
        Self { polygon, score }
    }
}

/// Finds text regions in a full page raster.
pub trait TextDetector {
    /// Returns regions in the detector's own emission order; may be empty.
    fn detect(&self, image: &RgbImage) -> crate::error::Result<Vec<DetectedRegion>>;
}

/// Reads the text of one cropped region.
pub trait TextRecognizer {
    fn recognize(&self, crop: &RgbImage) -> crate::error::Result<String>;
}

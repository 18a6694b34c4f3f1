pub mod job_runner;
pub mod orchestrator;
pub mod page_processor;
pub mod staging;

use crate::config::settings::Settings;
use crate::engine::command::{CommandDetector, CommandRecognizer};
use crate::engine::{TextDetector, TextRecognizer};
use crate::error::OcrPdfError;
use crate::ocr::region::RegionOrder;
use crate::pdf::font::EmbeddedFont;
use crate::render::Rasterizer;

/// 長寿命の資源（検出器・認識器・ラスタライザ・フォント）をまとめて所有する。
///
/// 一度構築して各ジョブから借用する。スレッド間では共有しない。
pub struct Pipeline {
    detector: Box<dyn TextDetector>,
    recognizer: Box<dyn TextRecognizer>,
    rasterizer: Box<dyn Rasterizer>,
    font: EmbeddedFont,
    order: RegionOrder,
}

impl Pipeline {
    pub fn new(
        detector: Box<dyn TextDetector>,
        recognizer: Box<dyn TextRecognizer>,
        rasterizer: Box<dyn Rasterizer>,
        font: EmbeddedFont,
    ) -> Self {
        Self {
            detector,
            recognizer,
            rasterizer,
            font,
            order: RegionOrder::default(),
        }
    }

    /// settings.yaml の内容からパイプラインを組み立てる。
    ///
    /// 検出器・認識器のコマンドは必須。フォントは `font_path`、無ければシステムから探す。
    pub fn from_settings(settings: &Settings) -> crate::error::Result<Self> {
        let detector = settings
            .detector
            .clone()
            .ok_or_else(|| OcrPdfError::config("settings.detector is not configured"))?;
        let recognizer = settings
            .recognizer
            .clone()
            .ok_or_else(|| OcrPdfError::config("settings.recognizer is not configured"))?;
        let font = EmbeddedFont::load(settings.font_path.as_deref())?;

        Ok(Self::new(
            Box::new(CommandDetector::new(detector)),
            Box::new(CommandRecognizer::new(recognizer)),
            crate::render::default_rasterizer(),
            font,
        ))
    }

    pub fn detector(&self) -> &dyn TextDetector {
        self.detector.as_ref()
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    pub fn rasterizer(&self) -> &dyn Rasterizer {
        self.rasterizer.as_ref()
    }

    pub fn font(&self) -> &EmbeddedFont {
        &self.font
    }

    pub fn order(&self) -> RegionOrder {
        self.order
    }
}

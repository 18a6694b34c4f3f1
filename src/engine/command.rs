// 外部コマンド版の検出器・認識器: 画像を一時PNGに書き、そのパスを最後の引数に付けて実行し stdout を読む

use std::path::Path;
use std::process::{Command, Output};

use image::RgbImage;

use crate::config::settings::EngineCommand;
use crate::engine::{DetectedRegion, TextDetector, TextRecognizer};
use crate::error::OcrPdfError;

/// Detector backed by an external program that prints a JSON array of
/// `{"polygon": [[x, y], ...], "score": f}` objects.
pub struct CommandDetector {
    command: EngineCommand,
}

impl CommandDetector {
    pub fn new(command: EngineCommand) -> Self {
        Self { command }
    }
}

impl TextDetector for CommandDetector {
    fn detect(&self, image: &RgbImage) -> crate::error::Result<Vec<DetectedRegion>> {
        let stdout = run_on_image(&self.command, image).map_err(OcrPdfError::detection)?;
        parse_detections(&stdout)
    }
}

/// Recognizer backed by an external program that prints the recognized text.
pub struct CommandRecognizer {
    command: EngineCommand,
}

impl CommandRecognizer {
    pub fn new(command: EngineCommand) -> Self {
        Self { command }
    }
}

impl TextRecognizer for CommandRecognizer {
    fn recognize(&self, crop: &RgbImage) -> crate::error::Result<String> {
        let stdout = run_on_image(&self.command, crop).map_err(OcrPdfError::recognition)?;
        let text = String::from_utf8(stdout)
            .map_err(|e| OcrPdfError::recognition(format!("output is not UTF-8: {e}")))?;
        Ok(strip_trailing_newline(text))
    }
}

/// Parse the detector's stdout.
pub fn parse_detections(stdout: &[u8]) -> crate::error::Result<Vec<DetectedRegion>> {
    let trimmed = String::from_utf8_lossy(stdout);
    let trimmed = trimmed.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|e| {
        OcrPdfError::detection(format!("failed to parse detector output as JSON: {e}"))
    })
}

fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

/// Save `image` to a temp PNG and run the command on it, returning stdout.
fn run_on_image(command: &EngineCommand, image: &RgbImage) -> Result<Vec<u8>, String> {
    let file = tempfile::Builder::new()
        .prefix("ocr_input_")
        .suffix(".png")
        .tempfile()
        .map_err(|e| format!("failed to create temp image: {e}"))?;
    image
        .save_with_format(file.path(), image::ImageFormat::Png)
        .map_err(|e| format!("failed to write temp image: {e}"))?;

    let output = Command::new(&command.program)
        .args(&command.args)
        .arg(file.path())
        .output();

    check_output(&command.program, file.path(), output)
}

fn check_output(
    program: &str,
    image_path: &Path,
    output: std::io::Result<Output>,
) -> Result<Vec<u8>, String> {
    match output {
        Ok(result) => {
            if result.status.success() {
                Ok(result.stdout)
            } else {
                let stderr = String::from_utf8_lossy(&result.stderr);
                Err(format!(
                    "{program} failed on {} (exit code {}): {}",
                    image_path.display(),
                    result
                        .status
                        .code()
                        .map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                    stderr.trim()
                ))
            }
        }
        Err(e) => Err(format!("failed to execute {program}: {e}")),
    }
}

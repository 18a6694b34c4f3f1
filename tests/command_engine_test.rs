// 外部コマンド検出器・認識器のテスト

use image::{Rgb, RgbImage};
use searchable_pdf::config::settings::EngineCommand;
use searchable_pdf::engine::command::{CommandDetector, CommandRecognizer, parse_detections};
use searchable_pdf::engine::{DetectedRegion, TextDetector, TextRecognizer};
use searchable_pdf::error::OcrPdfError;

fn small_image() -> RgbImage {
    RgbImage::from_pixel(8, 4, Rgb([255, 255, 255]))
}

/// `sh -c <script>`。画像パスは `$0` として渡る。
#[cfg(unix)]
fn shell(script: &str) -> EngineCommand {
    EngineCommand {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    }
}

// ============================================================
// 1. 検出結果のパース
// ============================================================

#[test]
fn test_parse_detections_json() {
    let json = br#"[
        {"polygon": [[1, 2], [10, 2], [10, 8], [1, 8]], "score": 0.75},
        {"polygon": [[0.5, 0.5], [3.5, 0.5], [3.5, 2.0]], "score": 0.1}
    ]"#;
    let regions = parse_detections(json).expect("parse");
    assert_eq!(regions.len(), 2);
    assert_eq!(
        regions[0],
        DetectedRegion::new(
            vec![[1.0, 2.0], [10.0, 2.0], [10.0, 8.0], [1.0, 8.0]],
            0.75
        )
    );
    assert_eq!(regions[1].polygon.len(), 3);
}

#[test]
fn test_parse_detections_empty_output() {
    assert!(parse_detections(b"").unwrap().is_empty());
    assert!(parse_detections(b"  \n").unwrap().is_empty());
    assert!(parse_detections(b"[]").unwrap().is_empty());
}

#[test]
fn test_parse_detections_malformed() {
    let err = parse_detections(b"{not json").expect_err("should fail");
    assert!(matches!(err, OcrPdfError::DetectionError(_)));

    // score 欠落
    assert!(parse_detections(br#"[{"polygon": [[0, 0]]}]"#).is_err());
}

// ============================================================
// 2. 外部プロセス
// ============================================================

#[cfg(unix)]
#[test]
fn test_command_detector_reads_json_stdout() {
    let detector = CommandDetector::new(shell(
        r#"test -s "$0" && echo '[{"polygon": [[0,0],[4,0],[4,2],[0,2]], "score": 0.9}]'"#,
    ));
    let regions = detector.detect(&small_image()).expect("detect");
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].score, 0.9);
}

#[cfg(unix)]
#[test]
fn test_command_detector_passes_png() {
    // PNG シグネチャの 2-4 バイト目は "PNG"
    let detector = CommandDetector::new(shell(
        r#"head -c 4 "$0" | tail -c 3 | grep -q PNG && echo '[]'"#,
    ));
    assert!(detector.detect(&small_image()).expect("detect").is_empty());
}

#[cfg(unix)]
#[test]
fn test_command_recognizer_strips_one_trailing_newline() {
    let recognizer = CommandRecognizer::new(shell("printf 'Hello World\\n'"));
    assert_eq!(recognizer.recognize(&small_image()).unwrap(), "Hello World");

    let recognizer = CommandRecognizer::new(shell("printf '  spaced  \\r\\n'"));
    assert_eq!(recognizer.recognize(&small_image()).unwrap(), "  spaced  ");

    let recognizer = CommandRecognizer::new(shell("printf 'no newline'"));
    assert_eq!(recognizer.recognize(&small_image()).unwrap(), "no newline");
}

#[cfg(unix)]
#[test]
fn test_command_recognizer_nonzero_exit() {
    let recognizer = CommandRecognizer::new(shell("echo boom >&2; exit 3"));
    let err = recognizer.recognize(&small_image()).expect_err("should fail");
    match err {
        OcrPdfError::RecognitionError(msg) => {
            assert!(msg.contains("exit code 3"), "{msg}");
            assert!(msg.contains("boom"), "{msg}");
        }
        other => panic!("expected RecognitionError, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_command_detector_nonzero_exit() {
    let detector = CommandDetector::new(shell("exit 1"));
    let err = detector.detect(&small_image()).expect_err("should fail");
    assert!(matches!(err, OcrPdfError::DetectionError(_)));
}

#[test]
fn test_command_missing_program() {
    let detector = CommandDetector::new(EngineCommand {
        program: "/nonexistent/ocr-detector".to_string(),
        args: Vec::new(),
    });
    let err = detector.detect(&small_image()).expect_err("should fail");
    assert!(err.to_string().contains("failed to execute"), "{err}");
}

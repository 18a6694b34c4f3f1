use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrPdfError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("PDF read error: {0}")]
    PdfReadError(String),

    #[error("PDF write error: {0}")]
    PdfWriteError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Detection error: {0}")]
    DetectionError(String),

    #[error("Recognition error: {0}")]
    RecognitionError(String),

    #[error("Image encode error: {0}")]
    ImageEncodeError(String),

    #[error("Merge error: {0}")]
    MergeError(String),

    #[error("{}: {source}", path.display())]
    JobFailed {
        path: PathBuf,
        #[source]
        source: Box<OcrPdfError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`OcrPdfError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl OcrPdfError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an unsupported input error.
    unsupported_input => UnsupportedInput,
    /// Create a PDF read error.
    pdf_read => PdfReadError,
    /// Create a PDF write error.
    pdf_write => PdfWriteError,
    /// Create a render error.
    render => RenderError,
    /// Create a font error.
    font => FontError,
    /// Create a detection error.
    detection => DetectionError,
    /// Create a recognition error.
    recognition => RecognitionError,
    /// Create an image encode error.
    image_encode => ImageEncodeError,
    /// Create a merge error.
    merge => MergeError,
}

impl OcrPdfError {
    /// Attach the input file path to a file-level failure.
    ///
    /// Errors that already carry a path are returned unchanged.
    pub fn for_job(self, path: impl Into<PathBuf>) -> Self {
        match self {
            err @ Self::JobFailed { .. } => err,
            other => Self::JobFailed {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

impl From<lopdf::Error> for OcrPdfError {
    fn from(e: lopdf::Error) -> Self {
        Self::PdfReadError(e.to_string())
    }
}

impl From<serde_json::Error> for OcrPdfError {
    fn from(e: serde_json::Error) -> Self {
        Self::DetectionError(e.to_string())
    }
}

impl From<serde_yml::Error> for OcrPdfError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

#[cfg(feature = "pdfium")]
impl From<pdfium_render::prelude::PdfiumError> for OcrPdfError {
    fn from(e: pdfium_render::prelude::PdfiumError) -> Self {
        Self::RenderError(e.to_string())
    }
}

impl From<image::ImageError> for OcrPdfError {
    fn from(e: image::ImageError) -> Self {
        Self::ImageEncodeError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OcrPdfError>;

pub mod config;
pub mod engine;
pub mod error;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod render;
pub mod visualize;

pub mod corrector;
pub mod layout;
pub mod region;

/// 認識結果と、その切り出し元の領域。
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    pub polygon: Vec<[f64; 2]>,
    pub bbox: region::NormalizedBox,
}

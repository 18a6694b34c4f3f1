pub mod font;
pub mod jpeg;
pub mod merge;
pub mod optimizer;
pub mod writer;

//! Input processing module
//! Handles file detection and attachment encoding

pub mod attachment;
pub mod file_detector;

pub use attachment::read_attachment;

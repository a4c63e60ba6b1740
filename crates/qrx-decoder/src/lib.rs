#![forbid(unsafe_code)]

pub mod assembler;
pub mod encoder;
pub mod format;

// Export Logic
pub use assembler::ChunkAssembler;
pub use encoder::split_payload;
pub use format::{format_bytes, format_duration, format_speed};

//! Media access: provider contract, filesystem implementation, preview cache, scrub scheduling.

/// Byte-budgeted LRU of decoded previews.
pub mod cache;
/// `ffprobe`/`ffmpeg` subprocess helpers.
pub mod ffmpeg;
/// Provider contract and the filesystem library.
pub mod provider;
pub mod scrub;

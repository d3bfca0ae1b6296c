//! Audio retrieval and processing.
//!
//! Lecture media is fetched with yt-dlp and normalized to MP3 with ffmpeg.
//! Long recordings can be split into fixed-length chunks for upload.

mod fetcher;
mod split;

pub use fetcher::{MediaFetcher, YtDlpFetcher};
pub use split::split_audio;

// thumbpick/src/sources/mod.rs
pub mod autotuned;
pub mod configured;
pub mod dedup;
pub mod djpeg;
pub mod exiftool;
pub mod ffmpeg;
pub mod filtered;
pub mod imagemagick;
pub mod pam;
pub mod process;
pub mod thumb;

pub use autotuned::Autotuned;
pub use configured::{Configured, CostSpec};
pub use dedup::Dedup;
pub use djpeg::Djpeg;
pub use exiftool::Exiftool;
pub use ffmpeg::Ffmpeg;
pub use filtered::Filtered;
pub use imagemagick::ImageMagick;
pub use thumb::Thumb;

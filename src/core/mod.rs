// thumbpick/src/core/mod.rs
pub mod cost;
pub mod ctx;
pub mod source;

use image::DynamicImage;
use serde::Deserialize;
use thiserror::Error;

/// Opaque identifier of a logical image, used as the deduplication key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a target box resolves its aspect ratio against an original's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatioFit {
    FitInside,
    FitOutside,
    #[default]
    OriginalSize,
}

impl<'de> Deserialize<'de> for AspectRatioFit {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        // Anything unrecognized keeps the original size.
        Ok(match s.to_uppercase().as_str() {
            "INSIDE" => Self::FitInside,
            "OUTSIDE" => Self::FitOutside,
            _ => Self::OriginalSize,
        })
    }
}

/// Integer width/height pair. A zero size is a valid sentinel meaning
/// "unknown / use the target size".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_zero(self) -> bool {
        self.width == 0 && self.height == 0
    }

    /// Pixel count as i64 so large originals don't overflow.
    pub fn area(self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// Resolves this target box against `original` according to `fit`.
    /// Pure function of its inputs.
    pub fn fit(self, original: Size, fit: AspectRatioFit) -> Size {
        if fit == AspectRatioFit::OriginalSize {
            return original;
        }
        let mut tw = f64::from(self.width);
        let mut th = f64::from(self.height);
        let ar = tw / th;
        let oar = f64::from(original.width) / f64::from(original.height);
        match fit {
            AspectRatioFit::FitInside => {
                if ar < oar {
                    th = tw / oar;
                } else {
                    tw = th * oar;
                }
            }
            AspectRatioFit::FitOutside => {
                if ar > oar {
                    th = tw / oar;
                } else {
                    tw = th * oar;
                }
            }
            AspectRatioFit::OriginalSize => unreachable!(),
        }
        Size {
            width: tw.round() as u32,
            height: th.round() as u32,
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// EXIF orientation. All rotations are counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Orientation {
    Normal = 1,
    MirrorHorizontal = 2,
    Rotate180 = 3,
    MirrorVertical = 4,
    MirrorHorizontalRotate270 = 5,
    Rotate90 = 6,
    MirrorHorizontalRotate90 = 7,
    Rotate270 = 8,
    /// The caller should look the orientation up in its own catalog.
    SourceInfo = 127,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            2 => Some(Self::MirrorHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::MirrorVertical),
            5 => Some(Self::MirrorHorizontalRotate270),
            6 => Some(Self::Rotate90),
            7 => Some(Self::MirrorHorizontalRotate90),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }
}

/// A generated thumbnail with its orientation metadata.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub image: DynamicImage,
    pub orientation: Orientation,
    pub from_cache: bool,
}

impl Thumbnail {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            orientation: Orientation::Normal,
            from_cache: false,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Errors are `Clone` so the dedup layer can hand the same failure to
/// every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThumbError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("{tool} binary not found")]
    MissingBinary { tool: &'static str },

    #[error("{tool} error (exit code {code}): {stderr}")]
    ProcessFailed {
        tool: &'static str,
        code: i32,
        stderr: String,
    },

    #[error("{tool} timed out after {seconds}s")]
    ProcessTimeout { tool: &'static str, seconds: u64 },

    #[error("request cancelled")]
    Cancelled,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("malformed pixel dump: {0}")]
    Protocol(String),

    #[error("extension not supported")]
    UnsupportedExtension,

    #[error("{capability} not supported by {source_name}")]
    UnsupportedCapability {
        capability: &'static str,
        source_name: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for ThumbError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<image::ImageError> for ThumbError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThumbError>;

/// What every `Source::get` produces.
pub type GetResult = Result<Thumbnail>;

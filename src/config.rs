// thumbpick/src/config.rs
use crate::core::source::{Source, Sources};
use crate::core::{AspectRatioFit, Result, ThumbError};
use crate::sources::{
    Autotuned, Configured, CostSpec, Dedup, Djpeg, Exiftool, Ffmpeg, Filtered, ImageMagick, Thumb,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "THUMB")]
    Thumb,
    #[serde(rename = "FFMPEG")]
    Ffmpeg,
    #[serde(rename = "IMAGEMAGICK")]
    ImageMagick,
    #[serde(rename = "DJPEG")]
    Djpeg,
    #[serde(rename = "EXIFTOOL")]
    Exiftool,
}

/// One configured backend. Builds the full decorator chain:
/// backend -> Filtered (if extensions given) -> Configured -> Autotuned
/// -> Dedup.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default)]
    pub cost: CostSpec,
    /// Path template for THUMB sources.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub fit: AspectRatioFit,
    /// Fixed djpeg scale, "m/8".
    #[serde(default)]
    pub scale: Option<String>,
    /// Metadata tag for EXIFTOOL sources; defaults to ThumbnailImage.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

fn parse_scale(scale: &str) -> Result<u32> {
    let (m, n) = scale
        .split_once('/')
        .ok_or_else(|| ThumbError::InvalidConfig(format!("invalid scale format: {}", scale)))?;
    let m: u32 = m
        .parse()
        .map_err(|_| ThumbError::InvalidConfig(format!("invalid scale numerator: {}", m)))?;
    let n: u32 = n
        .parse()
        .map_err(|_| ThumbError::InvalidConfig(format!("invalid scale denominator: {}", n)))?;
    if n != 8 {
        return Err(ThumbError::InvalidConfig(format!(
            "invalid scale denominator: {}, must be 8",
            n
        )));
    }
    if m == 0 || m > 8 {
        return Err(ThumbError::InvalidConfig(format!(
            "invalid scale numerator: {}, must be 1..=8",
            m
        )));
    }
    Ok(m)
}

impl SourceConfig {
    pub fn build(&self) -> Result<Arc<dyn Source>> {
        let backend: Arc<dyn Source> = match self.kind {
            SourceKind::Thumb => {
                let template = self.path.as_deref().ok_or_else(|| {
                    ThumbError::InvalidConfig("missing path for THUMB source".to_string())
                })?;
                Arc::new(Thumb::new(
                    &self.name,
                    template,
                    self.fit,
                    self.width,
                    self.height,
                )?)
            }
            SourceKind::Ffmpeg => Arc::new(Ffmpeg::new(self.width, self.height, self.fit)),
            SourceKind::ImageMagick => {
                Arc::new(ImageMagick::new(self.width, self.height, self.fit))
            }
            SourceKind::Djpeg => {
                let scale_m = self.scale.as_deref().map(parse_scale).transpose()?;
                Arc::new(Djpeg::new(self.width, self.height, scale_m))
            }
            SourceKind::Exiftool => {
                Arc::new(Exiftool::new(self.tag.as_deref().unwrap_or("ThumbnailImage")))
            }
        };

        let filtered: Arc<dyn Source> = if self.extensions.is_empty() {
            backend
        } else {
            Arc::new(Filtered::new(backend, self.extensions.clone()))
        };

        let configured = Arc::new(Configured::new(&self.name, self.cost, filtered));
        let autotuned = Arc::new(Autotuned::new(configured));
        Ok(Arc::new(Dedup::new(autotuned)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailConfig {
    pub sources: Vec<SourceConfig>,
}

impl ThumbnailConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| ThumbError::InvalidConfig(format!("bad source config: {}", err)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Builds every configured source; any invalid entry fails the
    /// whole load before a single request runs.
    pub fn build_sources(&self) -> Result<Sources> {
        let mut sources = Sources::default();
        for config in &self.sources {
            sources.push(config.build()?);
        }
        Ok(sources)
    }
}

// thumbpick/src/sources/djpeg.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::Source;
use crate::core::{GetResult, ImageId, Orientation, Result, Size, ThumbError, Thumbnail};
use crate::sources::process::{self, PROCESS_TIMEOUT};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL: &str = "djpeg";

/// JPEG decoding through the djpeg binary, using its cheap fractional
/// DCT scaling (`m/8`) to avoid decoding full resolution.
pub struct Djpeg {
    path: Option<PathBuf>,
    width: u32,
    height: u32,
    /// Fixed scale numerator over 8; when absent the minimal
    /// sufficient scale is derived per request.
    scale_m: Option<u32>,
}

impl Djpeg {
    pub fn new(width: u32, height: u32, scale_m: Option<u32>) -> Self {
        Self {
            path: process::find_binary(TOOL),
            width,
            height,
            scale_m,
        }
    }

    pub fn with_binary(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    fn resized(&self) -> bool {
        self.width != 0 && self.height != 0
    }

    /// Smallest m/8 scale whose output still covers the target in both
    /// dimensions.
    fn minimal_scale(orig: Size, target_width: u32, target_height: u32) -> u32 {
        if orig.width <= target_width && orig.height <= target_height {
            return 8;
        }
        for m in 1..=8u32 {
            if orig.width * m / 8 >= target_width && orig.height * m / 8 >= target_height {
                return m;
            }
        }
        8
    }

    fn run(&self, ctx: &RequestCtx, binary: &Path, path: &Path, scale_m: u32) -> Result<DynamicImage> {
        let args: Vec<OsString> = vec![
            "-pnm".into(),
            "-scale".into(),
            format!("{}/8", scale_m).into(),
            path.into(),
        ];
        let output = process::run(ctx, TOOL, binary, args)?;
        let image = image::load_from_memory_with_format(&output, ImageFormat::Pnm)?;
        Ok(image)
    }

    fn downscale(&self, image: DynamicImage) -> DynamicImage {
        if image.width() <= self.width && image.height() <= self.height {
            return image;
        }
        image.resize(self.width, self.height, FilterType::Triangle)
    }
}

impl Source for Djpeg {
    fn name(&self) -> String {
        let found = if self.path.is_none() { " (N/A)" } else { "" };
        if self.resized() {
            format!("djpeg-{}x{}{}", self.width, self.height, found)
        } else {
            format!("djpeg-{}/8{}", self.scale_m.unwrap_or(8), found)
        }
    }

    fn display_name(&self) -> String {
        "djpeg".to_string()
    }

    fn ext(&self) -> &str {
        ".jpg"
    }

    fn size(&self, original: Size) -> Size {
        if self.resized() {
            return Size::new(self.width, self.height);
        }
        if let Some(m) = self.scale_m {
            return Size::new(original.width * m / 8, original.height * m / 8);
        }
        original
    }

    fn rotate(&self) -> bool {
        false
    }

    fn duration_estimate(&self, original: Size) -> Duration {
        Duration::from_nanos(30 * original.area() as u64)
    }

    fn exists(&self, _ctx: &RequestCtx, _id: ImageId, _path: &Path) -> bool {
        true
    }

    fn get(&self, ctx: &RequestCtx, _id: ImageId, path: &Path, original: Size) -> GetResult {
        let Some(binary) = &self.path else {
            return Err(ThumbError::MissingBinary { tool: TOOL });
        };

        let ctx = ctx.with_timeout(PROCESS_TIMEOUT);
        let image = match self.scale_m {
            Some(m) => self.run(&ctx, binary, path, m)?,
            None if self.resized() && !original.is_zero() => {
                let m = Self::minimal_scale(original, self.width, self.height);
                self.run(&ctx, binary, path, m)?
            }
            None if self.resized() => {
                // Original size unknown: probe at 1/8, then decode again
                // at the minimal sufficient scale if the probe fell
                // short of the target.
                let probe = self.run(&ctx, binary, path, 1)?;
                if probe.width() >= self.width && probe.height() >= self.height {
                    probe
                } else {
                    let orig = Size::new(probe.width() * 8, probe.height() * 8);
                    let m = Self::minimal_scale(orig, self.width, self.height);
                    self.run(&ctx, binary, path, m)?
                }
            }
            None => self.run(&ctx, binary, path, 8)?,
        };

        let image = if self.resized() {
            self.downscale(image)
        } else {
            image
        };

        Ok(Thumbnail::new(image).with_orientation(Orientation::SourceInfo))
    }
}

// thumbpick/src/sources/imagemagick.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::Source;
use crate::core::{AspectRatioFit, GetResult, ImageId, Size, ThumbError, Thumbnail};
use crate::sources::pam;
use crate::sources::process::{self, PROCESS_TIMEOUT};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL: &str = "magick";

/// Generates thumbnails through the ImageMagick command line tool,
/// forcing an 8-bit RGBA PAM dump on stdout.
pub struct ImageMagick {
    path: Option<PathBuf>,
    width: u32,
    height: u32,
    fit: AspectRatioFit,
}

impl ImageMagick {
    pub fn new(width: u32, height: u32, fit: AspectRatioFit) -> Self {
        Self {
            path: process::find_binary(TOOL),
            width,
            height,
            fit,
        }
    }

    pub fn with_binary(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    fn fit_label(&self) -> &'static str {
        match self.fit {
            AspectRatioFit::FitInside => "in",
            AspectRatioFit::FitOutside => "out",
            AspectRatioFit::OriginalSize => "orig",
        }
    }

    fn thumbnail_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Source for ImageMagick {
    fn name(&self) -> String {
        let found = if self.path.is_none() { " (N/A)" } else { "" };
        format!(
            "imagemagick-{}x{}-{}{}",
            self.width,
            self.height,
            self.fit_label(),
            found
        )
    }

    fn display_name(&self) -> String {
        "ImageMagick".to_string()
    }

    fn ext(&self) -> &str {
        ".jpg"
    }

    fn size(&self, original: Size) -> Size {
        Size::new(self.width, self.height).fit(original, AspectRatioFit::FitInside)
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

    fn get(&self, ctx: &RequestCtx, id: ImageId, path: &Path, _original: Size) -> GetResult {
        let Some(binary) = &self.path else {
            return Err(ThumbError::MissingBinary { tool: TOOL });
        };

        let ctx = ctx.with_timeout(PROCESS_TIMEOUT);
        let args: Vec<OsString> = vec![
            "-quiet".into(),
            path.into(),
            "-thumbnail".into(),
            self.thumbnail_size().into(),
            "-gravity".into(),
            "center".into(),
            "-depth".into(),
            "8".into(),
            "-alpha".into(),
            "on".into(),
            "pam:-".into(),
        ];

        let output = process::run(&ctx, TOOL, binary, args)?;
        let image = pam::decode_rgba(&output)?;
        log::debug!("imagemagick: {} {}x{}", id, image.width(), image.height());
        Ok(Thumbnail::new(image))
    }
}

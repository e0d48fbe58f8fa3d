// thumbpick/src/sources/ffmpeg.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::Source;
use crate::core::{AspectRatioFit, GetResult, ImageId, Size, ThumbError, Thumbnail};
use crate::sources::process::{self, PROCESS_TIMEOUT};
use crate::sources::pam;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL: &str = "ffmpeg";

/// Decodes a single frame of an image or video through the ffmpeg
/// binary, asking it for a PAM/rgba dump on stdout.
pub struct Ffmpeg {
    path: Option<PathBuf>,
    width: u32,
    height: u32,
    fit: AspectRatioFit,
}

impl Ffmpeg {
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

    fn force_original_aspect_ratio(&self) -> &'static str {
        match self.fit {
            AspectRatioFit::FitInside => "decrease",
            AspectRatioFit::FitOutside => "increase",
            AspectRatioFit::OriginalSize => "unknown",
        }
    }

    fn filter_graph(&self) -> String {
        if self.fit == AspectRatioFit::OriginalSize {
            return "null".to_string();
        }
        format!(
            "scale='min(iw,{})':'min(ih,{})':force_original_aspect_ratio={}",
            self.width,
            self.height,
            self.force_original_aspect_ratio(),
        )
    }
}

impl Source for Ffmpeg {
    fn name(&self) -> String {
        let found = if self.path.is_none() { " (N/A)" } else { "" };
        format!(
            "ffmpeg-{}x{}-{}{}",
            self.width,
            self.height,
            self.fit_label(),
            found
        )
    }

    fn display_name(&self) -> String {
        "FFmpeg".to_string()
    }

    fn ext(&self) -> &str {
        ".jpg"
    }

    fn size(&self, original: Size) -> Size {
        Size::new(self.width, self.height).fit(original, self.fit)
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

    fn get(&self, ctx: &RequestCtx, _id: ImageId, path: &Path, _original: Size) -> GetResult {
        let Some(binary) = &self.path else {
            return Err(ThumbError::MissingBinary { tool: TOOL });
        };

        let ctx = ctx.with_timeout(PROCESS_TIMEOUT);
        let args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-i".into(),
            path.into(),
            "-vframes".into(),
            "1".into(),
            "-vf".into(),
            self.filter_graph().into(),
            "-c:v".into(),
            "pam".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pix_fmt".into(),
            "rgba".into(),
            "-an".into(),
            "-".into(),
        ];

        let output = process::run(&ctx, TOOL, binary, args)?;
        let image = pam::decode_rgba(&output)?;
        Ok(Thumbnail::new(image))
    }
}

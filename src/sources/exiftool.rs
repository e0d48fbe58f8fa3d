// thumbpick/src/sources/exiftool.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::{ByteDecoder, ByteReader, ReadDecoder, Source};
use crate::core::{AspectRatioFit, GetResult, ImageId, Orientation, Result, Size, ThumbError, Thumbnail};
use crate::sources::process::{self, PROCESS_TIMEOUT};
use exif::{In, Reader, Tag};
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOOL: &str = "exiftool";
const THUMB_SIZE: Size = Size {
    width: 120,
    height: 120,
};

/// Extracts the metadata-embedded thumbnail (usually a small JPEG)
/// through the exiftool binary, without decoding the original at all.
pub struct Exiftool {
    path: Option<PathBuf>,
    tag: String,
}

impl Exiftool {
    /// `tag` names the binary metadata tag to extract, typically
    /// "ThumbnailImage".
    pub fn new(tag: &str) -> Self {
        Self {
            path: process::find_binary(TOOL),
            tag: tag.to_string(),
        }
    }

    pub fn with_binary(mut self, path: Option<PathBuf>) -> Self {
        self.path = path;
        self
    }

    /// EXIF orientation of the original file, read in-process. The
    /// embedded thumbnail is stored unrotated, so the caller needs this
    /// to display it correctly.
    fn orientation(&self, path: &Path) -> Orientation {
        let Ok(file) = File::open(path) else {
            return Orientation::Normal;
        };
        let mut reader = BufReader::new(file);
        let Ok(exif) = Reader::new().read_from_container(&mut reader) else {
            return Orientation::Normal;
        };
        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .and_then(Orientation::from_exif)
            .unwrap_or(Orientation::Normal)
    }
}

impl Source for Exiftool {
    fn name(&self) -> String {
        let found = if self.path.is_none() { " (N/A)" } else { "" };
        format!("exiftool-{}{}", self.tag, found)
    }

    fn display_name(&self) -> String {
        "Embedded thumbnail".to_string()
    }

    fn ext(&self) -> &str {
        ".jpg"
    }

    fn size(&self, original: Size) -> Size {
        THUMB_SIZE.fit(original, AspectRatioFit::FitInside)
    }

    fn rotate(&self) -> bool {
        false
    }

    fn duration_estimate(&self, _original: Size) -> Duration {
        Duration::from_millis(17)
    }

    fn exists(&self, _ctx: &RequestCtx, _id: ImageId, _path: &Path) -> bool {
        true
    }

    fn get(&self, ctx: &RequestCtx, id: ImageId, path: &Path, _original: Size) -> GetResult {
        let bytes = self.read_bytes(ctx, id, path)?;
        let image = image::load_from_memory(&bytes)?;
        Ok(Thumbnail::new(image).with_orientation(self.orientation(path)))
    }

    fn as_read_decoder(&self) -> Option<&dyn ReadDecoder> {
        Some(self)
    }
}

impl ByteReader for Exiftool {
    fn read_bytes(&self, ctx: &RequestCtx, _id: ImageId, path: &Path) -> Result<Vec<u8>> {
        let Some(binary) = &self.path else {
            return Err(ThumbError::MissingBinary { tool: TOOL });
        };

        let ctx = ctx.with_timeout(PROCESS_TIMEOUT);
        let args: Vec<OsString> = vec!["-b".into(), format!("-{}", self.tag).into(), path.into()];
        let bytes = process::run(&ctx, TOOL, binary, args)?;
        if bytes.is_empty() {
            return Err(ThumbError::Decode(format!(
                "no embedded {} in {}",
                self.tag,
                path.display()
            )));
        }
        Ok(bytes)
    }
}

impl ByteDecoder for Exiftool {
    fn decode(&self, _ctx: &RequestCtx, bytes: &[u8]) -> GetResult {
        let image = image::load_from_memory(bytes)?;
        Ok(Thumbnail::new(image))
    }
}

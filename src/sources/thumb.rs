// thumbpick/src/sources/thumb.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::Source;
use crate::core::{
    AspectRatioFit, GetResult, ImageId, Orientation, Result, Size, ThumbError, Thumbnail,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path template with `{dir}` and `{filename}` placeholders, resolved
/// against the original's path. Validated fully at construction;
/// a malformed template is unrecoverable misconfiguration.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                ThumbError::InvalidConfig(format!("unbalanced brace in path template {:?}", template))
            })?;
            let name = &after[..close];
            if name != "dir" && name != "filename" {
                return Err(ThumbError::InvalidConfig(format!(
                    "unknown placeholder {{{}}} in path template {:?}",
                    name, template
                )));
            }
            rest = &after[close + 1..];
        }
        if rest.contains('}') {
            return Err(ThumbError::InvalidConfig(format!(
                "unbalanced brace in path template {:?}",
                template
            )));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    pub fn resolve(&self, original: &Path) -> PathBuf {
        let dir = original
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = original
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathBuf::from(
            self.template
                .replace("{dir}", &dir)
                .replace("{filename}", &filename),
        )
    }

    /// Extension of the files this template produces, lowercased and
    /// including the leading dot.
    pub fn ext(&self) -> String {
        Path::new(&self.template)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }
}

/// Pregenerated on-disk thumbnails living next to (or derived from) the
/// original's path. No generation happens here, only decoding.
pub struct Thumb {
    name: String,
    template: PathTemplate,
    ext: String,
    fit: AspectRatioFit,
    width: u32,
    height: u32,
}

impl Thumb {
    pub fn new(
        name: &str,
        template: &str,
        fit: AspectRatioFit,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let template = PathTemplate::parse(template)?;
        Ok(Self {
            name: name.to_string(),
            ext: template.ext(),
            template,
            fit,
            width,
            height,
        })
    }
}

impl Source for Thumb {
    fn name(&self) -> String {
        format!("thumb-{}x{}-{}", self.width, self.height, self.name)
    }

    fn display_name(&self) -> String {
        "Pregenerated thumbnail".to_string()
    }

    fn ext(&self) -> &str {
        &self.ext
    }

    fn size(&self, original: Size) -> Size {
        Size::new(self.width, self.height).fit(original, self.fit)
    }

    fn rotate(&self) -> bool {
        true
    }

    fn duration_estimate(&self, _original: Size) -> Duration {
        Duration::from_nanos(31 * u64::from(self.width) * u64::from(self.height))
    }

    fn exists(&self, _ctx: &RequestCtx, _id: ImageId, path: &Path) -> bool {
        self.template.resolve(path).is_file()
    }

    fn get(&self, ctx: &RequestCtx, _id: ImageId, path: &Path, _original: Size) -> GetResult {
        ctx.check()?;
        let resolved = self.template.resolve(path);
        log::debug!("thumb: decoding {}", resolved.display());
        let image = image::open(&resolved)?;
        // Pregenerated files are stored already rotated.
        Ok(Thumbnail::new(image).with_orientation(Orientation::Normal))
    }
}

// thumbpick/src/sources/filtered.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::{ReadDecoder, Source};
use crate::core::{GetResult, ImageId, Result, Size, ThumbError};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Restricts a source to a set of file extensions; everything else
/// fails fast without touching the wrapped source.
pub struct Filtered {
    inner: Arc<dyn Source>,
    /// Lowercase extensions including the leading dot. Empty matches
    /// everything.
    extensions: Vec<String>,
}

impl Filtered {
    pub fn new(inner: Arc<dyn Source>, extensions: Vec<String>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|e| {
                let e = e.to_lowercase();
                if e.starts_with('.') {
                    e
                } else {
                    format!(".{}", e)
                }
            })
            .collect();
        Self { inner, extensions }
    }

    pub fn supports(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
        self.extensions.iter().any(|e| *e == ext)
    }
}

impl Source for Filtered {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn display_name(&self) -> String {
        self.inner.display_name()
    }

    fn ext(&self) -> &str {
        self.inner.ext()
    }

    fn size(&self, original: Size) -> Size {
        self.inner.size(original)
    }

    fn rotate(&self) -> bool {
        self.inner.rotate()
    }

    fn duration_estimate(&self, original: Size) -> Duration {
        self.inner.duration_estimate(original)
    }

    fn exists(&self, ctx: &RequestCtx, id: ImageId, path: &Path) -> bool {
        self.supports(path) && self.inner.exists(ctx, id, path)
    }

    fn get(&self, ctx: &RequestCtx, id: ImageId, path: &Path, original: Size) -> GetResult {
        if !self.supports(path) {
            return Err(ThumbError::UnsupportedExtension);
        }
        self.inner.get(ctx, id, path, original)
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }

    fn as_read_decoder(&self) -> Option<&dyn ReadDecoder> {
        self.inner.as_read_decoder()
    }
}

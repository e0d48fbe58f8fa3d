// thumbpick/src/core/source.rs
use crate::core::cost::{CostOptions, SourceCosts};
use crate::core::ctx::RequestCtx;
use crate::core::{GetResult, ImageId, Result, Size, Thumbnail};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A pluggable backend capable of producing a sized image for a given
/// original. Decorators implement this too, forwarding to an inner
/// source they exclusively own.
pub trait Source: Send + Sync {
    /// Stable identity, unique across a configured set; used for cost
    /// and metrics grouping.
    fn name(&self) -> String;

    /// Human-friendly name for UIs and logs.
    fn display_name(&self) -> String;

    /// File extension of the encoded form this backend produces.
    fn ext(&self) -> &str;

    /// The size this backend would actually produce for `original`.
    /// A zero size means "unconstrained / equal to the target".
    fn size(&self, original: Size) -> Size;

    /// Whether the backend applies EXIF rotation itself, so callers
    /// know not to apply it again.
    fn rotate(&self) -> bool;

    /// Cheap synchronous latency hint; must never spawn work.
    fn duration_estimate(&self, original: Size) -> Duration;

    /// Cheap existence probe; must not block on heavy work.
    fn exists(&self, ctx: &RequestCtx, id: ImageId, path: &Path) -> bool;

    /// The actual generation. May block, spawn processes, or hit a
    /// learned path.
    fn get(&self, ctx: &RequestCtx, id: ImageId, path: &Path, original: Size) -> GetResult;

    /// Releases backing resources. Default: nothing to release.
    fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Capability discovery for backends that can supply already-encoded
    /// bytes directly instead of a decoded image.
    fn as_read_decoder(&self) -> Option<&dyn ReadDecoder> {
        None
    }

    fn read_decoder(&self) -> Result<&dyn ReadDecoder> {
        self.as_read_decoder()
            .ok_or_else(|| crate::core::ThumbError::UnsupportedCapability {
                capability: "reader",
                source_name: self.name(),
            })
    }
}

/// Write-side capability for cache-like layers.
pub trait Sink {
    fn set(&self, ctx: &RequestCtx, id: ImageId, path: &Path, thumb: &Thumbnail) -> bool;
}

/// Supplies the already-encoded bytes of a thumbnail (e.g. an embedded
/// JPEG) without decoding them.
pub trait ByteReader {
    fn read_bytes(&self, ctx: &RequestCtx, id: ImageId, path: &Path) -> Result<Vec<u8>>;
}

/// Decodes raw encoded bytes into a thumbnail.
pub trait ByteDecoder {
    fn decode(&self, ctx: &RequestCtx, bytes: &[u8]) -> GetResult;
}

pub trait ReadDecoder: ByteReader + ByteDecoder {}

impl<T: ByteReader + ByteDecoder> ReadDecoder for T {}

/// A configured set of sources, ready for ranking.
#[derive(Clone, Default)]
pub struct Sources(pub Vec<Arc<dyn Source>>);

impl Sources {
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self(sources)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.0.iter()
    }

    pub fn push(&mut self, source: Arc<dyn Source>) {
        self.0.push(source);
    }

    /// Scores every source for the given original/target sizes with the
    /// default cost coefficients. The caller sorts and picks.
    pub fn estimate_cost(&self, original: Size, target: Size) -> SourceCosts {
        self.estimate_cost_with(original, target, &CostOptions::default())
    }

    pub fn estimate_cost_with(
        &self,
        original: Size,
        target: Size,
        opts: &CostOptions,
    ) -> SourceCosts {
        SourceCosts::estimate(self, original, target, opts)
    }

    pub fn close(&self) -> Result<()> {
        for source in &self.0 {
            source.close()?;
        }
        Ok(())
    }
}

// thumbpick/src/sources/configured.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::{ReadDecoder, Source};
use crate::core::{GetResult, ImageId, Result, Size};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Serde adapter for human-readable duration strings like "15ms".
mod duration_str {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// Static latency specification for a source: a fixed time plus a time
/// per original and per resized megapixel.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CostSpec {
    #[serde(with = "duration_str")]
    pub time: Duration,
    #[serde(with = "duration_str")]
    pub time_per_original_megapixel: Duration,
    #[serde(with = "duration_str")]
    pub time_per_resized_megapixel: Duration,
}

impl CostSpec {
    /// Expected latency for the given original and resized areas.
    pub fn estimate(&self, original: Size, resized: Size) -> Duration {
        let orig_mp = original.area() as f64 / 1e6;
        let resized_mp = resized.area() as f64 / 1e6;
        let secs = self.time.as_secs_f64()
            + self.time_per_original_megapixel.as_secs_f64() * orig_mp
            + self.time_per_resized_megapixel.as_secs_f64() * resized_mp;
        Duration::from_secs_f64(secs)
    }
}

/// Names a source and gives it a configured static cost, replacing the
/// backend's hardcoded latency guess. Everything else forwards to the
/// wrapped source.
pub struct Configured {
    name: String,
    cost: CostSpec,
    inner: Arc<dyn Source>,
}

impl Configured {
    pub fn new(name: &str, cost: CostSpec, inner: Arc<dyn Source>) -> Self {
        let name = if name.is_empty() {
            inner.name()
        } else {
            name.to_string()
        };
        Self { name, cost, inner }
    }

    pub fn cost(&self) -> &CostSpec {
        &self.cost
    }
}

impl Source for Configured {
    fn name(&self) -> String {
        self.name.clone()
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
        let resized = self.size(original);
        self.cost.estimate(original, resized)
    }

    fn exists(&self, ctx: &RequestCtx, id: ImageId, path: &Path) -> bool {
        self.inner.exists(ctx, id, path)
    }

    fn get(&self, ctx: &RequestCtx, id: ImageId, path: &Path, original: Size) -> GetResult {
        self.inner.get(ctx, id, path, original)
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }

    fn as_read_decoder(&self) -> Option<&dyn ReadDecoder> {
        self.inner.as_read_decoder()
    }
}

// thumbpick/src/sources/autotuned.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::{ReadDecoder, Source};
use crate::core::{GetResult, ImageId, Result, Size};
use crate::sources::configured::Configured;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

const LEARNING_RATE: f64 = 0.001;
const REGULARIZATION: f64 = 0.01;
/// Below this many observations the configured static estimate is used;
/// the model is not trusted until it has enough evidence.
const MIN_SAMPLES_FOR_PREDICTION: u64 = 6;

#[derive(Debug, Default, Clone, Copy)]
struct Parameter {
    value: f64,
    grad: f64,
}

impl Parameter {
    /// One step of online gradient descent with an L1 subgradient that
    /// shrinks the parameter toward zero regardless of magnitude.
    fn update(&mut self, error: f64, input: f64, lr: f64, lambda: f64) {
        self.grad = error * input;
        self.value += lr * (self.grad - lambda * self.value.signum());
    }
}

/// Linear latency model: intercept plus coefficients on original and
/// thumbnail megapixels. All three parameters are read and written as a
/// unit under the enclosing lock.
#[derive(Debug, Default)]
struct Model {
    c: Parameter,
    k_orig: Parameter,
    k_thumb: Parameter,
    sample_count: u64,
}

impl Model {
    fn predict_ms(&self, orig_mp: f64, thumb_mp: f64) -> f64 {
        self.c.value + self.k_orig.value * orig_mp + self.k_thumb.value * thumb_mp
    }

    fn update(&mut self, orig_mp: f64, thumb_mp: f64, observed_ms: f64) {
        self.sample_count += 1;
        let error = observed_ms - self.predict_ms(orig_mp, thumb_mp);
        self.c.update(error, 1.0, LEARNING_RATE, REGULARIZATION);
        self.k_orig.update(error, orig_mp, LEARNING_RATE, REGULARIZATION);
        self.k_thumb.update(error, thumb_mp, LEARNING_RATE, REGULARIZATION);
    }
}

fn megapixels(size: Size) -> f64 {
    size.area() as f64 / 1e6
}

/// Replaces a configured source's static duration estimate with an
/// online-learned one once enough successful generations have been
/// observed. One independent model per wrapped source; mutated on every
/// successful non-cached get, never reset or persisted.
pub struct Autotuned {
    inner: Arc<Configured>,
    model: RwLock<Model>,
}

impl Autotuned {
    pub fn new(inner: Arc<Configured>) -> Self {
        Self {
            inner,
            model: RwLock::new(Model::default()),
        }
    }

    fn predict(&self, original: Size, thumb: Size) -> Duration {
        let model = self.model.read().unwrap_or_else(PoisonError::into_inner);
        let ms = model.predict_ms(megapixels(original), megapixels(thumb));
        // The model can undershoot before it converges.
        Duration::from_secs_f64((ms / 1e3).max(0.0))
    }

    fn observe(&self, original: Size, thumb: Size, elapsed: Duration) {
        let mut model = self.model.write().unwrap_or_else(PoisonError::into_inner);
        let observed_ms = elapsed.as_secs_f64() * 1e3;
        model.update(megapixels(original), megapixels(thumb), observed_ms);
        log::trace!(
            "{}: sample {}, observed {:.2}ms, c {:.2}, k_orig {:.2}, k_thumb {:.2}",
            self.inner.name(),
            model.sample_count,
            observed_ms,
            model.c.value,
            model.k_orig.value,
            model.k_thumb.value,
        );
    }

    fn sample_count(&self) -> u64 {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sample_count
    }
}

impl Source for Autotuned {
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
        if self.sample_count() < MIN_SAMPLES_FOR_PREDICTION {
            return self.inner.duration_estimate(original);
        }
        self.predict(original, self.inner.size(original))
    }

    fn exists(&self, ctx: &RequestCtx, id: ImageId, path: &Path) -> bool {
        self.inner.exists(ctx, id, path)
    }

    fn get(&self, ctx: &RequestCtx, id: ImageId, path: &Path, original: Size) -> GetResult {
        let start = Instant::now();
        let result = self.inner.get(ctx, id, path, original);
        // Failed attempts and cache hits say nothing about true latency.
        if let Ok(thumb) = &result {
            if !thumb.from_cache {
                self.observe(original, self.inner.size(original), start.elapsed());
            }
        }
        result
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }

    fn as_read_decoder(&self) -> Option<&dyn ReadDecoder> {
        self.inner.as_read_decoder()
    }
}

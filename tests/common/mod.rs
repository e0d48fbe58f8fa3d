#![allow(dead_code)]

use image::DynamicImage;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thumbpick::{
    GetResult, ImageId, Orientation, RequestCtx, Size, Source, ThumbError, Thumbnail,
};

/// In-memory stand-in for a generator backend: fixed output size and
/// latency hint, optional per-call delay and forced failure, and a call
/// counter for dedup assertions.
pub struct TestSource {
    pub name: String,
    pub size: Size,
    pub estimate: Duration,
    pub delay: Duration,
    pub fail: Option<ThumbError>,
    pub calls: AtomicUsize,
}

impl TestSource {
    pub fn new(name: &str, size: Size) -> Self {
        Self {
            name: name.to_string(),
            size,
            estimate: Duration::from_millis(5),
            delay: Duration::ZERO,
            fail: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_estimate(mut self, estimate: Duration) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, err: ThumbError) -> Self {
        self.fail = Some(err);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Source for TestSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn display_name(&self) -> String {
        "Test source".to_string()
    }

    fn ext(&self) -> &str {
        ".jpg"
    }

    fn size(&self, _original: Size) -> Size {
        self.size
    }

    fn rotate(&self) -> bool {
        false
    }

    fn duration_estimate(&self, _original: Size) -> Duration {
        self.estimate
    }

    fn exists(&self, _ctx: &RequestCtx, _id: ImageId, _path: &Path) -> bool {
        true
    }

    fn get(&self, _ctx: &RequestCtx, id: ImageId, _path: &Path, _original: Size) -> GetResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        let width = self.size.width.max(1);
        let height = self.size.height.max(1);
        let image = DynamicImage::new_rgba8(width, height);
        // Make the pixels depend on the id so callers can tell results
        // apart.
        let mut rgba = image.to_rgba8();
        for pixel in rgba.pixels_mut() {
            pixel.0[0] = (id.0 % 256) as u8;
            pixel.0[3] = 255;
        }
        Ok(Thumbnail::new(DynamicImage::ImageRgba8(rgba))
            .with_orientation(Orientation::Normal))
    }
}

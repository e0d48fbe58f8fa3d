// thumbpick/src/sources/dedup.rs
use crate::core::ctx::RequestCtx;
use crate::core::source::{ReadDecoder, Sink, Source};
use crate::core::{GetResult, ImageId, Result, Size, ThumbError, Thumbnail};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// One-shot completion signal: the producer writes the result once and
/// wakes every waiter; waiters block without polling.
struct Pending {
    result: Mutex<Option<GetResult>>,
    done: Condvar,
}

impl Pending {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, result: GetResult) {
        let mut slot = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(result);
        drop(slot);
        self.done.notify_all();
    }

    fn wait(&self) -> GetResult {
        let mut slot = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match slot.as_ref() {
                Some(result) => return result.clone(),
                None => {
                    slot = self
                        .done
                        .wait(slot)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}

/// Guarantees at most one in-flight generation per `ImageId` within the
/// process. The first caller for an id becomes the producer; everyone
/// else blocks on its completion and observes the identical result,
/// errors included. Entries are dropped once complete, so this is pure
/// in-flight deduplication, not a result cache.
pub struct Dedup {
    inner: Arc<dyn Source>,
    pending: Mutex<HashMap<ImageId, Arc<Pending>>>,
}

impl Dedup {
    pub fn new(inner: Arc<dyn Source>) -> Self {
        Self {
            inner,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Source for Dedup {
    fn name(&self) -> String {
        format!("{} (dedup)", self.inner.name())
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
        self.inner.exists(ctx, id, path)
    }

    fn get(&self, ctx: &RequestCtx, id: ImageId, path: &Path, original: Size) -> GetResult {
        if ctx.is_cancelled() {
            return Err(ThumbError::Cancelled);
        }

        // Single check-and-insert under the map lock decides producer
        // vs. waiter; requests for other ids never contend past it.
        let (entry, is_producer) = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match pending.entry(id) {
                Entry::Occupied(occupied) => (Arc::clone(occupied.get()), false),
                Entry::Vacant(vacant) => {
                    let entry = Arc::new(Pending::new());
                    vacant.insert(Arc::clone(&entry));
                    (entry, true)
                }
            }
        };

        if !is_producer {
            log::debug!("{} waiting on in-flight generation", id);
            return entry.wait();
        }

        let result = self.inner.get(ctx, id, path, original);
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        entry.complete(result.clone());
        result
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }

    fn as_read_decoder(&self) -> Option<&dyn ReadDecoder> {
        self.inner.as_read_decoder()
    }
}

impl Sink for Dedup {
    fn set(&self, _ctx: &RequestCtx, _id: ImageId, _path: &Path, _thumb: &Thumbnail) -> bool {
        false
    }
}

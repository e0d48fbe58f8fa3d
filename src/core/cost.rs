// thumbpick/src/core/cost.rs
use crate::core::source::{Source, Sources};
use crate::core::Size;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Tunable multipliers for the static cost model. Immutable once
/// constructed. Defaults are tuned for a 0.9 max width ratio with a
/// squared duration term.
#[derive(Debug, Clone, Copy)]
pub struct CostOptions {
    /// Extra penalty when the target needs more pixels than the source
    /// can deliver, i.e. when picking this source would force upscaling.
    pub underdraw_penalty_multiplier: f64,
    pub size_cost_multiplier: f64,
    pub duration_cost_multiplier: f64,
}

impl Default for CostOptions {
    fn default() -> Self {
        Self {
            underdraw_penalty_multiplier: 59.851585,
            size_cost_multiplier: 0.000281,
            duration_cost_multiplier: 0.011857,
        }
    }
}

/// Quadratic resolution-mismatch penalty. A zero source size is treated
/// as matching the target exactly. Returns the cost and the pixel area
/// it was computed from.
pub fn size_cost(source: Size, target: Size, opts: &CostOptions) -> (f64, i64) {
    let source = if source.is_zero() { target } else { source };
    let area = source.area();
    let target_area = target.area();
    let mut diff = target_area as f64 - area as f64;
    if target_area > area {
        diff *= opts.underdraw_penalty_multiplier;
    }
    (diff * diff * opts.size_cost_multiplier, area)
}

/// Quadratic latency penalty, in microseconds squared. Super-linear on
/// purpose: a source that is a lot slower must lose to one that is only
/// a little slower.
pub fn duration_cost(dur: Duration, opts: &CostOptions) -> f64 {
    let us = dur.as_micros() as f64;
    us * us * opts.duration_cost_multiplier
}

/// A source paired with its estimated cost breakdown. Ranking only,
/// never persisted.
#[derive(Clone)]
pub struct SourceCost {
    pub source: Arc<dyn Source>,
    pub estimated_area: i64,
    pub estimated_duration: Duration,
    pub size_cost: f64,
    pub duration_cost: f64,
    pub cost: f64,
}

pub struct SourceCosts(pub Vec<SourceCost>);

impl SourceCosts {
    pub(crate) fn estimate(
        sources: &Sources,
        original: Size,
        target: Size,
        opts: &CostOptions,
    ) -> Self {
        let costs = sources
            .iter()
            .map(|source| {
                let (size_cost, area) = size_cost(source.size(original), target, opts);
                let dur = source.duration_estimate(original);
                let duration_cost = duration_cost(dur, opts);
                SourceCost {
                    source: Arc::clone(source),
                    estimated_area: area,
                    estimated_duration: dur,
                    size_cost,
                    duration_cost,
                    cost: size_cost + duration_cost,
                }
            })
            .collect();
        Self(costs)
    }

    /// Stable ascending sort by total cost; ties keep input order.
    pub fn sort(&mut self) {
        self.0
            .sort_by(|a, b| a.cost.partial_cmp(&b.cost).unwrap_or(Ordering::Equal));
    }

    /// Stable ascending sort by resolution fitness alone, for callers
    /// that only care about avoiding upscaling.
    pub fn sort_by_size(&mut self) {
        self.0.sort_by(|a, b| {
            a.size_cost
                .partial_cmp(&b.size_cost)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// The cheapest source after sorting, if any.
    pub fn best(&self) -> Option<&SourceCost> {
        self.0.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceCost> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

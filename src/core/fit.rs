//! # Adaptive Font Fit
//!
//! Picks the largest font size at which a slide's text fits inside its
//! container, leaving a safety margin on both axes.
//!
//! ```text
//! size index:  0    1    2    3  …  k  …  steps
//!              min                       max
//!              fits ─────────► fits? ──► too big
//!                     binary search for the last "fits"
//! ```
//!
//! Sizes are abstract units; a [`TextMeasurer`] decides what a size means
//! on the actual surface and reports the resulting bounding box. Measurement
//! is pure, so probing leaves nothing behind.

use serde::{Deserialize, Serialize};

/// Width and height, in surface units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Not yet laid out (either dimension zero or negative).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    fn scaled(&self, factor: f32) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    fn contains(&self, other: &Extent) -> bool {
        other.width <= self.width && other.height <= self.height
    }
}

/// Reports the bounding box of `text` rendered at `size`, wrapped to `wrap_width`.
pub trait TextMeasurer {
    fn measure(&self, text: &str, size: f32, wrap_width: f32) -> Extent;
}

/// Which sizing algorithm the presenter uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrategy {
    /// Binary search with real measurements.
    #[default]
    Measured,
    /// Character-count formula, checked with one measurement. A size that
    /// breaks the margin falls back to the measured search below it.
    Heuristic,
}

/// Search range and containment margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub min_size: f32,
    pub max_size: f32,
    /// Distance between candidate sizes.
    pub step: f32,
    /// Fraction of the container the text may occupy on each axis.
    pub margin: f32,
    /// Used when there is nothing to measure.
    pub default_size: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_size: 1.0,
            max_size: 8.0,
            step: 1.0,
            margin: 0.9,
            default_size: 1.0,
        }
    }
}

impl FitConfig {
    /// Number of steps above `min_size` within the range.
    fn steps(&self) -> u32 {
        if self.step <= 0.0 || self.max_size <= self.min_size {
            return 0;
        }
        ((self.max_size - self.min_size) / self.step).floor() as u32
    }

    fn size_at(&self, index: u32) -> f32 {
        self.min_size + index as f32 * self.step
    }
}

/// Result of one fit computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitOutcome {
    /// Largest size that fits, and how many measurements it took.
    Fitted { size: f32, probes: u32 },
    /// Even the minimum size overflows; the minimum is used anyway.
    Overflow { size: f32 },
    /// Nothing to measure (empty text).
    Unmeasured { size: f32 },
    /// Container has no size yet; try again after the next resize.
    Deferred,
}

impl FitOutcome {
    pub fn size(&self) -> Option<f32> {
        match self {
            FitOutcome::Fitted { size, .. }
            | FitOutcome::Overflow { size }
            | FitOutcome::Unmeasured { size } => Some(*size),
            FitOutcome::Deferred => None,
        }
    }
}

/// Binary-searches the largest candidate size whose measured box fits within
/// `margin × container` on both axes.
///
/// Takes at most `1 + ceil(log2(steps + 1))` measurements.
pub fn fit_font_size<M: TextMeasurer + ?Sized>(
    text: &str,
    container: Extent,
    measurer: &M,
    config: &FitConfig,
) -> FitOutcome {
    if text.trim().is_empty() {
        return FitOutcome::Unmeasured {
            size: config.default_size,
        };
    }
    if container.is_empty() {
        return FitOutcome::Deferred;
    }

    let limit = container.scaled(config.margin);
    let mut probes = 0u32;
    let mut fits = |index: u32| {
        probes += 1;
        let extent = measurer.measure(text, config.size_at(index), limit.width);
        limit.contains(&extent)
    };

    if !fits(0) {
        return FitOutcome::Overflow {
            size: config.min_size,
        };
    }

    // Invariant: `lo` fits; everything above `hi` does not.
    let (mut lo, mut hi) = (0u32, config.steps());
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    FitOutcome::Fitted {
        size: config.size_at(lo),
        probes,
    }
}

/// Tuning for the character-count heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicConfig {
    pub base_size: f32,
    /// Lines up to this many characters get `base_size`.
    pub threshold: usize,
    /// Size lost per character beyond the threshold.
    pub penalty: f32,
    pub min_size: f32,
}

impl HeuristicConfig {
    /// Derives heuristic tuning from a measured-fit range.
    pub fn from_fit(config: &FitConfig) -> Self {
        Self {
            base_size: config.max_size,
            threshold: 4,
            penalty: (config.max_size - config.min_size) / 16.0,
            min_size: config.min_size,
        }
    }
}

/// `base - penalty × (longest_line - threshold)`, clamped to `[min, base]`.
pub fn heuristic_font_size(text: &str, config: &HeuristicConfig) -> f32 {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let excess = longest.saturating_sub(config.threshold) as f32;
    (config.base_size - config.penalty * excess).clamp(config.min_size, config.base_size)
}

/// Heuristic size, kept when one measurement shows it inside the margin and
/// otherwise replaced by the measured fit capped at that size.
fn heuristic_fit<M: TextMeasurer + ?Sized>(
    text: &str,
    container: Extent,
    measurer: &M,
    config: &FitConfig,
) -> FitOutcome {
    let size = heuristic_font_size(text, &HeuristicConfig::from_fit(config));
    if text.trim().is_empty() {
        return FitOutcome::Unmeasured { size };
    }
    if container.is_empty() {
        return FitOutcome::Deferred;
    }

    let limit = container.scaled(config.margin);
    if limit.contains(&measurer.measure(text, size, limit.width)) {
        return FitOutcome::Fitted { size, probes: 1 };
    }
    let capped = FitConfig {
        max_size: size.max(config.min_size),
        ..*config
    };
    fit_font_size(text, container, measurer, &capped)
}

/// Remembers the last fit so redraws don't re-measure, and recomputes when
/// the text or the container changes.
#[derive(Debug, Clone)]
pub struct FontFitter {
    config: FitConfig,
    strategy: FitStrategy,
    cache: Option<(String, Extent)>,
    size: f32,
    overflowing: bool,
}

impl FontFitter {
    pub fn new(config: FitConfig, strategy: FitStrategy) -> Self {
        Self {
            size: config.default_size,
            config,
            strategy,
            cache: None,
            overflowing: false,
        }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    /// Last computed size.
    pub fn current_size(&self) -> f32 {
        self.size
    }

    /// Whether the last measured fit overflowed even at the minimum size.
    pub fn is_overflowing(&self) -> bool {
        self.overflowing
    }

    /// Forgets the cached fit so the next call recomputes.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Size for `text` in `container`. While the container is unsized the
    /// previous size is kept and nothing is cached.
    pub fn size_for<M: TextMeasurer + ?Sized>(
        &mut self,
        text: &str,
        container: Extent,
        measurer: &M,
    ) -> f32 {
        if let Some((cached_text, cached_container)) = &self.cache
            && cached_text == text
            && *cached_container == container
        {
            return self.size;
        }

        let outcome = match self.strategy {
            FitStrategy::Measured => fit_font_size(text, container, measurer, &self.config),
            FitStrategy::Heuristic => heuristic_fit(text, container, measurer, &self.config),
        };
        log::debug!(
            "Font fit for {} chars in {}x{}: {:?}",
            text.chars().count(),
            container.width,
            container.height,
            outcome
        );

        match outcome.size() {
            Some(size) => {
                self.size = size;
                self.overflowing = matches!(outcome, FitOutcome::Overflow { .. });
                self.cache = Some((text.to_string(), container));
            }
            None => self.cache = None,
        }
        self.size
    }
}

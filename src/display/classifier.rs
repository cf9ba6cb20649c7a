use super::handle::MessageHandle;
use super::state::HeightClass;
use tracing::debug;

/// Content taller than this (in layout pixels) gets a scroll-constrained
/// height.
pub const COMPACT_THRESHOLD_PX: u32 = 300;

/// Post-layout geometry source. Implementations report the total
/// scrollable content height of a message as it would be laid out in the
/// current viewport, or `None` when no layout is available yet.
pub trait LayoutProbe {
    fn content_height(&self, handle: &MessageHandle) -> Option<u32>;
}

/// Probe for contexts with no rendering surface: every measurement fails.
pub struct NoLayout;

impl LayoutProbe for NoLayout {
    fn content_height(&self, _handle: &MessageHandle) -> Option<u32> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeightClassifier {
    threshold: u32,
}

impl Default for HeightClassifier {
    fn default() -> Self {
        Self {
            threshold: COMPACT_THRESHOLD_PX,
        }
    }
}

impl HeightClassifier {
    pub fn with_threshold(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn class_for_height(&self, height: u32) -> HeightClass {
        if height > self.threshold {
            HeightClass::Compact
        } else {
            HeightClass::Natural
        }
    }

    /// Measure and classify, reporting measurement failure as `None`.
    pub fn measure(&self, probe: &dyn LayoutProbe, handle: &MessageHandle) -> Option<HeightClass> {
        let Some(height) = probe.content_height(handle) else {
            debug!(id = %handle.id(), "no layout available for height measurement");
            return None;
        };
        let class = self.class_for_height(height);
        debug!(id = %handle.id(), height, ?class, "measured message height");
        Some(class)
    }

    /// Best-effort classification: a failed measurement reads as natural.
    pub fn classify(&self, probe: &dyn LayoutProbe, handle: &MessageHandle) -> HeightClass {
        self.measure(probe, handle).unwrap_or(HeightClass::Natural)
    }
}

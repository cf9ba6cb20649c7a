use crate::core::prefs::{GlobalHeightPolicy, TypePreference};
use std::time::{Duration, Instant};

/// Layout state of one rendered message. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DisplayClass {
    /// Hidden; a preview line is shown instead of the body.
    Collapsed,
    /// Scroll-constrained height.
    Compact,
    /// Unconstrained height (user override or policy off).
    Expanded,
    /// Content fits without constraint.
    #[default]
    Natural,
}

impl DisplayClass {
    /// Classes the height classifier may overwrite. Collapsed and expanded
    /// come from preferences and are left alone by reclassification.
    pub fn is_classifier_owned(self) -> bool {
        matches!(self, DisplayClass::Natural | DisplayClass::Compact)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayClass::Collapsed => "collapsed",
            DisplayClass::Compact => "compact",
            DisplayClass::Expanded => "expanded",
            DisplayClass::Natural => "natural",
        }
    }
}

/// Result of a successful height measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightClass {
    Natural,
    Compact,
}

impl From<HeightClass> for DisplayClass {
    fn from(value: HeightClass) -> Self {
        match value {
            HeightClass::Natural => DisplayClass::Natural,
            HeightClass::Compact => DisplayClass::Compact,
        }
    }
}

/// Decide a message's class from its type preference and the global policy.
///
/// `measure` is only invoked on the intelligent-height branch, so hidden or
/// full-height messages are never measured. A failed measurement (`None`)
/// falls back to `Compact`, the layout that keeps the transcript scrollable.
pub fn resolve_display_class(
    pref: TypePreference,
    policy: GlobalHeightPolicy,
    measure: impl FnOnce() -> Option<HeightClass>,
) -> DisplayClass {
    if pref.hidden {
        return DisplayClass::Collapsed;
    }
    if pref.full_height || !policy.fixed_height {
        return DisplayClass::Expanded;
    }
    measure().map_or(DisplayClass::Compact, DisplayClass::from)
}

pub const MAX_HEIGHT_TRANSITION: Duration = Duration::from_millis(200);
pub const OPACITY_TRANSITION: Duration = Duration::from_millis(150);

/// Rendering hint attached when a reclassification changes the layout, so
/// the change can be eased in instead of snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub started: Instant,
    pub max_height: Duration,
    pub opacity: Duration,
}

impl Transition {
    pub fn starting_at(started: Instant) -> Self {
        Self {
            started,
            max_height: MAX_HEIGHT_TRANSITION,
            opacity: OPACITY_TRANSITION,
        }
    }

    pub fn is_fading(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) < self.opacity
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.max_height.max(self.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible() -> TypePreference {
        TypePreference::default()
    }

    fn policy(fixed_height: bool) -> GlobalHeightPolicy {
        GlobalHeightPolicy { fixed_height }
    }

    #[test]
    fn hidden_wins_without_measuring() {
        let pref = TypePreference {
            hidden: true,
            full_height: true,
        };
        let class = resolve_display_class(pref, policy(true), || {
            panic!("collapsed messages must not be measured")
        });
        assert_eq!(class, DisplayClass::Collapsed);
    }

    #[test]
    fn full_height_preference_expands() {
        let pref = TypePreference {
            hidden: false,
            full_height: true,
        };
        let class = resolve_display_class(pref, policy(true), || Some(HeightClass::Compact));
        assert_eq!(class, DisplayClass::Expanded);
    }

    #[test]
    fn disabled_policy_expands_regardless_of_height() {
        let class = resolve_display_class(visible(), policy(false), || {
            panic!("policy off never measures")
        });
        assert_eq!(class, DisplayClass::Expanded);
    }

    #[test]
    fn measured_height_decides_when_fixed() {
        assert_eq!(
            resolve_display_class(visible(), policy(true), || Some(HeightClass::Compact)),
            DisplayClass::Compact
        );
        assert_eq!(
            resolve_display_class(visible(), policy(true), || Some(HeightClass::Natural)),
            DisplayClass::Natural
        );
    }

    #[test]
    fn failed_measurement_falls_back_to_compact() {
        assert_eq!(
            resolve_display_class(visible(), policy(true), || None),
            DisplayClass::Compact
        );
    }

    #[test]
    fn transition_fades_then_finishes() {
        let start = Instant::now();
        let transition = Transition::starting_at(start);
        assert!(transition.is_fading(start + Duration::from_millis(100)));
        assert!(!transition.is_fading(start + Duration::from_millis(160)));
        assert!(!transition.is_finished(start + Duration::from_millis(160)));
        assert!(transition.is_finished(start + Duration::from_millis(200)));
    }
}

//! The hide/height/copy buttons rendered on every message.
//!
//! A button's look is a pure function of its kind, its message type, the
//! type's preference and the global height policy. Recomputing it never
//! depends on another button. The only per-button state is the short
//! confirmation flash after a successful copy.

use crate::core::message::{MessageId, MessageType};
use crate::core::prefs::{GlobalHeightPolicy, TypePreference};
use std::time::{Duration, Instant};

pub const COPY_FLASH: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Hide,
    Height,
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonIcon {
    Eye,
    EyeOff,
    Expand,
    Compress,
    Copy,
    Check,
}

impl ButtonIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            ButtonIcon::Eye => "◉",
            ButtonIcon::EyeOff => "◌",
            ButtonIcon::Expand => "⤢",
            ButtonIcon::Compress => "⤡",
            ButtonIcon::Copy => "⧉",
            ButtonIcon::Check => "✓",
        }
    }
}

/// Semantic button color; the theme maps it to a concrete style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTone {
    /// Gray: default, nothing engaged.
    Muted,
    /// Green: the preference is engaged (or a copy just succeeded).
    Engaged,
    /// Amber: expansion is available.
    Available,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonVisual {
    pub icon: ButtonIcon,
    pub tone: ButtonTone,
    pub active: bool,
    pub tooltip: String,
}

pub fn button_visual(
    kind: ControlKind,
    ty: MessageType,
    pref: TypePreference,
    policy: GlobalHeightPolicy,
) -> ButtonVisual {
    match kind {
        ControlKind::Hide if pref.hidden => ButtonVisual {
            icon: ButtonIcon::Eye,
            tone: ButtonTone::Engaged,
            active: true,
            tooltip: format!("Show all {ty} messages"),
        },
        ControlKind::Hide => ButtonVisual {
            icon: ButtonIcon::EyeOff,
            tone: ButtonTone::Muted,
            active: false,
            tooltip: format!("Hide all {ty} messages (show preview only)"),
        },
        ControlKind::Height if policy.fixed_height && !pref.full_height => ButtonVisual {
            icon: ButtonIcon::Expand,
            tone: ButtonTone::Available,
            active: false,
            tooltip: format!("Expand all {ty} messages (unlimited height)"),
        },
        ControlKind::Height => ButtonVisual {
            icon: ButtonIcon::Compress,
            tone: if pref.full_height {
                ButtonTone::Engaged
            } else {
                ButtonTone::Muted
            },
            active: pref.full_height,
            tooltip: format!("Set all {ty} messages to scroll height"),
        },
        ControlKind::Copy => ButtonVisual {
            icon: ButtonIcon::Copy,
            tone: ButtonTone::Muted,
            active: false,
            tooltip: format!("Copy {ty} message content"),
        },
    }
}

/// What a click on a control asks the synchronizer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ToggleHidden(MessageType),
    ToggleFullHeight(MessageType),
    Copy(MessageId),
}

#[derive(Debug, Clone)]
pub struct ControlButton {
    kind: ControlKind,
    ty: MessageType,
    visual: ButtonVisual,
    flash_until: Option<Instant>,
}

impl ControlButton {
    fn new(
        kind: ControlKind,
        ty: MessageType,
        pref: TypePreference,
        policy: GlobalHeightPolicy,
    ) -> Self {
        Self {
            kind,
            ty,
            visual: button_visual(kind, ty, pref, policy),
            flash_until: None,
        }
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn visual(&self) -> &ButtonVisual {
        &self.visual
    }

    pub fn refresh(&mut self, pref: TypePreference, policy: GlobalHeightPolicy) {
        self.visual = button_visual(self.kind, self.ty, pref, policy);
    }

    pub fn action(&self, message: MessageId) -> ControlAction {
        match self.kind {
            ControlKind::Hide => ControlAction::ToggleHidden(self.ty),
            ControlKind::Height => ControlAction::ToggleFullHeight(self.ty),
            ControlKind::Copy => ControlAction::Copy(message),
        }
    }

    pub(crate) fn flash(&mut self, now: Instant) {
        self.flash_until = Some(now + COPY_FLASH);
    }

    /// Icon and tone to draw at `now`, including a pending copy flash.
    pub fn displayed(&self, now: Instant) -> (ButtonIcon, ButtonTone) {
        match self.flash_until {
            Some(until) if now < until => (ButtonIcon::Check, ButtonTone::Engaged),
            _ => (self.visual.icon, self.visual.tone),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlSet {
    pub hide: ControlButton,
    pub height: ControlButton,
    pub copy: ControlButton,
}

impl ControlSet {
    pub fn new(ty: MessageType, pref: TypePreference, policy: GlobalHeightPolicy) -> Self {
        Self {
            hide: ControlButton::new(ControlKind::Hide, ty, pref, policy),
            height: ControlButton::new(ControlKind::Height, ty, pref, policy),
            copy: ControlButton::new(ControlKind::Copy, ty, pref, policy),
        }
    }

    pub fn refresh(&mut self, pref: TypePreference, policy: GlobalHeightPolicy) {
        self.hide.refresh(pref, policy);
        self.height.refresh(pref, policy);
        self.copy.refresh(pref, policy);
    }

    /// Buttons in display order.
    pub fn buttons(&self) -> [&ControlButton; 3] {
        [&self.hide, &self.height, &self.copy]
    }
}

use crate::core::message::MessageType;
use crate::display::controls::ButtonTone;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    /// Overall background color painted behind the transcript.
    pub background_color: Color,

    pub title_style: Style,
    pub status_style: Style,
    pub body_style: Style,
    /// Body style while a reclassification fades in.
    pub fading_style: Style,
    pub preview_style: Style,
    pub summary_style: Style,
    pub kv_key_style: Style,
    pub indicator_style: Style,
    pub path_style: Style,
    pub image_style: Style,
    pub selected_marker_style: Style,

    accents: TypeAccents,
}

#[derive(Debug, Clone, Copy)]
struct TypeAccents {
    user: Color,
    agent: Color,
    response: Color,
    tool: Color,
    code_exe: Color,
    browser: Color,
    info: Color,
    warning: Color,
    error: Color,
    default: Color,
}

const MUTED: &str = "#6b7280";
const ENGAGED: &str = "#10b981";
const AVAILABLE: &str = "#f59e0b";

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Reset,
            title_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
            status_style: Style::default().fg(Color::DarkGray),
            body_style: Style::default().fg(Color::White),
            fading_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::DIM),
            preview_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            summary_style: Style::default().fg(hex("#9ca3af")),
            kv_key_style: Style::default()
                .fg(hex("#93c5fd"))
                .add_modifier(Modifier::BOLD),
            indicator_style: Style::default().fg(Color::DarkGray),
            path_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
            image_style: Style::default().fg(Color::Magenta),
            selected_marker_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            accents: TypeAccents {
                user: hex("#e5e7eb"),
                agent: hex("#3b82f6"),
                response: hex("#22c55e"),
                tool: hex("#a855f7"),
                code_exe: hex("#64748b"),
                browser: hex("#06b6d4"),
                info: hex("#60a5fa"),
                warning: hex("#f97316"),
                error: hex("#ef4444"),
                default: hex("#9ca3af"),
            },
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::White,
            title_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            status_style: Style::default().fg(Color::Gray),
            body_style: Style::default().fg(Color::Black),
            fading_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::DIM),
            preview_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            summary_style: Style::default().fg(hex("#4b5563")),
            kv_key_style: Style::default()
                .fg(hex("#1d4ed8"))
                .add_modifier(Modifier::BOLD),
            indicator_style: Style::default().fg(Color::Gray),
            path_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            image_style: Style::default().fg(Color::Magenta),
            selected_marker_style: Style::default()
                .fg(hex("#b45309"))
                .add_modifier(Modifier::BOLD),
            accents: TypeAccents {
                user: hex("#374151"),
                agent: hex("#1d4ed8"),
                response: hex("#15803d"),
                tool: hex("#7e22ce"),
                code_exe: hex("#334155"),
                browser: hex("#0e7490"),
                info: hex("#2563eb"),
                warning: hex("#c2410c"),
                error: hex("#b91c1c"),
                default: hex("#4b5563"),
            },
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "dark" | "default" | "default-dark" => Self::dark_default(),
            "light" => Self::light(),
            // Fallback
            _ => Self::dark_default(),
        }
    }

    pub fn accent(&self, ty: MessageType) -> Color {
        let a = &self.accents;
        match ty {
            MessageType::User => a.user,
            MessageType::Agent => a.agent,
            MessageType::Response => a.response,
            MessageType::Tool => a.tool,
            MessageType::CodeExe => a.code_exe,
            MessageType::Browser => a.browser,
            MessageType::Info => a.info,
            MessageType::Warning => a.warning,
            MessageType::Error => a.error,
            MessageType::Default => a.default,
        }
    }

    pub fn header_style(&self, ty: MessageType) -> Style {
        Style::default()
            .fg(self.accent(ty))
            .add_modifier(Modifier::BOLD)
    }

    pub fn button_style(&self, tone: ButtonTone) -> Style {
        let color = match tone {
            ButtonTone::Muted => hex(MUTED),
            ButtonTone::Engaged => hex(ENGAGED),
            ButtonTone::Available => hex(AVAILABLE),
        };
        Style::default().fg(color)
    }
}

fn hex(s: &str) -> Color {
    parse_hex_color(s).unwrap_or(Color::Reset)
}

/// Parse `#rgb` or `#rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() == 3 {
        let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
        let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
        let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else if hex.len() == 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    } else {
        None
    }
}

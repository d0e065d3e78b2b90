//! Typed appearance descriptors.
//!
//! The current theme is a plain value handed to whatever renders output; nothing here
//! mutates global state.

use serde::Serialize;

/// An accent theme selectable in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub primary: &'static str,
    pub primary_bg: &'static str,
    pub gradient: &'static str,
}

pub const DEFAULT_THEME_ID: &str = "royal-indigo";

pub const THEMES: [Theme; 4] = [
    Theme {
        id: "royal-indigo",
        name: "Indigo",
        description: "Elegant",
        primary: "#6366f1",
        primary_bg: "#f5f3ff",
        gradient: "linear-gradient(135deg, #6366f1 0%, #4338ca 100%)",
    },
    Theme {
        id: "emerald-glass",
        name: "Emerald",
        description: "Fresh",
        primary: "#10b981",
        primary_bg: "#ecfdf5",
        gradient: "linear-gradient(135deg, #10b981 0%, #059669 100%)",
    },
    Theme {
        id: "sunset-glow",
        name: "Sunset",
        description: "Warm",
        primary: "#f59e0b",
        primary_bg: "#fffbeb",
        gradient: "linear-gradient(135deg, #f59e0b 0%, #d97706 100%)",
    },
    Theme {
        id: "crimson-rush",
        name: "Crimson",
        description: "Bold",
        primary: "#ef4444",
        primary_bg: "#fef2f2",
        gradient: "linear-gradient(135deg, #ef4444 0%, #b91c1c 100%)",
    },
];

impl Theme {
    /// Look up a theme by id.
    pub fn find(id: &str) -> Option<Theme> {
        THEMES.iter().copied().find(|t| t.id == id)
    }

    /// Resolve a stored theme id, falling back to the default for unknown or missing ids.
    pub fn resolve(id: Option<&str>) -> Theme {
        id.and_then(Theme::find).unwrap_or_default()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::find(DEFAULT_THEME_ID).unwrap_or(THEMES[0])
    }
}

/// Light or dark base palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

/// Colors for one appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub card_bg: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub text_muted: &'static str,
    pub primary: &'static str,
    pub primary_bg: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
}

impl Appearance {
    pub fn palette(self) -> Palette {
        match self {
            Appearance::Light => Palette {
                card_bg: "#ffffff",
                border: "#e2e8f0",
                text: "#1e293b",
                text_muted: "#64748b",
                primary: "#6366f1",
                primary_bg: "#f8fafc",
                success: "#10b981",
                warning: "#f59e0b",
                error: "#ef4444",
            },
            Appearance::Dark => Palette {
                card_bg: "#1e293b",
                border: "#334155",
                text: "#f1f5f9",
                text_muted: "#94a3b8",
                primary: "#6366f1",
                primary_bg: "#0f172a",
                success: "#10b981",
                warning: "#f59e0b",
                error: "#ef4444",
            },
        }
    }
}

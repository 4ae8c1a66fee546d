//! Documented editor inputs, their defaults and clamping ranges
//!
//! `inputs` entries are never required. Every consumer goes through
//! [`InputReader`], which applies the defaults listed here and clamps
//! out-of-range numbers instead of rejecting them.

use crate::model::CardState;
use crate::types::{Face, Language};

/// Input keys
pub mod keys {
    pub const NAME: &str = "name";
    pub const TAGLINE: &str = "tagline";
    pub const LOGO: &str = "logo";
    pub const PHOTO_URL: &str = "photo-url";
    pub const PHOTO_SHAPE: &str = "photo-shape";
    pub const PHOTO_BORDER_COLOR: &str = "photo-border-color";
    pub const NAME_COLOR: &str = "name-color";
    pub const NAME_FONT: &str = "name-font";
    pub const TAGLINE_COLOR: &str = "tagline-color";
    pub const TAGLINE_FONT: &str = "tagline-font";
    pub const PHONE_BG_COLOR: &str = "phone-btn-bg-color";
    pub const PHONE_TEXT_COLOR: &str = "phone-btn-text-color";
    pub const PHONE_FONT: &str = "phone-btn-font";
    pub const PHONES_AS_TEXT: &str = "phones-as-text";
    pub const SOCIAL_BG_COLOR: &str = "social-btn-bg-color";
    pub const SOCIAL_ICON_COLOR: &str = "social-btn-icon-color";
    pub const QR_SOURCE: &str = "qr-source";
    pub const QR_CUSTOM_URL: &str = "qr-custom-url";
    pub const PRIMARY_PHONE: &str = "primary-phone";
    pub const COMPANY: &str = "company";
    pub const LAYOUT: &str = "layout";

    /// Gradient start color of a face background
    pub fn bg_start(face: super::Face) -> String {
        format!("{}-bg-start", face.as_str())
    }

    /// Gradient end color of a face background
    pub fn bg_end(face: super::Face) -> String {
        format!("{}-bg-end", face.as_str())
    }
}

/// A numeric input with its default and allowed range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberSpec {
    pub key: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

impl NumberSpec {
    const fn new(key: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self { key, default, min, max }
    }
}

pub const LOGO_SIZE: NumberSpec = NumberSpec::new("logo-size", 80.0, 20.0, 300.0);
pub const LOGO_OPACITY: NumberSpec = NumberSpec::new("logo-opacity", 1.0, 0.0, 1.0);
pub const PHOTO_SIZE: NumberSpec = NumberSpec::new("photo-size", 100.0, 30.0, 300.0);
pub const PHOTO_BORDER_WIDTH: NumberSpec = NumberSpec::new("photo-border-width", 0.0, 0.0, 20.0);
pub const NAME_FONT_SIZE: NumberSpec = NumberSpec::new("name-font-size", 22.0, 8.0, 96.0);
pub const TAGLINE_FONT_SIZE: NumberSpec = NumberSpec::new("tagline-font-size", 14.0, 6.0, 72.0);
pub const FRONT_BG_OPACITY: NumberSpec = NumberSpec::new("front-bg-opacity", 1.0, 0.0, 1.0);
pub const BACK_BG_OPACITY: NumberSpec = NumberSpec::new("back-bg-opacity", 1.0, 0.0, 1.0);
pub const PHONE_FONT_SIZE: NumberSpec = NumberSpec::new("phone-btn-font-size", 12.0, 6.0, 40.0);
pub const PHONE_PADDING: NumberSpec = NumberSpec::new("phone-btn-padding", 6.0, 0.0, 30.0);
pub const SOCIAL_SIZE: NumberSpec = NumberSpec::new("social-btn-size", 28.0, 12.0, 80.0);
pub const QR_SIZE: NumberSpec = NumberSpec::new("qr-size", 130.0, 50.0, 300.0);
pub const QR_OPACITY: NumberSpec = NumberSpec::new("qr-opacity", 1.0, 0.0, 1.0);

pub const DEFAULT_FONT: &str = "'Tajawal', sans-serif";
pub const DEFAULT_NAME_COLOR: &str = "#ffffff";
pub const DEFAULT_TAGLINE_COLOR: &str = "#e6f0f7";
pub const DEFAULT_BG_START: &str = "#2a3d45";
pub const DEFAULT_BG_END: &str = "#212f37";
pub const DEFAULT_PHONE_BG: &str = "#4da6ff";
pub const DEFAULT_PHONE_TEXT: &str = "#ffffff";
pub const DEFAULT_SOCIAL_BG: &str = "#2a3d45";
pub const DEFAULT_SOCIAL_ICON: &str = "#ffffff";
pub const DEFAULT_PHOTO_BORDER: &str = "#ffffff";

/// Background opacity spec for a face
pub fn bg_opacity(face: Face) -> NumberSpec {
    match face {
        Face::Front => FRONT_BG_OPACITY,
        Face::Back => BACK_BG_OPACITY,
    }
}

/// Read-only view over `CardState::inputs` that applies documented defaults
#[derive(Debug, Clone, Copy)]
pub struct InputReader<'a> {
    state: &'a CardState,
}

impl<'a> InputReader<'a> {
    pub fn new(state: &'a CardState) -> Self {
        Self { state }
    }

    /// Trimmed, non-empty text input
    pub fn text(&self, key: &str) -> Option<String> {
        self.state
            .input(key)
            .and_then(|v| v.as_text())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Language-aware text lookup: `<key>-<lang>` first, then `<key>`
    pub fn localized(&self, key: &str) -> Option<String> {
        self.text(&localized_key(key, self.state.language))
            .or_else(|| self.text(key))
    }

    /// Number clamped to its declared range; default when absent or unparsable
    pub fn number(&self, spec: NumberSpec) -> f64 {
        self.state
            .input(spec.key)
            .and_then(|v| v.as_number())
            .map(|n| n.clamp(spec.min, spec.max))
            .unwrap_or(spec.default)
    }

    /// CSS-safe color value, default when absent or unsafe
    pub fn color(&self, key: &str, default: &str) -> String {
        self.text(key)
            .filter(|c| is_css_safe(c))
            .unwrap_or_else(|| default.to_string())
    }

    /// CSS-safe font family, default when absent or unsafe
    pub fn font(&self, key: &str) -> String {
        self.text(key)
            .filter(|f| is_css_safe(f))
            .unwrap_or_else(|| DEFAULT_FONT.to_string())
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.state
            .input(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }
}

/// Key of the language-specific variant of a text input
pub fn localized_key(key: &str, language: Language) -> String {
    format!("{}-{}", key, language.code())
}

/// Whether a value may be embedded in a `style` declaration as-is
///
/// Rejects anything that could terminate the declaration or open a url().
pub fn is_css_safe(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 128
        && !value.to_ascii_lowercase().contains("url(")
        && value.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' ' | '-' | '\'' | '"')
        })
}

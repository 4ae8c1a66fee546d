//! Text sanitization
//!
//! Two distinct rules:
//! - [`escape_markup`] runs on every render, so text is embedded as text and
//!   never as markup.
//! - [`sanitize_free_text`] runs once on the storage side, on the small set
//!   of free-text fields a fetched card may carry.

use crate::inputs::{keys, localized_key};
use crate::model::{CardState, InputValue};
use crate::types::Language;

/// Maximum stored length (in characters) of a sanitized free-text field
pub const MAX_FREE_TEXT_CHARS: usize = 512;

/// Escape characters that are significant in markup text and attribute values
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Storage-side cleanup of one free-text value: control characters and angle
/// brackets removed, surrounding whitespace trimmed, length capped.
pub fn clean_text(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() && *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .chars()
        .take(MAX_FREE_TEXT_CHARS)
        .collect()
}

/// Sanitize the free-text fields of a card in place: name and tagline (all
/// language variants), and the value of every phone, social and static
/// social item.
pub fn sanitize_free_text(state: &mut CardState) {
    let mut text_keys = Vec::new();
    for base in [keys::NAME, keys::TAGLINE] {
        text_keys.push(base.to_string());
        for language in [Language::Primary, Language::Secondary] {
            text_keys.push(localized_key(base, language));
        }
    }
    for key in text_keys {
        if let Some(InputValue::Text(value)) = state.inputs.get_mut(&key) {
            *value = clean_text(value);
        }
    }
    for phone in &mut state.dynamic_phones {
        phone.value = clean_text(&phone.value);
    }
    for social in &mut state.dynamic_social_links {
        social.value = clean_text(&social.value);
    }
    for slot in state.static_social_links.values_mut() {
        slot.value = clean_text(&slot.value);
    }
}

//! Shareable links: `<viewer-path>?id=<opaque-id>`

use crate::error::{CardError, CardResult};
use crate::types::CardId;

/// Build the shareable address of a persisted card
pub fn build_link(viewer_path: &str, id: &CardId) -> String {
    format!("{}?id={}", viewer_path, id)
}

/// Extract the card id from a shareable address.
///
/// Other query parameters and any fragment are ignored.
pub fn parse_link(link: &str) -> CardResult<CardId> {
    let without_fragment = link.split('#').next().unwrap_or_default();
    let query = without_fragment
        .split_once('?')
        .map(|(_, q)| q)
        .ok_or_else(|| CardError::InvalidLink(format!("no query in '{}'", link)))?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("id="))
        .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|id| CardId(id.to_string()))
        .ok_or_else(|| CardError::InvalidLink(format!("no valid id in '{}'", link)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_link() {
        let id = CardId("3mJr7AoUXx2".to_string());
        assert_eq!(build_link("/card.html", &id), "/card.html?id=3mJr7AoUXx2");
        assert_eq!(
            build_link("https://cards.example/view", &id),
            "https://cards.example/view?id=3mJr7AoUXx2"
        );
    }

    #[test]
    fn test_parse_link() {
        let id = parse_link("https://cards.example/card.html?lang=en&id=abc123#top").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_parse_link_rejects_missing_or_bad_id() {
        assert!(parse_link("/card.html").is_err());
        assert!(parse_link("/card.html?id=").is_err());
        assert!(parse_link("/card.html?id=<script>").is_err());
    }
}

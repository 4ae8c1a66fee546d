//! Contact-card export (vCard 3.0)
//!
//! The block is generated purely from `CardState` fields and is also the
//! payload of the `auto-contact` QR mode.

use crate::inputs::{keys, InputReader};
use crate::model::CardState;
use crate::social;
use crate::types::StaticPlatform;

/// Build the contact-card text block.
///
/// Line order is fixed: BEGIN, VERSION, N, FN, TITLE, ORG, EMAIL, URL, one
/// TEL line per distinct number, END. The `primary-phone` input comes first
/// and no dynamic phone equal to it is repeated.
pub fn contact_card(state: &CardState) -> String {
    let reader = InputReader::new(state);
    let name = reader.localized(keys::NAME).unwrap_or_default();
    let title = reader.localized(keys::TAGLINE).unwrap_or_default();
    let org = reader.text(keys::COMPANY).unwrap_or_default();
    let email = state.static_link(StaticPlatform::Email).value.trim().to_string();
    let website = state.static_link(StaticPlatform::Website).value.trim().to_string();
    let url = if website.is_empty() {
        String::new()
    } else {
        social::destination("website", &website)
    };

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};;;;", escape_value(&name)),
        format!("FN:{}", escape_value(&name)),
        format!("TITLE:{}", escape_value(&title)),
        format!("ORG:{}", escape_value(&org)),
        format!("EMAIL;TYPE=INTERNET:{}", escape_value(email.trim_start_matches("mailto:"))),
        format!("URL:{}", escape_value(&url)),
    ];
    for phone in phone_numbers(state) {
        lines.push(format!("TEL;TYPE=CELL:{}", escape_value(&phone)));
    }
    lines.push("END:VCARD".to_string());
    lines.join("\r\n")
}

/// Distinct phone numbers: primary first, then dynamic phones in order
pub fn phone_numbers(state: &CardState) -> Vec<String> {
    let primary = InputReader::new(state).text(keys::PRIMARY_PHONE);
    let mut numbers: Vec<String> = primary.iter().cloned().collect();
    for phone in &state.dynamic_phones {
        let value = phone.value.trim();
        if value.is_empty() || primary.as_deref() == Some(value) {
            continue;
        }
        numbers.push(value.to_string());
    }
    numbers
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhoneItem;

    fn card() -> CardState {
        let mut state = CardState::default();
        state.set_input("name", "Ali");
        state.set_input("tagline", "Engineer, Backend");
        state.set_input("company", "Acme");
        state.static_link_mut(StaticPlatform::Email).value = "ali@example.com".to_string();
        state.static_link_mut(StaticPlatform::Website).value = "ali.dev".to_string();
        state
    }

    #[test]
    fn test_fixed_schema() {
        let mut state = card();
        state.dynamic_phones.push(PhoneItem::new("0551234567"));
        let vcard = contact_card(&state);
        let lines: Vec<&str> = vcard.split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "BEGIN:VCARD",
                "VERSION:3.0",
                "N:Ali;;;;",
                "FN:Ali",
                "TITLE:Engineer\\, Backend",
                "ORG:Acme",
                "EMAIL;TYPE=INTERNET:ali@example.com",
                "URL:https://ali.dev",
                "TEL;TYPE=CELL:0551234567",
                "END:VCARD",
            ]
        );
    }

    #[test]
    fn test_primary_phone_not_duplicated() {
        let mut state = card();
        state.set_input("primary-phone", "0551234567");
        state.dynamic_phones.push(PhoneItem::new("0551234567"));
        state.dynamic_phones.push(PhoneItem::new("0509999999"));
        state.dynamic_phones.push(PhoneItem::new(""));
        assert_eq!(phone_numbers(&state), vec!["0551234567", "0509999999"]);
        assert_eq!(contact_card(&state).matches("TEL;").count(), 2);
    }

    #[test]
    fn test_empty_card_still_has_frame() {
        let vcard = contact_card(&CardState::default());
        assert!(vcard.starts_with("BEGIN:VCARD\r\nVERSION:3.0"));
        assert!(vcard.ends_with("END:VCARD"));
        assert!(!vcard.contains("TEL"));
    }
}

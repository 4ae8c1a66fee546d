//! Social link destinations and display text
//!
//! A stored value is either a bare handle/number/address (the platform's
//! link prefix is applied) or already a full address starting with an
//! allowed scheme (used unchanged). Any other scheme is not trusted.
//! Display text strips the scheme and a leading `www.`; that is cosmetic
//! and never touches the destination.

/// Known platform with its link prefix and icon name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub key: &'static str,
    pub prefix: &'static str,
    pub icon: &'static str,
}

const PLATFORMS: &[Platform] = &[
    Platform { key: "email", prefix: "mailto:", icon: "envelope" },
    Platform { key: "website", prefix: "https://", icon: "globe" },
    Platform { key: "whatsapp", prefix: "https://wa.me/", icon: "whatsapp" },
    Platform { key: "facebook", prefix: "https://facebook.com/", icon: "facebook" },
    Platform { key: "linkedin", prefix: "https://linkedin.com/in/", icon: "linkedin" },
    Platform { key: "instagram", prefix: "https://instagram.com/", icon: "instagram" },
    Platform { key: "x", prefix: "https://x.com/", icon: "x-twitter" },
    Platform { key: "twitter", prefix: "https://x.com/", icon: "x-twitter" },
    Platform { key: "tiktok", prefix: "https://tiktok.com/@", icon: "tiktok" },
    Platform { key: "youtube", prefix: "https://youtube.com/@", icon: "youtube" },
    Platform { key: "snapchat", prefix: "https://snapchat.com/add/", icon: "snapchat" },
    Platform { key: "telegram", prefix: "https://t.me/", icon: "telegram" },
    Platform { key: "github", prefix: "https://github.com/", icon: "github" },
];

/// Look up a platform; unknown keys get `https://` and a generic icon
pub fn platform(key: &str) -> Platform {
    PLATFORMS
        .iter()
        .copied()
        .find(|p| p.key == key)
        .unwrap_or(Platform { key: "link", prefix: "https://", icon: "link" })
}

/// Schemes a stored value may keep as-is in a link
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "sms"];

/// Leading URI scheme of a value (`scheme ":"` with `scheme` made of a letter
/// followed by letters, digits, `+`, `-` or `.`), lowercased
pub fn scheme(value: &str) -> Option<String> {
    let (candidate, _) = value.split_once(':')?;
    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    Some(candidate.to_ascii_lowercase())
}

/// Whether the value starts with one of the [`ALLOWED_SCHEMES`]
pub fn has_scheme(value: &str) -> bool {
    scheme(value).is_some_and(|s| ALLOWED_SCHEMES.contains(&s.as_str()))
}

/// Destination address for a stored value.
///
/// Values with an allowed scheme are kept (scheme lowercased). Anything
/// else, including `javascript:` and `data:` values, is treated as a bare
/// handle and gets the platform prefix, so every destination starts with an
/// allowed scheme.
pub fn destination(platform_key: &str, value: &str) -> String {
    let value = value.trim();
    if let Some(scheme) = scheme(value).filter(|s| ALLOWED_SCHEMES.contains(&s.as_str())) {
        return format!("{}{}", scheme, &value[scheme.len()..]);
    }
    let platform = platform(platform_key);
    let handle = match platform.key {
        "whatsapp" => value.chars().filter(|c| c.is_ascii_digit()).collect(),
        "website" | "link" => value.to_string(),
        _ => value.trim_start_matches('@').to_string(),
    };
    format!("{}{}", platform.prefix, handle)
}

/// Cosmetic display text: a leading allowed scheme and `www.` removed
pub fn display_text(value: &str) -> String {
    let value = value.trim();
    let without_scheme = if has_scheme(value) {
        value
            .split_once(':')
            .map(|(_, rest)| rest.trim_start_matches("//"))
            .unwrap_or(value)
    } else {
        value
    };
    let without_www = if without_scheme
        .get(..4)
        .is_some_and(|p| p.eq_ignore_ascii_case("www."))
    {
        &without_scheme[4..]
    } else {
        without_scheme
    };
    without_www.trim_end_matches('/').to_string()
}

/// `tel:` address for a phone number (spaces and dashes removed)
pub fn phone_destination(value: &str) -> String {
    let digits: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{}", digits)
}

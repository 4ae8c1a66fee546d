//! Core types for Cardsmith
//!
//! Identifiers, faces, offsets and the item keys that address every
//! positionable element of a card.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ulid::Ulid;

use crate::error::CardError;

/// Opaque identifier assigned to a card by the persistence collaborator
///
/// Short base58 string, used in shareable links (`?id=<CardId>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    /// Mint a new random id (8 random bytes, base58)
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        rand::rng().fill_bytes(&mut bytes);
        Self(bs58::encode(bytes).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identifier of a dynamic collection item
///
/// Uses ULID so ids are unique for the lifetime of a card and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Ulid);

impl ItemId {
    /// Create a new ItemId with current timestamp
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse from string representation
    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
}

impl Face {
    pub const ALL: [Face; 2] = [Face::Front, Face::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            Face::Front => "front",
            Face::Back => "back",
        }
    }

    pub fn flipped(&self) -> Face {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Face {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Face::Front),
            "back" => Ok(Face::Back),
            other => Err(CardError::Integrity(format!("unknown face '{}'", other))),
        }
    }
}

/// Active input language
///
/// Primary is Arabic (right-to-left), secondary is English (left-to-right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Primary,
    Secondary,
}

impl Language {
    /// BCP-47 code emitted on the card root
    pub fn code(&self) -> &'static str {
        match self {
            Language::Primary => "ar",
            Language::Secondary => "en",
        }
    }

    /// Text direction (`rtl` / `ltr`)
    pub fn direction(&self) -> &'static str {
        match self {
            Language::Primary => "rtl",
            Language::Secondary => "ltr",
        }
    }
}

/// Additive pixel offset relative to an item's untransformed layout position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_origin(&self) -> bool {
        *self == Self::ORIGIN
    }

    /// Shift by `step` pixels along one axis
    ///
    /// Coordinates saturate at the `i32` bounds. A move followed by the
    /// opposite move restores the offset only while the first move stays
    /// in range; a move that clamps loses the overshoot.
    pub fn shifted(&self, direction: Direction, step: i32) -> Self {
        match direction {
            Direction::Up => Self::new(self.x, self.y.saturating_sub(step)),
            Direction::Down => Self::new(self.x, self.y.saturating_add(step)),
            Direction::Left => Self::new(self.x.saturating_sub(step), self.y),
            Direction::Right => Self::new(self.x.saturating_add(step), self.y),
        }
    }

    /// CSS transform carrying this offset
    pub fn to_transform(&self) -> String {
        format!("translate({}px, {}px)", self.x, self.y)
    }
}

/// Keyboard/arrow nudge direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for Direction {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(CardError::Integrity(format!("unknown direction '{}'", other))),
        }
    }
}

/// The five singleton elements of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKey {
    Logo,
    Photo,
    Name,
    Tagline,
    Qr,
}

impl ElementKey {
    /// Paint order within a face
    pub const ALL: [ElementKey; 5] = [
        ElementKey::Logo,
        ElementKey::Photo,
        ElementKey::Name,
        ElementKey::Tagline,
        ElementKey::Qr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKey::Logo => "logo",
            ElementKey::Photo => "photo",
            ElementKey::Name => "name",
            ElementKey::Tagline => "tagline",
            ElementKey::Qr => "qr",
        }
    }
}

/// Platforms with dedicated input controls (not list items)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaticPlatform {
    Email,
    Website,
    Whatsapp,
    Facebook,
    Linkedin,
}

impl StaticPlatform {
    pub const ALL: [StaticPlatform; 5] = [
        StaticPlatform::Email,
        StaticPlatform::Website,
        StaticPlatform::Whatsapp,
        StaticPlatform::Facebook,
        StaticPlatform::Linkedin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaticPlatform::Email => "email",
            StaticPlatform::Website => "website",
            StaticPlatform::Whatsapp => "whatsapp",
            StaticPlatform::Facebook => "facebook",
            StaticPlatform::Linkedin => "linkedin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

/// Address of any positionable item
///
/// Serialized as `logo`, `phone:<ulid>`, `social:<ulid>` or `static:<platform>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    Element(ElementKey),
    Phone(ItemId),
    Social(ItemId),
    StaticSocial(StaticPlatform),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Element(key) => f.write_str(key.as_str()),
            ItemKey::Phone(id) => write!(f, "phone:{}", id),
            ItemKey::Social(id) => write!(f, "social:{}", id),
            ItemKey::StaticSocial(platform) => write!(f, "static:{}", platform.as_str()),
        }
    }
}

impl FromStr for ItemKey {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CardError::ItemNotFound(s.to_string());
        if let Some(rest) = s.strip_prefix("phone:") {
            return ItemId::from_string(rest).map(ItemKey::Phone).map_err(|_| invalid());
        }
        if let Some(rest) = s.strip_prefix("social:") {
            return ItemId::from_string(rest).map(ItemKey::Social).map_err(|_| invalid());
        }
        if let Some(rest) = s.strip_prefix("static:") {
            return StaticPlatform::parse(rest)
                .map(ItemKey::StaticSocial)
                .ok_or_else(invalid);
        }
        ElementKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .map(ItemKey::Element)
            .ok_or_else(invalid)
    }
}

impl Serialize for ItemKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_clamps_at_bounds() {
        let near = Position::new(i32::MAX - 3, 0);
        let clamped = near.shifted(Direction::Right, 10);
        assert_eq!(clamped, Position::new(i32::MAX, 0));
        assert_eq!(clamped.shifted(Direction::Left, 10), Position::new(i32::MAX - 10, 0));

        let inside = near.shifted(Direction::Right, 3);
        assert_eq!(inside.shifted(Direction::Left, 3), near);
    }

    #[test]
    fn test_card_id_is_short_base58() {
        let id = CardId::generate();
        assert!(id.as_str().len() <= 11);
        assert!(bs58::decode(id.as_str()).into_vec().is_ok());
        assert_ne!(id, CardId::generate());
    }

    #[test]
    fn test_item_ids_are_unique() {
        let a = ItemId::new();
        let b = ItemId::new();
        assert_ne!(a, b);
        assert_eq!(ItemId::from_string(&a.to_string()).unwrap(), a);
    }

    #[test]
    fn test_item_key_string_roundtrip() {
        let id = ItemId::new();
        for key in [
            ItemKey::Element(ElementKey::Tagline),
            ItemKey::Phone(id),
            ItemKey::Social(id),
            ItemKey::StaticSocial(StaticPlatform::Linkedin),
        ] {
            let parsed: ItemKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn test_item_key_rejects_garbage() {
        assert!("phone:not-a-ulid".parse::<ItemKey>().is_err());
        assert!("static:myspace".parse::<ItemKey>().is_err());
        assert!("banner".parse::<ItemKey>().is_err());
    }

    #[test]
    fn test_position_shift() {
        let p = Position::new(3, 4);
        assert_eq!(p.shifted(Direction::Right, 5), Position::new(8, 4));
        assert_eq!(p.shifted(Direction::Up, 5), Position::new(3, -1));
        assert_eq!(p.to_transform(), "translate(3px, 4px)");
    }

    #[test]
    fn test_language_direction() {
        assert_eq!(Language::Primary.direction(), "rtl");
        assert_eq!(Language::Secondary.code(), "en");
    }
}

//! Card State Model - the single unit of truth for a card
//!
//! Pure data: serializable, no behavior beyond lookups and shape validation,
//! and no references to rendered nodes. Every other component reads or
//! mutates a `CardState` value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CardError, CardResult};
use crate::types::{CardId, ElementKey, Face, ItemId, Language, Position, StaticPlatform};

/// Scalar value of an editor input
///
/// Form controls report strings, so numeric and boolean accessors also
/// accept their textual forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl InputValue {
    /// Text content; numbers are formatted, booleans have no text form
    pub fn as_text(&self) -> Option<String> {
        match self {
            InputValue::Text(s) => Some(s.clone()),
            InputValue::Number(n) => Some(format_number(*n)),
            InputValue::Bool(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            InputValue::Number(n) if n.is_finite() => Some(*n),
            InputValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InputValue::Bool(b) => Some(*b),
            InputValue::Number(n) => Some(*n != 0.0),
            InputValue::Text(s) => match s.trim() {
                "true" | "on" | "1" | "yes" => Some(true),
                "false" | "off" | "0" | "no" | "" => Some(false),
                _ => None,
            },
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Number(value)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Bool(value)
    }
}

/// Format a number without a trailing `.0` for integral values
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn default_phone_face() -> Face {
    Face::Front
}

fn default_social_face() -> Face {
    Face::Back
}

/// A phone number in the dynamic collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneItem {
    pub id: ItemId,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_phone_face")]
    pub placement: Face,
    #[serde(default)]
    pub position: Position,
}

impl PhoneItem {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            value: value.into(),
            placement: default_phone_face(),
            position: Position::ORIGIN,
        }
    }
}

/// A social link in the dynamic collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialItem {
    pub id: ItemId,
    pub platform_key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_social_face")]
    pub placement: Face,
    #[serde(default)]
    pub position: Position,
    /// Per-item overrides of the shared social button style (`bg-color`,
    /// `icon-color`, `size`)
    #[serde(default)]
    pub style_overrides: BTreeMap<String, InputValue>,
}

impl SocialItem {
    pub fn new(platform_key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            platform_key: platform_key.into(),
            value: value.into(),
            placement: default_social_face(),
            position: Position::ORIGIN,
            style_overrides: BTreeMap::new(),
        }
    }
}

/// A fixed-platform social link slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSocialLink {
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_social_face")]
    pub placement: Face,
    #[serde(default)]
    pub position: Position,
}

impl Default for StaticSocialLink {
    fn default() -> Self {
        Self {
            value: String::new(),
            placement: default_social_face(),
            position: Position::ORIGIN,
        }
    }
}

/// Image addresses attached to a card. Empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageUrls {
    pub front: String,
    pub back: String,
    pub qr_code: String,
    pub photo: String,
    /// Pre-rendered snapshot of the front face
    pub captured_front: String,
    /// Pre-rendered snapshot of the back face
    pub captured_back: String,
}

impl ImageUrls {
    /// Background image for a face
    pub fn background(&self, face: Face) -> &str {
        match face {
            Face::Front => &self.front,
            Face::Back => &self.back,
        }
    }

    /// Captured snapshot for a face
    pub fn captured(&self, face: Face) -> &str {
        match face {
            Face::Front => &self.captured_front,
            Face::Back => &self.captured_back,
        }
    }
}

/// Canonical, serializable description of a card's content and geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    #[serde(default)]
    pub language: Language,
    pub inputs: BTreeMap<String, InputValue>,
    #[serde(default)]
    pub dynamic_phones: Vec<PhoneItem>,
    #[serde(default)]
    pub dynamic_social_links: Vec<SocialItem>,
    #[serde(default)]
    pub static_social_links: BTreeMap<StaticPlatform, StaticSocialLink>,
    #[serde(default)]
    pub image_urls: ImageUrls,
    #[serde(default)]
    pub positions: BTreeMap<ElementKey, Position>,
    #[serde(default)]
    pub placements: BTreeMap<ElementKey, Face>,
    /// Id assigned by persistence; absent until the card is first saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<CardId>,
}

impl Default for CardState {
    fn default() -> Self {
        Self {
            language: Language::default(),
            inputs: BTreeMap::new(),
            dynamic_phones: Vec::new(),
            dynamic_social_links: Vec::new(),
            static_social_links: StaticPlatform::ALL
                .into_iter()
                .map(|p| (p, StaticSocialLink::default()))
                .collect(),
            image_urls: ImageUrls::default(),
            positions: BTreeMap::new(),
            placements: BTreeMap::new(),
            card_id: None,
        }
    }
}

impl CardState {
    /// Raw input value
    pub fn input(&self, key: &str) -> Option<&InputValue> {
        self.inputs.get(key)
    }

    pub fn set_input(&mut self, key: impl Into<String>, value: impl Into<InputValue>) {
        self.inputs.insert(key.into(), value.into());
    }

    /// Static social link slot, default when the slot is missing
    pub fn static_link(&self, platform: StaticPlatform) -> StaticSocialLink {
        self.static_social_links
            .get(&platform)
            .cloned()
            .unwrap_or_default()
    }

    /// Mutable static slot, created on demand
    pub fn static_link_mut(&mut self, platform: StaticPlatform) -> &mut StaticSocialLink {
        self.static_social_links.entry(platform).or_default()
    }

    pub fn phone(&self, id: ItemId) -> Option<&PhoneItem> {
        self.dynamic_phones.iter().find(|p| p.id == id)
    }

    pub fn phone_mut(&mut self, id: ItemId) -> Option<&mut PhoneItem> {
        self.dynamic_phones.iter_mut().find(|p| p.id == id)
    }

    pub fn social(&self, id: ItemId) -> Option<&SocialItem> {
        self.dynamic_social_links.iter().find(|s| s.id == id)
    }

    pub fn social_mut(&mut self, id: ItemId) -> Option<&mut SocialItem> {
        self.dynamic_social_links.iter_mut().find(|s| s.id == id)
    }

    /// Serialize to the persisted JSON document
    pub fn to_json(&self) -> CardResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a document from an external source.
    ///
    /// Rejects the whole document when it is not an object or lacks an
    /// `inputs` map; every other field falls back to its default.
    pub fn from_json(json: &str) -> CardResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| CardError::Integrity(format!("not a JSON document: {}", e)))?;
        Self::from_value(value)
    }

    /// Validate and convert an already-parsed document
    pub fn from_value(value: serde_json::Value) -> CardResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| CardError::Integrity("card state must be an object".to_string()))?;
        match object.get("inputs") {
            Some(serde_json::Value::Object(_)) => {}
            Some(_) => return Err(CardError::Integrity("`inputs` must be a map".to_string())),
            None => return Err(CardError::Integrity("missing `inputs` map".to_string())),
        }
        let mut state: CardState = serde_json::from_value(value)
            .map_err(|e| CardError::Integrity(e.to_string()))?;
        for platform in StaticPlatform::ALL {
            state.static_social_links.entry(platform).or_default();
        }
        Ok(state)
    }
}

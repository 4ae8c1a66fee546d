//! Dynamic Collection Manager - phones and social links
//!
//! Items get a ULID at creation and keep it for their whole lifetime,
//! including across undo/redo. Values for the fixed platforms (email,
//! website, whatsapp, facebook, linkedin) are not list items: adding one
//! fills the matching `staticSocialLinks` slot, and removing it only clears
//! the value.

use tracing::debug;

use crate::error::{CardError, CardResult};
use crate::model::{CardState, PhoneItem, SocialItem};
use crate::types::{ItemKey, StaticPlatform};

/// What to add
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Phone,
    /// Social link for a platform key (`instagram`, `x`, or a static one)
    Social(String),
}

/// Add/remove/reorder operations over the card's collections
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionManager;

impl CollectionManager {
    pub fn new() -> Self {
        Self
    }

    /// Add an item and return its key.
    ///
    /// Static platforms return `ItemKey::StaticSocial` and overwrite the
    /// slot's value only when `initial` is given.
    pub fn add(&self, state: &mut CardState, kind: ItemKind, initial: Option<&str>) -> ItemKey {
        let value = initial.unwrap_or_default();
        match kind {
            ItemKind::Phone => {
                let item = PhoneItem::new(value);
                let key = ItemKey::Phone(item.id);
                state.dynamic_phones.push(item);
                debug!(%key, "Added phone item");
                key
            }
            ItemKind::Social(platform_key) => {
                if let Some(platform) = StaticPlatform::parse(&platform_key) {
                    if initial.is_some() {
                        state.static_link_mut(platform).value = value.to_string();
                    }
                    return ItemKey::StaticSocial(platform);
                }
                let item = SocialItem::new(platform_key, value);
                let key = ItemKey::Social(item.id);
                state.dynamic_social_links.push(item);
                debug!(%key, "Added social item");
                key
            }
        }
    }

    /// Remove a dynamic item or clear a static slot
    pub fn remove(&self, state: &mut CardState, key: &ItemKey) -> CardResult<()> {
        match key {
            ItemKey::Phone(id) => {
                let before = state.dynamic_phones.len();
                state.dynamic_phones.retain(|p| p.id != *id);
                if state.dynamic_phones.len() == before {
                    return Err(CardError::ItemNotFound(key.to_string()));
                }
            }
            ItemKey::Social(id) => {
                let before = state.dynamic_social_links.len();
                state.dynamic_social_links.retain(|s| s.id != *id);
                if state.dynamic_social_links.len() == before {
                    return Err(CardError::ItemNotFound(key.to_string()));
                }
            }
            ItemKey::StaticSocial(platform) => {
                state.static_link_mut(*platform).value.clear();
            }
            ItemKey::Element(element) => {
                return Err(CardError::InvalidOperation(format!(
                    "{} is not a collection item",
                    element.as_str()
                )));
            }
        }
        debug!(%key, "Removed item");
        Ok(())
    }

    /// Current value of a collection item
    pub fn value(&self, state: &CardState, key: &ItemKey) -> Option<String> {
        match key {
            ItemKey::Phone(id) => state.phone(*id).map(|p| p.value.clone()),
            ItemKey::Social(id) => state.social(*id).map(|s| s.value.clone()),
            ItemKey::StaticSocial(platform) => Some(state.static_link(*platform).value),
            ItemKey::Element(_) => None,
        }
    }

    /// Replace the value of a collection item; the id is untouched
    pub fn set_value(&self, state: &mut CardState, key: &ItemKey, value: &str) -> CardResult<()> {
        let not_found = || CardError::ItemNotFound(key.to_string());
        match key {
            ItemKey::Phone(id) => state.phone_mut(*id).ok_or_else(not_found)?.value = value.to_string(),
            ItemKey::Social(id) => state.social_mut(*id).ok_or_else(not_found)?.value = value.to_string(),
            ItemKey::StaticSocial(platform) => state.static_link_mut(*platform).value = value.to_string(),
            ItemKey::Element(element) => {
                return Err(CardError::InvalidOperation(format!(
                    "{} is edited through inputs",
                    element.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Move a dynamic item to `index` within its collection (clamped to the end)
    pub fn reorder(&self, state: &mut CardState, key: &ItemKey, index: usize) -> CardResult<()> {
        let found = match key {
            ItemKey::Phone(id) => move_to(&mut state.dynamic_phones, |p| p.id == *id, index),
            ItemKey::Social(id) => move_to(&mut state.dynamic_social_links, |s| s.id == *id, index),
            _ => {
                return Err(CardError::InvalidOperation(format!(
                    "{} cannot be reordered",
                    key
                )))
            }
        };
        if found {
            Ok(())
        } else {
            Err(CardError::ItemNotFound(key.to_string()))
        }
    }
}

fn move_to<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool, index: usize) -> bool {
    let Some(from) = items.iter().position(matches) else {
        return false;
    };
    let item = items.remove(from);
    let to = index.min(items.len());
    items.insert(to, item);
    true
}

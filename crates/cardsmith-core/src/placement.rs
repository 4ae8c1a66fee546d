//! Placement Resolver - assigns every positionable item to a face
//!
//! Defaults are asymmetric and preserved for saved cards: singletons and
//! phone items land on the front, social links (static and dynamic) on the
//! back.

use crate::error::{CardError, CardResult};
use crate::model::CardState;
use crate::position::PositionStore;
use crate::types::{ElementKey, Face, ItemKey, Position, StaticPlatform};

/// Ordered item keys per face, in paint order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceLayout {
    pub front: Vec<ItemKey>,
    pub back: Vec<ItemKey>,
}

impl FaceLayout {
    pub fn items(&self, face: Face) -> &[ItemKey] {
        match face {
            Face::Front => &self.front,
            Face::Back => &self.back,
        }
    }

    fn push(&mut self, face: Face, key: ItemKey) {
        match face {
            Face::Front => self.front.push(key),
            Face::Back => self.back.push(key),
        }
    }
}

/// Resolves faces for items and applies placement changes
#[derive(Debug, Clone, Copy, Default)]
pub struct PlacementResolver;

impl PlacementResolver {
    pub fn new() -> Self {
        Self
    }

    /// Group items by face: singletons, then phones, then static social
    /// slots in platform order, then dynamic social links in insertion order.
    pub fn resolve(&self, state: &CardState) -> FaceLayout {
        let mut layout = FaceLayout::default();
        for element in ElementKey::ALL {
            layout.push(element_face(state, element), ItemKey::Element(element));
        }
        for phone in &state.dynamic_phones {
            layout.push(phone.placement, ItemKey::Phone(phone.id));
        }
        for platform in StaticPlatform::ALL {
            let face = state
                .static_social_links
                .get(&platform)
                .map(|s| s.placement)
                .unwrap_or(Face::Back);
            layout.push(face, ItemKey::StaticSocial(platform));
        }
        for social in &state.dynamic_social_links {
            layout.push(social.placement, ItemKey::Social(social.id));
        }
        layout
    }

    /// Face of a single item, `None` for a removed dynamic item
    pub fn face_of(&self, state: &CardState, key: &ItemKey) -> Option<Face> {
        match key {
            ItemKey::Element(element) => Some(element_face(state, *element)),
            ItemKey::Phone(id) => state.phone(*id).map(|p| p.placement),
            ItemKey::Social(id) => state.social(*id).map(|s| s.placement),
            ItemKey::StaticSocial(platform) => Some(state.static_link(*platform).placement),
        }
    }

    /// Move an item to `face`.
    ///
    /// A real face change zeroes the item's offset, since the base layout
    /// position differs between faces. Returns whether anything changed.
    pub fn set_placement(&self, state: &mut CardState, key: &ItemKey, face: Face) -> CardResult<bool> {
        let current = self
            .face_of(state, key)
            .ok_or_else(|| CardError::ItemNotFound(key.to_string()))?;
        if current == face {
            return Ok(false);
        }
        match key {
            ItemKey::Element(element) => {
                state.placements.insert(*element, face);
            }
            ItemKey::Phone(id) => {
                if let Some(phone) = state.phone_mut(*id) {
                    phone.placement = face;
                }
            }
            ItemKey::Social(id) => {
                if let Some(social) = state.social_mut(*id) {
                    social.placement = face;
                }
            }
            ItemKey::StaticSocial(platform) => {
                state.static_link_mut(*platform).placement = face;
            }
        }
        state.set_position(key, Position::ORIGIN)?;
        Ok(true)
    }
}

fn element_face(state: &CardState, element: ElementKey) -> Face {
    state.placements.get(&element).copied().unwrap_or(Face::Front)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PhoneItem, SocialItem};
    use crate::types::ItemId;

    #[test]
    fn test_default_state_layout() {
        let state = CardState::default();
        let layout = PlacementResolver::new().resolve(&state);
        assert_eq!(
            layout.front,
            ElementKey::ALL.map(ItemKey::Element).to_vec()
        );
        assert_eq!(
            layout.back,
            StaticPlatform::ALL.map(ItemKey::StaticSocial).to_vec()
        );
    }

    #[test]
    fn test_order_within_face() {
        let mut state = CardState::default();
        let phone = PhoneItem::new("010");
        let mut social = SocialItem::new("instagram", "me");
        social.placement = Face::Front;
        state.dynamic_social_links.push(social.clone());
        state.dynamic_phones.push(phone.clone());
        state.static_link_mut(StaticPlatform::Email).placement = Face::Front;

        let front = PlacementResolver::new().resolve(&state).front;
        let tail: Vec<ItemKey> = front[5..].to_vec();
        assert_eq!(
            tail,
            vec![
                ItemKey::Phone(phone.id),
                ItemKey::StaticSocial(StaticPlatform::Email),
                ItemKey::Social(social.id),
            ]
        );
    }

    #[test]
    fn test_face_change_zeroes_offset() {
        let mut state = CardState::default();
        let key = ItemKey::Element(ElementKey::Logo);
        state.set_position(&key, Position::new(30, 40)).unwrap();

        let resolver = PlacementResolver::new();
        assert!(resolver.set_placement(&mut state, &key, Face::Back).unwrap());
        assert_eq!(state.position(&key), Position::ORIGIN);
        assert_eq!(resolver.face_of(&state, &key), Some(Face::Back));
    }

    #[test]
    fn test_same_face_keeps_offset() {
        let mut state = CardState::default();
        let key = ItemKey::Element(ElementKey::Logo);
        state.set_position(&key, Position::new(30, 40)).unwrap();

        let changed = PlacementResolver::new()
            .set_placement(&mut state, &key, Face::Front)
            .unwrap();
        assert!(!changed);
        assert_eq!(state.position(&key), Position::new(30, 40));
    }

    #[test]
    fn test_unknown_item_is_error() {
        let mut state = CardState::default();
        let result = PlacementResolver::new().set_placement(
            &mut state,
            &ItemKey::Phone(ItemId::new()),
            Face::Back,
        );
        assert!(matches!(result, Err(CardError::ItemNotFound(_))));
    }
}

//! Position Store - per-item pixel offsets
//!
//! Offsets are additive to the item's untransformed layout position, so a
//! layout variant can move the base while hand-placed offsets stay valid.
//! The store is the single source of truth: rendered transforms are derived
//! from it and never read back.
//!
//! Singletons keep their offsets in `CardState::positions`; list items and
//! static social slots carry their own `position` field. [`PositionStore`]
//! hides that split behind one key space.

use crate::error::{CardError, CardResult};
use crate::model::CardState;
use crate::types::{Direction, ItemKey, Position};

/// Offset lookup and mutation keyed by [`ItemKey`]
pub trait PositionStore {
    /// Current offset; origin when no entry exists
    fn position(&self, key: &ItemKey) -> Position;

    /// Replace the offset of an item
    fn set_position(&mut self, key: &ItemKey, position: Position) -> CardResult<()>;

    /// Add/subtract `step` along one axis, returning the new offset
    ///
    /// Saturates at the `i32` bounds, see [`Position::shifted`].
    fn move_item(&mut self, key: &ItemKey, direction: Direction, step: i32) -> CardResult<Position> {
        let next = self.position(key).shifted(direction, step);
        self.set_position(key, next)?;
        Ok(next)
    }
}

impl PositionStore for CardState {
    fn position(&self, key: &ItemKey) -> Position {
        match key {
            ItemKey::Element(element) => self.positions.get(element).copied().unwrap_or_default(),
            ItemKey::Phone(id) => self.phone(*id).map(|p| p.position).unwrap_or_default(),
            ItemKey::Social(id) => self.social(*id).map(|s| s.position).unwrap_or_default(),
            ItemKey::StaticSocial(platform) => self
                .static_social_links
                .get(platform)
                .map(|s| s.position)
                .unwrap_or_default(),
        }
    }

    fn set_position(&mut self, key: &ItemKey, position: Position) -> CardResult<()> {
        match key {
            ItemKey::Element(element) => {
                if position.is_origin() {
                    self.positions.remove(element);
                } else {
                    self.positions.insert(*element, position);
                }
            }
            ItemKey::Phone(id) => {
                self.phone_mut(*id)
                    .ok_or_else(|| CardError::ItemNotFound(key.to_string()))?
                    .position = position;
            }
            ItemKey::Social(id) => {
                self.social_mut(*id)
                    .ok_or_else(|| CardError::ItemNotFound(key.to_string()))?
                    .position = position;
            }
            ItemKey::StaticSocial(platform) => {
                self.static_link_mut(*platform).position = position;
            }
        }
        Ok(())
    }
}

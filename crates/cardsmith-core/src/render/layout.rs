//! Layout variants: the untransformed base location of every element
//!
//! Offsets from the Position Store are applied on top of these anchors, so
//! switching variants keeps hand-placed adjustments meaningful.

use crate::inputs::{keys, InputReader};
use crate::model::CardState;
use crate::types::{ElementKey, Face};

pub const CARD_WIDTH: i32 = 350;
pub const CARD_HEIGHT: i32 = 200;

/// Named arrangement selected by the `layout` input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutVariant {
    #[default]
    Classic,
    Centered,
    Split,
}

impl LayoutVariant {
    pub fn of(state: &CardState) -> Self {
        match InputReader::new(state).text(keys::LAYOUT).as_deref() {
            Some("centered") => LayoutVariant::Centered,
            Some("split") => LayoutVariant::Split,
            _ => LayoutVariant::Classic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutVariant::Classic => "classic",
            LayoutVariant::Centered => "centered",
            LayoutVariant::Split => "split",
        }
    }
}

/// Base location of a node; `full_width` nodes span the card and center text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub left: i32,
    pub top: i32,
    pub full_width: bool,
}

const fn at(left: i32, top: i32) -> Anchor {
    Anchor { left, top, full_width: false }
}

const fn row(top: i32) -> Anchor {
    Anchor { left: 0, top, full_width: true }
}

/// Group containers for list items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Phones,
    Socials,
}

/// Anchor of a singleton element
pub fn element_anchor(variant: LayoutVariant, face: Face, element: ElementKey) -> Anchor {
    use ElementKey::*;
    match (variant, face) {
        (LayoutVariant::Classic, Face::Front) => match element {
            Logo => at(20, 20),
            Photo => at(240, 20),
            Name => at(20, 105),
            Tagline => at(20, 135),
            Qr => at(235, 80),
        },
        (LayoutVariant::Split, Face::Front) => match element {
            Logo => at(25, 60),
            Photo => at(25, 50),
            Name => at(175, 60),
            Tagline => at(175, 90),
            Qr => at(255, 110),
        },
        // Back face and the centered variant stack everything on the axis
        (LayoutVariant::Centered, _) | (_, Face::Back) => match element {
            Logo => at(135, 15),
            Photo => at(125, 15),
            Name => row(105),
            Tagline => row(135),
            Qr => at(125, 40),
        },
    }
}

/// Anchor of a list group
pub fn group_anchor(variant: LayoutVariant, face: Face, group: GroupKey) -> Anchor {
    match (variant, face, group) {
        (LayoutVariant::Split, Face::Front, _) => at(175, 150),
        (LayoutVariant::Classic, Face::Front, GroupKey::Phones) => at(20, 160),
        (LayoutVariant::Classic, Face::Front, GroupKey::Socials) => at(20, 165),
        (_, _, GroupKey::Phones) => row(160),
        (_, _, GroupKey::Socials) => row(165),
    }
}

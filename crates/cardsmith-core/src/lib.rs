//! Cardsmith Core Library
//!
//! Two-sided business card model, placement and dual-target rendering.
//!
//! ## Overview
//!
//! A card is a single serializable [`CardState`]: text inputs, phone and
//! social link collections, image addresses, per-item offsets and the face
//! each item sits on. Everything else is derived from it:
//!
//! - **Placement**: which face (front/back) every item renders on
//! - **Positions**: additive pixel offsets on top of the layout variant
//! - **Rendering**: one tree builder, two adapters (static markup for the
//!   viewer, a keyed live tree for the editor)
//! - **QR**: custom/uploaded image or a generated code carrying the contact
//!   card or the card's shareable link
//!
//! ## Quick Start
//!
//! ```
//! use cardsmith_core::{CardEditor, EditorConfig, ItemKind, Face};
//!
//! let mut editor = CardEditor::from_config(EditorConfig::default());
//! editor.set_input("name", "Ali");
//! let phone = editor.add_item(ItemKind::Phone, Some("0551234567"));
//! editor.set_placement(&phone, Face::Back).unwrap();
//! editor.commit();
//!
//! let html = editor.static_markup();
//! assert!(html.contains("Ali"));
//! ```

pub mod autosave;
pub mod collections;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod inputs;
pub mod model;
pub mod placement;
pub mod position;
pub mod qr;
pub mod recovery;
pub mod render;
pub mod sanitize;
pub mod share;
pub mod social;
pub mod storage;
pub mod types;
pub mod upload;
pub mod vcard;

// Re-exports
pub use autosave::{AutoSaver, SaveNotice};
pub use collections::{CollectionManager, ItemKind};
pub use config::EditorConfig;
pub use editor::CardEditor;
pub use error::{CardError, CardResult};
pub use history::History;
pub use model::{CardState, ImageUrls, InputValue, PhoneItem, SocialItem, StaticSocialLink};
pub use placement::{FaceLayout, PlacementResolver};
pub use position::PositionStore;
pub use qr::{QrResolver, QrSource, ResolvedQr};
pub use recovery::RecoveryFile;
pub use render::{
    AssumeLoaded, ImageProbe, ImageStatus, LiveTree, LocalFileProbe, Mutation, RenderEngine,
    RenderNode, SettledTree, StaticMarkup, Target,
};
pub use storage::{CardStore, MemoryStore, Storage};
pub use types::*;
pub use upload::{ImageSlot, ImageUploader, InlineUploader};

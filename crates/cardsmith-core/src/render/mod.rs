//! Render Engine
//!
//! One builder turns a [`CardState`] into an abstract [`RenderNode`] tree;
//! two thin adapters consume it:
//!
//! - [`StaticMarkup`]: HTML fragment for the viewer and export
//! - [`LiveTree`]: keyed arena updated through [`Mutation`]s for the editor
//!
//! The builder is parameterized by [`Target`] only. Anything that differs
//! between the two views has to be expressed there, which keeps the two
//! outputs from drifting apart.

mod builder;
pub mod layout;
pub mod live;
pub mod markup;
pub mod node;
pub mod settle;

pub use layout::LayoutVariant;
pub use live::{LiveTree, Mutation};
pub use markup::StaticMarkup;
pub use node::{Affordance, NodeContent, NodeKind, RenderNode};
pub use settle::{settle, AssumeLoaded, ImageProbe, ImageStatus, LocalFileProbe, SettledTree};

use tokio_util::sync::CancellationToken;

use crate::error::CardResult;
use crate::model::CardState;
use crate::placement::PlacementResolver;
use crate::qr::QrResolver;
use crate::types::Face;
use builder::TreeBuilder;

/// Which view a tree is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Editor view: drag affordances and back-references on every item
    Interactive,
    /// Viewer/export: no editing metadata, captured faces used when present
    Static,
}

/// Builds trees with injected collaborators
#[derive(Debug, Clone)]
pub struct RenderEngine {
    placement: PlacementResolver,
    qr: QrResolver,
}

impl RenderEngine {
    pub fn new(placement: PlacementResolver, qr: QrResolver) -> Self {
        Self { placement, qr }
    }

    pub fn qr(&self) -> &QrResolver {
        &self.qr
    }

    /// Tree of the whole card (both faces)
    pub fn build(&self, state: &CardState, target: Target) -> RenderNode {
        let layout = self.placement.resolve(state);
        TreeBuilder::new(state, &layout, &self.qr, target).card()
    }

    /// Tree of a single face
    pub fn build_face(&self, state: &CardState, face: Face, target: Target) -> RenderNode {
        let layout = self.placement.resolve(state);
        TreeBuilder::new(state, &layout, &self.qr, target).face(face)
    }

    /// Static HTML of the whole card
    pub fn static_markup(&self, state: &CardState) -> String {
        StaticMarkup::new().serialize(&self.build(state, Target::Static))
    }

    /// Static HTML after every image has been probed
    pub async fn settled_markup<P: ImageProbe>(
        &self,
        state: &CardState,
        probe: &P,
        cancel: &CancellationToken,
    ) -> CardResult<String> {
        let settled = settle(self.build(state, Target::Static), probe, cancel).await?;
        Ok(StaticMarkup::new().serialize(&settled.tree))
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new(PlacementResolver::new(), QrResolver::new("/card.html", 256))
    }
}

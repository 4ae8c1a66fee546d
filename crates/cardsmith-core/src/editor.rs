//! Editor session
//!
//! [`CardEditor`] owns one card being edited: its state, undo history, the
//! live view and the cancellation scope of async work bound to that state.
//! Collaborators are injected at construction, so any number of editors
//! (an edit session next to a preview, say) can coexist.
//!
//! Edits mutate the state immediately; [`CardEditor::commit`] marks the end
//! of an edit transaction and is the only point where history, autosave and
//! the recovery file observe the state.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::autosave::AutoSaver;
use crate::collections::{CollectionManager, ItemKind};
use crate::config::EditorConfig;
use crate::error::{CardError, CardResult};
use crate::history::History;
use crate::model::{CardState, InputValue};
use crate::placement::PlacementResolver;
use crate::position::PositionStore;
use crate::qr::{select_source, QrResolver, QrSource};
use crate::recovery::RecoveryFile;
use crate::render::{settle, ImageProbe, LiveTree, Mutation, RenderEngine, SettledTree, Target};
use crate::storage::CardStore;
use crate::types::{CardId, Direction, Face, ItemKey, Language, Position};
use crate::upload::{ImageSlot, ImageUploader};
use crate::vcard::contact_card;

/// An active pointer drag
#[derive(Debug, Clone, Copy)]
struct DragSession {
    key: ItemKey,
    origin: Position,
    pointer: Position,
}

/// Editing session over one card
pub struct CardEditor {
    state: CardState,
    history: History,
    placement: PlacementResolver,
    collections: CollectionManager,
    engine: RenderEngine,
    live: LiveTree,
    drag: Option<DragSession>,
    config: EditorConfig,
    cancel: CancellationToken,
    autosave: Option<AutoSaver>,
    recovery: Option<RecoveryFile>,
    store: Option<Arc<dyn CardStore>>,
}

impl CardEditor {
    pub fn new(config: EditorConfig, placement: PlacementResolver, qr: QrResolver) -> Self {
        let state = CardState::default();
        Self {
            history: History::new(state.clone(), config.history_capacity),
            state,
            placement,
            collections: CollectionManager::new(),
            engine: RenderEngine::new(placement, qr),
            live: LiveTree::new(),
            drag: None,
            config,
            cancel: CancellationToken::new(),
            autosave: None,
            recovery: None,
            store: None,
        }
    }

    /// Editor wired from configuration alone
    pub fn from_config(config: EditorConfig) -> Self {
        let qr = config.qr_resolver();
        Self::new(config, PlacementResolver::new(), qr)
    }

    /// Report committed states to a background saver
    pub fn with_autosave(mut self, saver: AutoSaver) -> Self {
        self.autosave = Some(saver);
        self
    }

    /// Mirror committed states into a recovery file
    pub fn with_recovery(mut self, recovery: RecoveryFile) -> Self {
        self.recovery = Some(recovery);
        self
    }

    /// Persist through `store` whenever a feature needs a card id
    pub fn with_store(mut self, store: Arc<dyn CardStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> &CardState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn autosave(&self) -> Option<&AutoSaver> {
        self.autosave.as_ref()
    }

    /// Token cancelled when the active card changes
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    // ----- edits -----

    pub fn set_input(&mut self, key: impl Into<String>, value: impl Into<InputValue>) {
        self.state.set_input(key, value);
    }

    pub fn set_language(&mut self, language: Language) {
        self.state.language = language;
    }

    pub fn add_item(&mut self, kind: ItemKind, initial: Option<&str>) -> ItemKey {
        self.collections.add(&mut self.state, kind, initial)
    }

    pub fn remove_item(&mut self, key: &ItemKey) -> CardResult<()> {
        if self.drag.is_some_and(|d| d.key == *key) {
            self.drag = None;
        }
        self.collections.remove(&mut self.state, key)
    }

    pub fn set_item_value(&mut self, key: &ItemKey, value: &str) -> CardResult<()> {
        self.collections.set_value(&mut self.state, key, value)
    }

    pub fn reorder_item(&mut self, key: &ItemKey, index: usize) -> CardResult<()> {
        self.collections.reorder(&mut self.state, key, index)
    }

    /// Move an item to a face; returns whether the face changed
    pub fn set_placement(&mut self, key: &ItemKey, face: Face) -> CardResult<bool> {
        self.placement.set_placement(&mut self.state, key, face)
    }

    pub fn face_of(&self, key: &ItemKey) -> Option<Face> {
        self.placement.face_of(&self.state, key)
    }

    pub fn position(&self, key: &ItemKey) -> Position {
        self.state.position(key)
    }

    pub fn set_position(&mut self, key: &ItemKey, position: Position) -> CardResult<()> {
        self.state.set_position(key, position)
    }

    pub fn move_item(&mut self, key: &ItemKey, direction: Direction, step: i32) -> CardResult<Position> {
        self.state.move_item(key, direction, step)
    }

    /// Keyboard nudge by the configured step
    pub fn nudge(&mut self, key: &ItemKey, direction: Direction) -> CardResult<Position> {
        self.move_item(key, direction, self.config.nudge_step)
    }

    /// Select the QR source, replacing the previous one.
    ///
    /// Selecting `auto-link` persists the card through the attached store
    /// so the code can be generated right away. Without a store, or when
    /// saving fails, the QR renders as a placeholder until
    /// [`CardEditor::select_auto_link`] or [`CardEditor::ensure_share_link`]
    /// succeeds.
    pub fn set_qr_source(&mut self, source: QrSource, address: Option<&str>) {
        select_source(&mut self.state, source, address);
        if source != QrSource::AutoLink {
            return;
        }
        if let Some(store) = self.store.clone() {
            if let Err(e) = self.ensure_share_link(store.as_ref()) {
                warn!(error = %e, "Failed to persist card for its shareable link");
            }
        }
    }

    /// Select `auto-link` and persist through `store`, returning the link
    pub fn select_auto_link(&mut self, store: &dyn CardStore) -> CardResult<String> {
        select_source(&mut self.state, QrSource::AutoLink, None);
        self.ensure_share_link(store)
    }

    /// Store an image address as if the user had typed it
    pub fn set_image(&mut self, slot: ImageSlot, address: &str) {
        slot.apply(&mut self.state, address);
    }

    /// Upload bytes and store the returned address.
    ///
    /// On failure the state is left untouched.
    pub async fn upload_image<U: ImageUploader>(
        &mut self,
        uploader: &U,
        slot: ImageSlot,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> CardResult<String> {
        match uploader.upload(file_name, bytes).await {
            Ok(address) => {
                self.set_image(slot, &address);
                Ok(address)
            }
            Err(e) => {
                warn!(error = %e, file_name, "Image upload failed");
                Err(e)
            }
        }
    }

    // ----- drag -----

    /// Start dragging `key` with the pointer at `pointer`
    pub fn begin_drag(&mut self, key: &ItemKey, pointer: Position) -> CardResult<()> {
        if let Some(active) = &self.drag {
            return Err(CardError::DragInProgress(active.key.to_string()));
        }
        if self.face_of(key).is_none() {
            return Err(CardError::ItemNotFound(key.to_string()));
        }
        self.drag = Some(DragSession {
            key: *key,
            origin: self.state.position(key),
            pointer,
        });
        debug!(%key, "Drag started");
        Ok(())
    }

    /// Follow the pointer; the offset moves by the pointer delta
    pub fn drag_to(&mut self, pointer: Position) -> CardResult<Position> {
        let session = self.drag.ok_or(CardError::NoActiveDrag)?;
        let next = Position::new(
            session.origin.x.saturating_add(pointer.x.saturating_sub(session.pointer.x)),
            session.origin.y.saturating_add(pointer.y.saturating_sub(session.pointer.y)),
        );
        self.state.set_position(&session.key, next)?;
        Ok(next)
    }

    /// Finish the drag and commit it as one edit
    pub fn end_drag(&mut self) -> CardResult<Position> {
        let session = self.drag.take().ok_or(CardError::NoActiveDrag)?;
        let position = self.state.position(&session.key);
        debug!(key = %session.key, ?position, "Drag ended");
        self.commit();
        Ok(position)
    }

    /// Abort the drag and restore the offset it started from
    pub fn cancel_drag(&mut self) -> CardResult<()> {
        let session = self.drag.take().ok_or(CardError::NoActiveDrag)?;
        self.state.set_position(&session.key, session.origin)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ----- transactions -----

    /// End an edit transaction. Returns whether a new snapshot was recorded.
    pub fn commit(&mut self) -> bool {
        if !self.history.push(self.state.clone()) {
            return false;
        }
        debug!(snapshots = self.history.len(), "Committed edit");
        if let Some(saver) = &self.autosave {
            saver.submit(self.state.clone());
        }
        if let Some(recovery) = &self.recovery {
            if let Err(e) = recovery.write(&self.state) {
                warn!(error = %e, "Failed to write recovery file");
            }
        }
        true
    }

    /// Return to the previous committed state.
    ///
    /// Uncommitted edits are discarded first; only when there are none does
    /// the history cursor move.
    pub fn undo(&mut self) -> bool {
        self.drag = None;
        if self.state != *self.history.current() {
            self.state = self.history.current().clone();
            return true;
        }
        match self.history.undo() {
            Some(previous) => {
                self.state = previous.clone();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.drag = None;
        match self.history.redo() {
            Some(next) => {
                self.state = next.clone();
                true
            }
            None => false,
        }
    }

    /// Replace the active card.
    ///
    /// Cancels async work bound to the previous card, resets history and
    /// clears the live view so the next render starts from scratch.
    pub fn load(&mut self, state: CardState) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.drag = None;
        self.history.reset(state.clone());
        self.live.clear();
        if let Some(saver) = &self.autosave {
            saver.reset();
        }
        info!(card_id = ?state.card_id, "Loaded card");
        self.state = state;
    }

    // ----- persistence -----

    /// Save through `store` and remember the id on every snapshot
    pub fn save(&mut self, store: &dyn CardStore) -> CardResult<CardId> {
        let id = store.save(&self.state)?;
        self.assign_card_id(&id);
        info!(%id, "Saved card");
        Ok(id)
    }

    /// Shareable link, persisting the card first when it has no id yet
    pub fn ensure_share_link(&mut self, store: &dyn CardStore) -> CardResult<String> {
        let link = self.engine.qr().ensure_link(&mut self.state, store)?;
        if let Some(id) = self.state.card_id.clone() {
            self.history.stamp_card_id(&id);
        }
        Ok(link)
    }

    /// Adopt an id assigned elsewhere (for example by autosave)
    pub fn assign_card_id(&mut self, id: &CardId) {
        self.state.card_id = Some(id.clone());
        self.history.stamp_card_id(id);
    }

    // ----- output -----

    /// Update the live view and return the applied mutations
    pub fn render(&mut self) -> Vec<Mutation> {
        let tree = self.engine.build(&self.state, Target::Interactive);
        self.live.reconcile(&tree)
    }

    pub fn live(&self) -> &LiveTree {
        &self.live
    }

    pub fn static_markup(&self) -> String {
        self.engine.static_markup(&self.state)
    }

    pub fn contact_card(&self) -> String {
        contact_card(&self.state)
    }

    /// Probe every image of the static view.
    ///
    /// The returned future owns its inputs and can be spawned; it resolves
    /// to [`CardError::Cancelled`] once [`CardEditor::load`] switches cards.
    pub fn settle<P: ImageProbe + 'static>(
        &self,
        probe: P,
    ) -> impl Future<Output = CardResult<SettledTree>> + Send + 'static {
        let tree = self.engine.build(&self.state, Target::Static);
        let cancel = self.cancel.clone();
        async move { settle(tree, &probe, &cancel).await }
    }
}

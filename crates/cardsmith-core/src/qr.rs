//! QR Source Resolver
//!
//! Four sources, switched by the `qr-source` input (replace-on-select):
//!
//! - `custom`: a user-entered image address (`qr-custom-url`)
//! - `upload`: a previously uploaded image (`imageUrls.qrCode`)
//! - `auto-contact`: a generated code carrying the contact card
//! - `auto-link`: a generated code carrying the card's shareable link; the
//!   card must be persisted first, see [`QrResolver::ensure_link`]
//!
//! Auto payloads are derived from the state on every resolve, so a changed
//! name or phone can never leave a stale code behind. Generated images are
//! memoized by payload.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use parking_lot::Mutex;
use qrcode::render::svg;
use qrcode::QrCode;
use tracing::{debug, info};

use crate::error::{CardError, CardResult};
use crate::inputs::{keys, InputReader};
use crate::model::CardState;
use crate::share::build_link;
use crate::storage::CardStore;
use crate::vcard::contact_card;

/// Memoized generated images kept per resolver
const CACHE_LIMIT: usize = 32;

/// Selected QR source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QrSource {
    #[default]
    Custom,
    Upload,
    AutoContact,
    AutoLink,
}

impl QrSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrSource::Custom => "custom",
            QrSource::Upload => "upload",
            QrSource::AutoContact => "auto-contact",
            QrSource::AutoLink => "auto-link",
        }
    }

    /// Source selected in a state (`custom` when absent or unknown)
    pub fn of(state: &CardState) -> Self {
        InputReader::new(state)
            .text(keys::QR_SOURCE)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for QrSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrSource {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "custom" => Ok(QrSource::Custom),
            "upload" => Ok(QrSource::Upload),
            "auto-contact" | "auto-vcard" => Ok(QrSource::AutoContact),
            "auto-link" | "auto-card" => Ok(QrSource::AutoLink),
            other => Err(CardError::InvalidOperation(format!("unknown QR source '{}'", other))),
        }
    }
}

/// Outcome of resolving the QR element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedQr {
    /// Nothing to show (no address entered / uploaded)
    Absent,
    /// Auto-link selected on a card that has not been persisted yet
    AwaitingPersistence,
    /// Image address used as-is
    Image { src: String },
    /// Generated code image for `payload`
    Generated { payload: String, src: String },
}

/// Generated images keyed by payload, least recently used evicted first
#[derive(Debug, Default)]
struct QrCache {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

impl QrCache {
    fn get(&mut self, payload: &str) -> Option<String> {
        let src = self.entries.get(payload)?.clone();
        self.touch(payload);
        Some(src)
    }

    fn insert(&mut self, payload: String, src: String) {
        if self.entries.insert(payload.clone(), src).is_some() {
            self.touch(&payload);
            return;
        }
        self.order.push_back(payload);
        while self.order.len() > CACHE_LIMIT {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn touch(&mut self, payload: &str) {
        if let Some(pos) = self.order.iter().position(|p| p == payload) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }

    #[cfg(test)]
    fn contains(&self, payload: &str) -> bool {
        self.entries.contains_key(payload)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Resolves QR payloads and renders generated codes
#[derive(Debug, Clone)]
pub struct QrResolver {
    viewer_path: String,
    min_px: u32,
    cache: Arc<Mutex<QrCache>>,
}

impl QrResolver {
    pub fn new(viewer_path: impl Into<String>, min_px: u32) -> Self {
        Self {
            viewer_path: viewer_path.into(),
            min_px,
            cache: Arc::new(Mutex::new(QrCache::default())),
        }
    }

    pub fn viewer_path(&self) -> &str {
        &self.viewer_path
    }

    /// Payload the auto modes would encode, `None` for image sources
    pub fn payload(&self, state: &CardState) -> Option<String> {
        match QrSource::of(state) {
            QrSource::AutoContact => Some(contact_card(state)),
            QrSource::AutoLink => state
                .card_id
                .as_ref()
                .map(|id| build_link(&self.viewer_path, id)),
            QrSource::Custom | QrSource::Upload => None,
        }
    }

    /// Resolve the QR element for rendering. Never persists anything.
    pub fn resolve(&self, state: &CardState) -> CardResult<ResolvedQr> {
        let reader = InputReader::new(state);
        match QrSource::of(state) {
            QrSource::Custom => Ok(reader
                .text(keys::QR_CUSTOM_URL)
                .map(|src| ResolvedQr::Image { src })
                .unwrap_or(ResolvedQr::Absent)),
            QrSource::Upload => {
                let src = state.image_urls.qr_code.trim();
                Ok(if src.is_empty() {
                    ResolvedQr::Absent
                } else {
                    ResolvedQr::Image { src: src.to_string() }
                })
            }
            QrSource::AutoContact | QrSource::AutoLink => match self.payload(state) {
                Some(payload) => {
                    let src = self.generate(&payload)?;
                    Ok(ResolvedQr::Generated { payload, src })
                }
                None => Ok(ResolvedQr::AwaitingPersistence),
            },
        }
    }

    /// Make sure the card has an id, persisting it through `store` when it
    /// has none, and return the shareable link.
    pub fn ensure_link(&self, state: &mut CardState, store: &dyn CardStore) -> CardResult<String> {
        let id = match &state.card_id {
            Some(id) => id.clone(),
            None => {
                let id = store.save(state)?;
                info!(%id, "Persisted card to obtain a shareable link");
                state.card_id = Some(id.clone());
                id
            }
        };
        Ok(build_link(&self.viewer_path, &id))
    }

    /// Generated code image for a payload as an SVG data URI
    pub fn generate(&self, payload: &str) -> CardResult<String> {
        if let Some(src) = self.cache.lock().get(payload) {
            return Ok(src);
        }
        let src = qr_data_uri(payload, self.min_px)?;
        self.cache.lock().insert(payload.to_string(), src.clone());
        debug!(bytes = payload.len(), "Generated QR code");
        Ok(src)
    }
}

/// Select a source, replacing the previous one.
///
/// For `custom`, `address` becomes the custom image address; for `upload`
/// it becomes `imageUrls.qrCode`. Auto sources ignore it.
pub fn select_source(state: &mut CardState, source: QrSource, address: Option<&str>) {
    state.set_input(keys::QR_SOURCE, source.as_str());
    match (source, address) {
        (QrSource::Custom, Some(address)) => state.set_input(keys::QR_CUSTOM_URL, address),
        (QrSource::Upload, Some(address)) => state.image_urls.qr_code = address.to_string(),
        _ => {}
    }
}

/// Render a payload to an SVG QR code wrapped in a base64 data URI
pub fn qr_data_uri(payload: &str, min_px: u32) -> CardResult<String> {
    let code = QrCode::new(payload.as_bytes()).map_err(|e| CardError::Qr(e.to_string()))?;
    let svg_string = code
        .render::<svg::Color<'_>>()
        .min_dimensions(min_px, min_px)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    let encoded = base64::engine::general_purpose::STANDARD.encode(svg_string.as_bytes());
    Ok(format!("data:image/svg+xml;base64,{}", encoded))
}

//! Image upload collaborator
//!
//! An uploader turns file bytes into an address. The address is then stored
//! exactly like one the user typed in; nothing downstream can tell them
//! apart.

use std::future::Future;
use std::str::FromStr;

use crate::error::{CardError, CardResult};
use crate::inputs::keys;
use crate::model::CardState;
use crate::types::Face;

/// Where an image address goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Background(Face),
    Logo,
    Photo,
    QrCode,
    Captured(Face),
}

impl ImageSlot {
    /// Store an address in this slot
    pub fn apply(&self, state: &mut CardState, address: &str) {
        let address = address.trim().to_string();
        match self {
            ImageSlot::Background(Face::Front) => state.image_urls.front = address,
            ImageSlot::Background(Face::Back) => state.image_urls.back = address,
            ImageSlot::Logo => state.set_input(keys::LOGO, address),
            ImageSlot::Photo => state.image_urls.photo = address,
            ImageSlot::QrCode => state.image_urls.qr_code = address,
            ImageSlot::Captured(Face::Front) => state.image_urls.captured_front = address,
            ImageSlot::Captured(Face::Back) => state.image_urls.captured_back = address,
        }
    }
}

impl FromStr for ImageSlot {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" | "front-bg" => Ok(ImageSlot::Background(Face::Front)),
            "back" | "back-bg" => Ok(ImageSlot::Background(Face::Back)),
            "logo" => Ok(ImageSlot::Logo),
            "photo" => Ok(ImageSlot::Photo),
            "qr" | "qr-code" => Ok(ImageSlot::QrCode),
            "captured-front" => Ok(ImageSlot::Captured(Face::Front)),
            "captured-back" => Ok(ImageSlot::Captured(Face::Back)),
            other => Err(CardError::InvalidOperation(format!("unknown image slot '{}'", other))),
        }
    }
}

/// Uploads image bytes and returns the address they are served from
pub trait ImageUploader: Send + Sync {
    fn upload(&self, file_name: &str, bytes: Vec<u8>) -> impl Future<Output = CardResult<String>> + Send;
}

/// Uploader that embeds the bytes as a base64 data URI
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineUploader;

impl ImageUploader for InlineUploader {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> CardResult<String> {
        use base64::Engine;

        if bytes.is_empty() {
            return Err(CardError::Upload(format!("{} is empty", file_name)));
        }
        let mime = match file_name.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            _ => return Err(CardError::Upload(format!("unsupported image type: {}", file_name))),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(format!("data:{};base64,{}", mime, encoded))
    }
}

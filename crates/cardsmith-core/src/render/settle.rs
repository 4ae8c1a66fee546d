//! Image settling
//!
//! A tree is settled once every image source in it has been probed. Broken
//! sources degrade to an empty placeholder for that item only; the rest of
//! the tree is untouched.

use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::path::PathBuf;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::node::{NodeKind, RenderNode};
use crate::error::{CardError, CardResult};

/// Result of probing one image source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    Loaded,
    Broken,
}

/// Collaborator that checks whether an image source can be displayed
pub trait ImageProbe: Send + Sync {
    fn probe(&self, src: &str) -> impl Future<Output = ImageStatus> + Send;
}

/// Probe that trusts every source
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeLoaded;

impl ImageProbe for AssumeLoaded {
    async fn probe(&self, _src: &str) -> ImageStatus {
        ImageStatus::Loaded
    }
}

/// Probe for offline rendering: local paths must exist, remote addresses
/// are trusted
#[derive(Debug, Clone)]
pub struct LocalFileProbe {
    base_dir: PathBuf,
}

impl LocalFileProbe {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }
}

impl ImageProbe for LocalFileProbe {
    async fn probe(&self, src: &str) -> ImageStatus {
        if src.contains("://") && !src.starts_with("file://") {
            return ImageStatus::Loaded;
        }
        let path = self.base_dir.join(src.trim_start_matches("file://"));
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => ImageStatus::Loaded,
            _ => ImageStatus::Broken,
        }
    }
}

/// A tree whose image sources have all been probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledTree {
    pub tree: RenderNode,
    /// Sources that failed to load, in sorted order
    pub broken: Vec<String>,
}

/// Probe every image in `tree` concurrently and degrade the broken ones.
///
/// Fails with [`CardError::Cancelled`] when `cancel` fires first.
pub async fn settle<P: ImageProbe>(
    tree: RenderNode,
    probe: &P,
    cancel: &CancellationToken,
) -> CardResult<SettledTree> {
    // Inline data is always displayable
    let sources: BTreeSet<String> = tree
        .descendants()
        .into_iter()
        .filter(|n| n.kind().loads_image())
        .filter_map(|n| n.get_attr("src"))
        .filter(|src| !src.starts_with("data:"))
        .map(str::to_string)
        .collect();

    let probes = join_all(sources.iter().map(|src| async move { (src.clone(), probe.probe(src).await) }));
    let results = tokio::select! {
        _ = cancel.cancelled() => return Err(CardError::Cancelled),
        results = probes => results,
    };

    let broken: Vec<String> = results
        .into_iter()
        .filter(|(_, status)| *status == ImageStatus::Broken)
        .map(|(src, _)| src)
        .collect();
    for src in &broken {
        warn!(%src, "Image failed to load, rendering placeholder");
    }
    debug!(probed = sources.len(), broken = broken.len(), "Tree settled");

    let lookup: HashSet<&str> = broken.iter().map(String::as_str).collect();
    let tree = degrade(tree, &lookup);
    Ok(SettledTree { tree, broken })
}

fn degrade(mut node: RenderNode, broken: &HashSet<&str>) -> RenderNode {
    let is_broken = node.kind().loads_image()
        && node.get_attr("src").is_some_and(|src| broken.contains(src));
    if is_broken {
        node.content.kind = NodeKind::Placeholder;
        node.content.attrs.retain(|(name, _)| name != "src" && name != "alt");
        node.content.classes.push("card-placeholder".to_string());
    }
    node.children = node
        .children
        .into_iter()
        .map(|child| degrade(child, broken))
        .collect();
    node
}

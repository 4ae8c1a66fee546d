//! Abstract render nodes
//!
//! Target-agnostic description of the visual tree. The static serializer and
//! the live tree both consume this; neither builds nodes on its own.

use crate::types::{ItemKey, Position};

/// What a node is; decides the markup tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Card,
    Face,
    BackgroundImage,
    BackgroundTint,
    Image,
    QrCode,
    Text,
    Link,
    Icon,
    Group,
    /// Empty stand-in for an item whose image failed or is not ready
    Placeholder,
}

impl NodeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Image | NodeKind::QrCode | NodeKind::BackgroundImage => "img",
            NodeKind::Link => "a",
            NodeKind::Icon => "i",
            NodeKind::Text => "span",
            NodeKind::Card
            | NodeKind::Face
            | NodeKind::BackgroundTint
            | NodeKind::Group
            | NodeKind::Placeholder => "div",
        }
    }

    /// Void elements have no children or closing tag
    pub fn is_void(&self) -> bool {
        self.tag() == "img"
    }

    /// Nodes whose `src` must be loaded before the tree is settled
    pub fn loads_image(&self) -> bool {
        matches!(self, NodeKind::Image | NodeKind::QrCode | NodeKind::BackgroundImage)
    }
}

/// Interactive-only metadata: drag handle and back-reference to the source field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Affordance {
    pub source: ItemKey,
    pub draggable: bool,
}

/// Node content without children and offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContent {
    pub kind: NodeKind,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub style: Vec<(String, String)>,
    pub text: Option<String>,
    pub affordance: Option<Affordance>,
}

/// One node of the abstract tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    /// Unique within a tree and stable across renders of the same item
    pub key: String,
    pub content: NodeContent,
    /// Additive offset, emitted as a transform; `None` for unpositioned nodes
    pub position: Option<Position>,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn new(key: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            key: key.into(),
            content: NodeContent {
                kind,
                classes: Vec::new(),
                attrs: Vec::new(),
                style: Vec::new(),
                text: None,
                affordance: None,
            },
            position: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.content.kind
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.content.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.content.attrs.push((name.into(), value.into()));
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.content.style.push((property.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: RenderNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_affordance(mut self, affordance: Option<Affordance>) -> Self {
        self.content.affordance = affordance;
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.content
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_style(&self, property: &str) -> Option<&str> {
        self.content
            .style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search by key
    pub fn find(&self, key: &str) -> Option<&RenderNode> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(key))
    }

    /// Depth-first search for the first node with a class
    pub fn find_class(&self, class: &str) -> Option<&RenderNode> {
        if self.content.classes.iter().any(|c| c == class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_class(class))
    }

    /// All nodes in pre-order
    pub fn descendants(&self) -> Vec<&RenderNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }
}

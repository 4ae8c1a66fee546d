//! Static markup adapter
//!
//! Serializes an abstract tree to a self-contained HTML fragment. Every text
//! and attribute value is escaped; nothing from the state is ever emitted
//! as markup.

use super::node::{NodeContent, RenderNode};
use crate::sanitize::escape_markup;
use crate::types::Position;

/// Serializer for the static target
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMarkup {
    include_affordances: bool,
}

impl StaticMarkup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also emit `data-source` / `data-draggable` for interactive nodes
    pub fn with_affordances(mut self) -> Self {
        self.include_affordances = true;
        self
    }

    pub fn serialize(&self, node: &RenderNode) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, node);
        out
    }

    fn write_tree(&self, out: &mut String, node: &RenderNode) {
        self.write_node(out, &node.content, node.position, &mut |out| {
            for child in &node.children {
                self.write_tree(out, child);
            }
        });
    }

    /// Write one element; `children` fills the body of non-void elements
    fn write_node(
        &self,
        out: &mut String,
        content: &NodeContent,
        position: Option<Position>,
        children: &mut dyn FnMut(&mut String),
    ) {
        let tag = content.kind.tag();
        out.push('<');
        out.push_str(tag);

        if !content.classes.is_empty() {
            write_attr(out, "class", &content.classes.join(" "));
        }
        for (name, value) in &content.attrs {
            write_attr(out, name, value);
        }
        if self.include_affordances {
            if let Some(affordance) = &content.affordance {
                write_attr(out, "data-source", &affordance.source.to_string());
                if affordance.draggable {
                    write_attr(out, "data-draggable", "true");
                }
            }
        }

        let mut declarations: Vec<String> = content
            .style
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect();
        if let Some(position) = position {
            declarations.push(format!("transform: {}", position.to_transform()));
        }
        if !declarations.is_empty() {
            write_attr(out, "style", &declarations.join("; "));
        }
        out.push('>');

        if content.kind.is_void() {
            return;
        }
        if let Some(text) = &content.text {
            out.push_str(&escape_markup(text));
        }
        children(out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_markup(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::{Affordance, NodeKind};
    use crate::types::{ElementKey, ItemKey};

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let node = RenderNode::new("name", NodeKind::Text)
            .attr("title", "\"quoted\" & <tag>")
            .text("<script>alert('x')</script>");
        let html = StaticMarkup::new().serialize(&node);
        assert_eq!(
            html,
            "<span title=\"&quot;quoted&quot; &amp; &lt;tag&gt;\">\
             &lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</span>"
        );
    }

    #[test]
    fn test_void_image_has_no_closing_tag() {
        let node = RenderNode::new("logo", NodeKind::Image).attr("src", "a.png");
        assert_eq!(StaticMarkup::new().serialize(&node), "<img src=\"a.png\">");
    }

    #[test]
    fn test_position_becomes_transform() {
        let node = RenderNode::new("name", NodeKind::Text)
            .style("color", "red")
            .at(Position::new(-3, 7))
            .text("Ali");
        assert_eq!(
            StaticMarkup::new().serialize(&node),
            "<span style=\"color: red; transform: translate(-3px, 7px)\">Ali</span>"
        );
    }

    #[test]
    fn test_affordances_only_when_requested() {
        let node = RenderNode::new("qr", NodeKind::Placeholder).with_affordance(Some(Affordance {
            source: ItemKey::Element(ElementKey::Qr),
            draggable: true,
        }));
        assert_eq!(StaticMarkup::new().serialize(&node), "<div></div>");
        assert_eq!(
            StaticMarkup::new().with_affordances().serialize(&node),
            "<div data-source=\"qr\" data-draggable=\"true\"></div>"
        );
    }
}

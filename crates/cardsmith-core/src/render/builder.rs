//! Target-agnostic tree builder
//!
//! The only place that decides what a card looks like. Both adapters in
//! this module tree consume its output; `Target` only toggles affordances
//! and captured-face substitution.

use tracing::warn;

use super::layout::{element_anchor, group_anchor, Anchor, GroupKey, LayoutVariant, CARD_HEIGHT, CARD_WIDTH};
use super::node::{Affordance, NodeKind, RenderNode};
use super::Target;
use crate::inputs::{self, keys, InputReader, NumberSpec};
use crate::model::{format_number, CardState, InputValue};
use crate::placement::FaceLayout;
use crate::position::PositionStore;
use crate::qr::{QrResolver, QrSource, ResolvedQr};
use crate::social;
use crate::types::{ElementKey, Face, ItemKey};

/// Builds render trees for one state
pub(crate) struct TreeBuilder<'a> {
    state: &'a CardState,
    reader: InputReader<'a>,
    layout: &'a FaceLayout,
    qr: &'a QrResolver,
    target: Target,
    variant: LayoutVariant,
}

impl<'a> TreeBuilder<'a> {
    pub(crate) fn new(
        state: &'a CardState,
        layout: &'a FaceLayout,
        qr: &'a QrResolver,
        target: Target,
    ) -> Self {
        Self {
            state,
            reader: InputReader::new(state),
            layout,
            qr,
            target,
            variant: LayoutVariant::of(state),
        }
    }

    /// Whole card: both faces under one root
    pub(crate) fn card(&self) -> RenderNode {
        let language = self.state.language;
        let mut root = RenderNode::new("card", NodeKind::Card)
            .class("card")
            .attr("dir", language.direction())
            .attr("lang", language.code())
            .attr("data-layout", self.variant.as_str());
        for face in Face::ALL {
            root = root.child(self.face(face));
        }
        root
    }

    /// One face with its layers and items
    pub(crate) fn face(&self, face: Face) -> RenderNode {
        let mut node = RenderNode::new(face_key(face), NodeKind::Face)
            .class("card-face")
            .class(format!("card-face-{}", face.as_str()))
            .attr("data-face", face.as_str())
            .style("width", px(CARD_WIDTH))
            .style("height", px(CARD_HEIGHT));

        let captured = self.state.image_urls.captured(face).trim();
        if self.target == Target::Static && !captured.is_empty() {
            return node.child(
                RenderNode::new(format!("{}/captured", face_key(face)), NodeKind::Image)
                    .class("card-face-captured")
                    .attr("src", captured)
                    .attr("alt", ""),
            );
        }

        let background = self.state.image_urls.background(face).trim();
        if !background.is_empty() {
            node = node.child(
                RenderNode::new(format!("{}/bg-image", face_key(face)), NodeKind::BackgroundImage)
                    .class("card-bg-image")
                    .attr("src", background)
                    .attr("alt", ""),
            );
        }
        node = node.child(self.tint(face, !background.is_empty()));

        let items = self.layout.items(face);
        for key in items {
            if let ItemKey::Element(element) = key {
                if let Some(child) = self.element(face, *element) {
                    node = node.child(child);
                }
            }
        }

        let phones: Vec<RenderNode> = items.iter().filter_map(|k| self.phone(k)).collect();
        if !phones.is_empty() {
            node = node.child(self.group(face, GroupKey::Phones, phones));
        }

        let socials: Vec<RenderNode> = items.iter().filter_map(|k| self.social(k)).collect();
        if !socials.is_empty() {
            node = node.child(self.group(face, GroupKey::Socials, socials));
        }
        node
    }

    fn tint(&self, face: Face, has_image: bool) -> RenderNode {
        let start = self.reader.color(&keys::bg_start(face), inputs::DEFAULT_BG_START);
        let end = self.reader.color(&keys::bg_end(face), inputs::DEFAULT_BG_END);
        // Without an image the tint is the background and must stay opaque
        let opacity = if has_image {
            self.reader.number(inputs::bg_opacity(face))
        } else {
            1.0
        };
        RenderNode::new(format!("{}/bg-tint", face_key(face)), NodeKind::BackgroundTint)
            .class("card-bg-tint")
            .style("background", format!("linear-gradient(135deg, {}, {})", start, end))
            .style("opacity", format_number(opacity))
    }

    fn element(&self, face: Face, element: ElementKey) -> Option<RenderNode> {
        let node = match element {
            ElementKey::Logo => self.logo()?,
            ElementKey::Photo => self.photo()?,
            ElementKey::Name => self.text_line(
                ElementKey::Name,
                keys::NAME,
                keys::NAME_COLOR,
                inputs::DEFAULT_NAME_COLOR,
                keys::NAME_FONT,
                inputs::NAME_FONT_SIZE,
            )?,
            ElementKey::Tagline => self.text_line(
                ElementKey::Tagline,
                keys::TAGLINE,
                keys::TAGLINE_COLOR,
                inputs::DEFAULT_TAGLINE_COLOR,
                keys::TAGLINE_FONT,
                inputs::TAGLINE_FONT_SIZE,
            )?,
            ElementKey::Qr => self.qr_code()?,
        };
        let anchor = element_anchor(self.variant, face, element);
        Some(self.positioned(anchored(node, anchor), ItemKey::Element(element)))
    }

    fn logo(&self) -> Option<RenderNode> {
        let src = self.reader.text(keys::LOGO)?;
        Some(
            RenderNode::new(ElementKey::Logo.as_str(), NodeKind::Image)
                .class("card-logo")
                .attr("src", src)
                .attr("alt", "logo")
                .style("width", px_f(self.reader.number(inputs::LOGO_SIZE)))
                .style("opacity", format_number(self.reader.number(inputs::LOGO_OPACITY))),
        )
    }

    fn photo(&self) -> Option<RenderNode> {
        let uploaded = self.state.image_urls.photo.trim();
        let src = if uploaded.is_empty() {
            self.reader.text(keys::PHOTO_URL)?
        } else {
            uploaded.to_string()
        };
        let shape = match self.reader.text(keys::PHOTO_SHAPE).as_deref() {
            Some("square") => "square",
            Some("rounded") => "rounded",
            _ => "circle",
        };
        let size = px_f(self.reader.number(inputs::PHOTO_SIZE));
        let radius = match shape {
            "square" => "0",
            "rounded" => "12px",
            _ => "50%",
        };
        let mut node = RenderNode::new(ElementKey::Photo.as_str(), NodeKind::Image)
            .class("card-photo")
            .class(format!("card-photo-{}", shape))
            .attr("src", src)
            .attr("alt", "photo")
            .style("width", size.clone())
            .style("height", size)
            .style("border-radius", radius);
        let border = self.reader.number(inputs::PHOTO_BORDER_WIDTH);
        if border > 0.0 {
            let color = self.reader.color(keys::PHOTO_BORDER_COLOR, inputs::DEFAULT_PHOTO_BORDER);
            node = node.style("border", format!("{} solid {}", px_f(border), color));
        }
        Some(node)
    }

    fn text_line(
        &self,
        element: ElementKey,
        text_key: &str,
        color_key: &str,
        default_color: &str,
        font_key: &str,
        size: NumberSpec,
    ) -> Option<RenderNode> {
        let text = self.reader.localized(text_key)?;
        Some(
            RenderNode::new(element.as_str(), NodeKind::Text)
                .class(format!("card-{}", element.as_str()))
                .style("color", self.reader.color(color_key, default_color))
                .style("font-family", self.reader.font(font_key))
                .style("font-size", px_f(self.reader.number(size)))
                .text(text),
        )
    }

    fn qr_code(&self) -> Option<RenderNode> {
        let key = ElementKey::Qr.as_str();
        let source = QrSource::of(self.state);
        let node = match self.qr.resolve(self.state) {
            Ok(ResolvedQr::Absent) => return None,
            Ok(ResolvedQr::Image { src }) => RenderNode::new(key, NodeKind::QrCode)
                .class("card-qr")
                .attr("src", src)
                .attr("alt", "QR code"),
            Ok(ResolvedQr::Generated { src, .. }) => RenderNode::new(key, NodeKind::QrCode)
                .class("card-qr")
                .attr("src", src)
                .attr("alt", "QR code")
                .attr("data-qr-source", source.as_str()),
            Ok(ResolvedQr::AwaitingPersistence) => placeholder(key, "card-qr"),
            Err(e) => {
                warn!(error = %e, %source, "QR code unavailable, rendering placeholder");
                placeholder(key, "card-qr")
            }
        };
        let size = px_f(self.reader.number(inputs::QR_SIZE));
        Some(
            node.style("width", size.clone())
                .style("height", size)
                .style("opacity", format_number(self.reader.number(inputs::QR_OPACITY))),
        )
    }

    fn phone(&self, key: &ItemKey) -> Option<RenderNode> {
        let ItemKey::Phone(id) = key else { return None };
        let phone = self.state.phone(*id)?;
        let value = phone.value.trim();
        if value.is_empty() {
            return None;
        }

        let as_text = self.reader.flag(keys::PHONES_AS_TEXT, false);
        let item = key.to_string();
        let text_color = self.reader.color(keys::PHONE_TEXT_COLOR, inputs::DEFAULT_PHONE_TEXT);
        let mut node = RenderNode::new(item.clone(), NodeKind::Link)
            .class("card-phone")
            .class(if as_text { "card-phone-text" } else { "card-phone-button" })
            .attr("href", social::phone_destination(value))
            .style("color", text_color)
            .style("font-family", self.reader.font(keys::PHONE_FONT))
            .style("font-size", px_f(self.reader.number(inputs::PHONE_FONT_SIZE)));
        if !as_text {
            let background = self.reader.color(keys::PHONE_BG_COLOR, inputs::DEFAULT_PHONE_BG);
            node = node
                .style("background-color", background)
                .style("padding", px_f(self.reader.number(inputs::PHONE_PADDING)))
                .child(
                    RenderNode::new(format!("{}/icon", item), NodeKind::Icon)
                        .class("icon")
                        .class("icon-phone"),
                );
        }
        node = node.child(
            RenderNode::new(format!("{}/label", item), NodeKind::Text)
                .class("card-phone-label")
                .text(value),
        );
        Some(self.positioned(node, *key))
    }

    fn social(&self, key: &ItemKey) -> Option<RenderNode> {
        let (platform_key, value, overrides) = match key {
            ItemKey::StaticSocial(platform) => {
                (platform.as_str().to_string(), self.state.static_link(*platform).value, None)
            }
            ItemKey::Social(id) => {
                let item = self.state.social(*id)?;
                (item.platform_key.clone(), item.value.clone(), Some(&item.style_overrides))
            }
            _ => return None,
        };
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        let platform = social::platform(&platform_key);
        let item = key.to_string();
        let override_color = |name: &str| {
            overrides
                .and_then(|o| o.get(name))
                .and_then(InputValue::as_text)
                .filter(|c| inputs::is_css_safe(c))
        };
        let background = override_color("bg-color")
            .unwrap_or_else(|| self.reader.color(keys::SOCIAL_BG_COLOR, inputs::DEFAULT_SOCIAL_BG));
        let color = override_color("icon-color")
            .unwrap_or_else(|| self.reader.color(keys::SOCIAL_ICON_COLOR, inputs::DEFAULT_SOCIAL_ICON));
        let size = overrides
            .and_then(|o| o.get("size"))
            .and_then(InputValue::as_number)
            .map(|n| n.clamp(inputs::SOCIAL_SIZE.min, inputs::SOCIAL_SIZE.max))
            .unwrap_or_else(|| self.reader.number(inputs::SOCIAL_SIZE));

        let node = RenderNode::new(item.clone(), NodeKind::Link)
            .class("card-social")
            .class(format!("card-social-{}", platform.key))
            .attr("href", social::destination(&platform_key, value))
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer")
            .style("background-color", background)
            .style("color", color)
            .style("min-height", px_f(size))
            .child(
                RenderNode::new(format!("{}/icon", item), NodeKind::Icon)
                    .class("icon")
                    .class(format!("icon-{}", platform.icon))
                    .style("font-size", px_f(size * 0.6)),
            )
            .child(
                RenderNode::new(format!("{}/label", item), NodeKind::Text)
                    .class("card-social-label")
                    .text(social::display_text(value)),
            );
        Some(self.positioned(node, *key))
    }

    fn group(&self, face: Face, group: GroupKey, children: Vec<RenderNode>) -> RenderNode {
        let name = match group {
            GroupKey::Phones => "phones",
            GroupKey::Socials => "socials",
        };
        let mut node = RenderNode::new(format!("{}/{}", face_key(face), name), NodeKind::Group)
            .class(format!("card-{}", name));
        node = anchored(node, group_anchor(self.variant, face, group));
        node.children = children;
        node
    }

    /// Attach the stored offset and, for the interactive target, the affordance
    fn positioned(&self, node: RenderNode, key: ItemKey) -> RenderNode {
        let affordance = match self.target {
            Target::Interactive => Some(Affordance { source: key, draggable: true }),
            Target::Static => None,
        };
        node.at(self.state.position(&key)).with_affordance(affordance)
    }
}

pub(crate) fn face_key(face: Face) -> String {
    format!("face-{}", face.as_str())
}

fn anchored(node: RenderNode, anchor: Anchor) -> RenderNode {
    let node = node
        .style("position", "absolute")
        .style("left", px(anchor.left))
        .style("top", px(anchor.top));
    if anchor.full_width {
        node.style("width", px(CARD_WIDTH)).style("text-align", "center")
    } else {
        node
    }
}

fn placeholder(key: &str, class: &str) -> RenderNode {
    RenderNode::new(key, NodeKind::Placeholder)
        .class(class)
        .class("card-placeholder")
}

fn px(n: i32) -> String {
    format!("{}px", n)
}

fn px_f(n: f64) -> String {
    format!("{}px", format_number(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PhoneItem, SocialItem};
    use crate::placement::PlacementResolver;
    use crate::types::{Position, StaticPlatform};

    fn build(state: &CardState, target: Target) -> RenderNode {
        let layout = PlacementResolver::new().resolve(state);
        let qr = QrResolver::new("/card.html", 64);
        TreeBuilder::new(state, &layout, &qr, target).card()
    }

    #[test]
    fn test_empty_name_is_omitted() {
        let state = CardState::default();
        let tree = build(&state, Target::Static);
        assert!(tree.find("name").is_none());
        assert!(tree.find("logo").is_none());
        assert!(tree.find("qr").is_none());
    }

    #[test]
    fn test_root_carries_language_direction() {
        let state = CardState::default();
        let tree = build(&state, Target::Static);
        assert_eq!(tree.get_attr("dir"), Some("rtl"));
        assert_eq!(tree.get_attr("lang"), Some("ar"));
    }

    #[test]
    fn test_tint_opacity_forced_without_image() {
        let mut state = CardState::default();
        state.set_input("front-bg-opacity", 0.3);
        let tree = build(&state, Target::Static);
        assert_eq!(tree.find("face-front/bg-tint").unwrap().get_style("opacity"), Some("1"));

        state.image_urls.front = "bg.png".to_string();
        let tree = build(&state, Target::Static);
        assert_eq!(tree.find("face-front/bg-tint").unwrap().get_style("opacity"), Some("0.3"));
        assert!(tree.find("face-front/bg-image").is_some());
    }

    #[test]
    fn test_interactive_items_carry_affordance() {
        let mut state = CardState::default();
        state.set_input("name", "Ali");
        state.set_position(&ItemKey::Element(ElementKey::Name), Position::new(5, 6)).unwrap();

        let live = build(&state, Target::Interactive);
        let name = live.find("name").unwrap();
        assert_eq!(
            name.content.affordance.map(|a| a.source),
            Some(ItemKey::Element(ElementKey::Name))
        );
        assert_eq!(name.position, Some(Position::new(5, 6)));

        let fixed = build(&state, Target::Static);
        assert!(fixed.find("name").unwrap().content.affordance.is_none());
    }

    #[test]
    fn test_static_uses_captured_face() {
        let mut state = CardState::default();
        state.set_input("name", "Ali");
        state.image_urls.captured_front = "snap.png".to_string();

        let fixed = build(&state, Target::Static);
        let front = fixed.find("face-front").unwrap();
        assert_eq!(front.children.len(), 1);
        assert_eq!(front.children[0].get_attr("src"), Some("snap.png"));

        let live = build(&state, Target::Interactive);
        assert!(live.find("name").is_some());
    }

    #[test]
    fn test_phone_mode_toggle() {
        let mut state = CardState::default();
        let phone = PhoneItem::new("010 123");
        let key = ItemKey::Phone(phone.id).to_string();
        state.dynamic_phones.push(phone);

        let tree = build(&state, Target::Static);
        let node = tree.find(&key).unwrap();
        assert!(node.content.classes.contains(&"card-phone-button".to_string()));
        assert_eq!(node.get_attr("href"), Some("tel:010123"));

        state.set_input("phones-as-text", true);
        let tree = build(&state, Target::Static);
        let node = tree.find(&key).unwrap();
        assert!(node.content.classes.contains(&"card-phone-text".to_string()));
        assert!(tree.find(&format!("{}/icon", key)).is_none());
    }

    #[test]
    fn test_social_link_destination_and_overrides() {
        let mut state = CardState::default();
        state.static_link_mut(StaticPlatform::Website).value = "https://www.example.com/".to_string();
        let mut social = SocialItem::new("instagram", "@ali");
        social.style_overrides.insert("bg-color".to_string(), "#ff0000".into());
        let key = ItemKey::Social(social.id).to_string();
        state.dynamic_social_links.push(social);

        let tree = build(&state, Target::Static);
        let site = tree.find("static:website").unwrap();
        assert_eq!(site.get_attr("href"), Some("https://www.example.com/"));
        assert_eq!(
            tree.find("static:website/label").unwrap().content.text.as_deref(),
            Some("example.com")
        );

        let insta = tree.find(&key).unwrap();
        assert_eq!(insta.get_attr("href"), Some("https://instagram.com/ali"));
        assert_eq!(insta.get_style("background-color"), Some("#ff0000"));
        // Socials default to the back face
        assert!(tree.find("face-back").unwrap().find(&key).is_some());
    }

    #[test]
    fn test_auto_link_without_id_renders_placeholder() {
        let mut state = CardState::default();
        state.set_input("qr-source", "auto-link");
        let tree = build(&state, Target::Static);
        assert_eq!(tree.find("qr").unwrap().kind(), NodeKind::Placeholder);
    }
}

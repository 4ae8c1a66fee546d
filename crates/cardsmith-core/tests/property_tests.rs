//! Property-based tests for the card model, history and rendering
//!
//! Uses proptest to verify the laws the editor relies on: offsets are
//! reversible, face changes reset offsets exactly once, history walks back
//! to the start, and both render targets agree.

use cardsmith_core::sanitize::escape_markup;
use cardsmith_core::{
    CardEditor, CardState, Direction, EditorConfig, ElementKey, Face, ItemKey, Language,
    LiveTree, PhoneItem, PositionStore, Position, RenderEngine, SocialItem, StaticPlatform,
    Target,
};
use proptest::prelude::*;

// ============================================================================
// Strategy Generators
// ============================================================================

/// Free text including markup-significant characters
fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 <>&\"'/]{0,24}").expect("valid regex")
}

/// Link values with leading, embedded, hostile and mixed-case schemes
fn link_value_strategy() -> impl Strategy<Value = String> {
    let scheme = prop_oneof![
        Just(""),
        Just("https://"),
        Just("HTTPS://"),
        Just("http://"),
        Just("mailto:"),
        Just("tel:"),
        Just("javascript:"),
        Just("JavaScript://"),
        Just("data:"),
        Just("vbscript:"),
        Just("ftp://"),
        Just("://"),
    ];
    let rest = prop::string::string_regex("[a-zA-Z0-9./?=@:%_-]{1,24}").expect("valid regex");
    (scheme, rest, any::<bool>()).prop_map(|(scheme, rest, embed)| {
        if embed {
            format!("{}?next=https://x.com", rest)
        } else {
            format!("{}{}", scheme, rest)
        }
    })
}

fn face_strategy() -> impl Strategy<Value = Face> {
    prop_oneof![Just(Face::Front), Just(Face::Back)]
}

fn offset_strategy() -> impl Strategy<Value = Position> {
    (-400i32..400, -400i32..400).prop_map(|(x, y)| Position::new(x, y))
}

fn direction_strategy() -> impl Strategy<Value = (Direction, Direction)> {
    prop_oneof![
        Just((Direction::Right, Direction::Left)),
        Just((Direction::Left, Direction::Right)),
        Just((Direction::Up, Direction::Down)),
        Just((Direction::Down, Direction::Up)),
    ]
}

/// Description of a card, turned into a `CardState` by `build`
#[derive(Debug, Clone)]
struct CardSpec {
    name: String,
    tagline: String,
    secondary: bool,
    phones_as_text: bool,
    phones: Vec<(String, Face, Position)>,
    socials: Vec<(String, String, Face)>,
    website: String,
    name_offset: Position,
    qr_url: String,
}

fn card_strategy() -> impl Strategy<Value = CardSpec> {
    (
        text_strategy(),
        text_strategy(),
        any::<bool>(),
        any::<bool>(),
        prop::collection::vec(("[0-9 +]{0,12}", face_strategy(), offset_strategy()), 0..4),
        prop::collection::vec(
            (
                prop_oneof![Just("instagram"), Just("x"), Just("github"), Just("mastodon")].prop_map(String::from),
                "[a-z@.]{0,12}",
                face_strategy(),
            ),
            0..4,
        ),
        "(https://www\\.)?[a-z]{0,10}(\\.com)?",
        offset_strategy(),
        prop_oneof![Just(String::new()), Just("https://img.example/qr.png".to_string())],
    )
        .prop_map(
            |(name, tagline, secondary, phones_as_text, phones, socials, website, name_offset, qr_url)| CardSpec {
                name,
                tagline,
                secondary,
                phones_as_text,
                phones,
                socials,
                website,
                name_offset,
                qr_url,
            },
        )
}

fn build(spec: &CardSpec) -> CardState {
    let mut state = CardState::default();
    if spec.secondary {
        state.language = Language::Secondary;
    }
    state.set_input("name", spec.name.as_str());
    state.set_input("tagline", spec.tagline.as_str());
    state.set_input("phones-as-text", spec.phones_as_text);
    state.set_input("qr-custom-url", spec.qr_url.as_str());
    for (value, face, offset) in &spec.phones {
        let mut phone = PhoneItem::new(value.as_str());
        phone.placement = *face;
        phone.position = *offset;
        state.dynamic_phones.push(phone);
    }
    for (platform, value, face) in &spec.socials {
        let mut social = SocialItem::new(platform.as_str(), value.as_str());
        social.placement = *face;
        state.dynamic_social_links.push(social);
    }
    state.static_link_mut(StaticPlatform::Website).value = spec.website.clone();
    state
        .set_position(&ItemKey::Element(ElementKey::Name), spec.name_offset)
        .unwrap();
    state
}

fn live_markup(engine: &RenderEngine, state: &CardState) -> String {
    let mut live = LiveTree::new();
    live.reconcile(&engine.build(state, Target::Interactive));
    live.to_markup()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Moving n one way then n the other way restores the offset
    #[test]
    fn move_is_reversible(
        start in offset_strategy(),
        (there, back) in direction_strategy(),
        n in 0i32..1000,
    ) {
        let key = ItemKey::Element(ElementKey::Logo);
        let mut state = CardState::default();
        state.set_position(&key, start).unwrap();

        state.move_item(&key, there, n).unwrap();
        state.move_item(&key, back, n).unwrap();
        prop_assert_eq!(state.position(&key), start);
    }

    /// front -> back -> front resets the offset once and leaves it at origin
    #[test]
    fn face_round_trip_resets_offset(offset in offset_strategy()) {
        let mut editor = CardEditor::from_config(EditorConfig::default());
        let key = ItemKey::Element(ElementKey::Qr);
        editor.set_position(&key, offset).unwrap();

        editor.set_placement(&key, Face::Back).unwrap();
        prop_assert_eq!(editor.position(&key), Position::ORIGIN);
        editor.set_placement(&key, Face::Front).unwrap();
        prop_assert_eq!(editor.position(&key), Position::ORIGIN);
        prop_assert_eq!(editor.face_of(&key), Some(Face::Front));
    }

    /// N committed edits and N undos render the initial state; one redo
    /// renders the first edit
    #[test]
    fn history_walks_back_to_start(names in prop::collection::vec("[a-z]{1,8}", 1..12)) {
        let mut editor = CardEditor::from_config(EditorConfig::default());
        let initial = editor.static_markup();

        for name in &names {
            editor.set_input("name", name.as_str());
            editor.commit();
        }
        for _ in &names {
            editor.undo();
        }
        prop_assert_eq!(editor.static_markup(), initial);

        editor.redo();
        let mut first = CardState::default();
        first.set_input("name", names[0].as_str());
        prop_assert_eq!(editor.static_markup(), RenderEngine::default().static_markup(&first));
    }

    /// A state read back from its JSON renders identically on both targets
    #[test]
    fn json_round_trip_renders_identically(spec in card_strategy()) {
        let state = build(&spec);
        let restored = CardState::from_json(&state.to_json().unwrap()).unwrap();
        let engine = RenderEngine::default();

        prop_assert_eq!(engine.static_markup(&restored), engine.static_markup(&state));
        prop_assert_eq!(
            engine.build(&restored, Target::Interactive),
            engine.build(&state, Target::Interactive)
        );
    }

    /// Rendering twice yields no mutations and byte-identical static output
    #[test]
    fn render_is_idempotent(spec in card_strategy()) {
        let mut editor = CardEditor::from_config(EditorConfig::default());
        editor.load(build(&spec));

        editor.render();
        prop_assert!(editor.render().is_empty());
        prop_assert_eq!(editor.static_markup(), editor.static_markup());
    }

    /// The live view without affordances equals the static markup
    #[test]
    fn live_and_static_agree(spec in card_strategy()) {
        let state = build(&spec);
        let engine = RenderEngine::default();
        prop_assert_eq!(live_markup(&engine, &state), engine.static_markup(&state));
    }

    /// Reconciling from any earlier state converges on a fresh render
    #[test]
    fn reconcile_converges(before in card_strategy(), after in card_strategy()) {
        let engine = RenderEngine::default();
        let target = engine.build(&build(&after), Target::Interactive);
        let mut live = LiveTree::new();
        live.reconcile(&engine.build(&build(&before), Target::Interactive));
        live.reconcile(&target);

        prop_assert_eq!(live.to_tree(), Some(target));
    }

    /// Free text is always embedded escaped
    #[test]
    fn name_is_escaped(name in "[a-z]{1,4}<[a-z]{1,6}>") {
        let mut state = CardState::default();
        state.set_input("name", name.as_str());
        let html = RenderEngine::default().static_markup(&state);

        prop_assert!(html.contains(&escape_markup(&name)));
        prop_assert!(!html.contains(&name));
    }

    /// Every link on the card starts with an allowed scheme
    #[test]
    fn hrefs_use_allowed_schemes(
        website in link_value_strategy(),
        email in link_value_strategy(),
        socials in prop::collection::vec(
            (prop_oneof![Just("instagram"), Just("mastodon"), Just("whatsapp")], link_value_strategy()),
            0..4,
        ),
    ) {
        let mut state = CardState::default();
        state.static_link_mut(StaticPlatform::Website).value = website;
        state.static_link_mut(StaticPlatform::Email).value = email;
        for (platform, value) in socials {
            state.dynamic_social_links.push(SocialItem::new(platform, value));
        }
        let tree = RenderEngine::default().build(&state, Target::Static);

        for href in tree.descendants().into_iter().filter_map(|n| n.get_attr("href")) {
            let scheme = href.split_once(':').map(|(scheme, _)| scheme).unwrap_or_default();
            prop_assert!(
                ["http", "https", "mailto", "tel", "sms"].contains(&scheme),
                "unsafe href {}",
                href
            );
        }
    }
}

//! Card layout: a pure mapping from a card description to a display list.
//!
//! All geometry is in logical pixels on a fixed 320x440 card. Text is laid out
//! on an 8px monospace grid so measurement needs no font metrics.

use std::fmt::Write as _;

use crate::card::{CardDescription, MoveSlot};
use crate::ingest::EmbeddableImage;
use crate::rendering::palette::{self, Color};

pub const CARD_WIDTH: u32 = 320;
pub const CARD_HEIGHT: u32 = 440;
/// Width and height of one glyph cell at text scale 1.
pub const GLYPH: u32 = 8;

const PAD: i32 = 20;
const INNER_WIDTH: u32 = CARD_WIDTH - 2 * PAD as u32;
const IMAGE_TOP: i32 = 72;
const IMAGE_HEIGHT: u32 = 176;
const MOVES_TOP: i32 = 256;
const MOVE_PAD: i32 = 8;
const MOVE_GAP: i32 = 8;
const LINE_HEIGHT: u32 = 10;
const MAX_DESCRIPTION_LINES: usize = 3;
const FOOTER_TOP: i32 = 420;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn inset(&self, d: u32) -> Rect {
        Rect {
            x: self.x + d as i32,
            y: self.y + d as i32,
            width: self.width.saturating_sub(2 * d),
            height: self.height.saturating_sub(2 * d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fill {
    Solid(Color),
    /// Top-to-bottom gradient; stops are `(percent, color)` in ascending order.
    Vertical(Vec<(u8, Color)>),
    /// Top-left to bottom-right gradient.
    Diagonal(Color, Color),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxStyle {
    pub fill: Option<Fill>,
    pub border: Option<(u32, Color)>,
    pub radius: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextRun {
    pub text: String,
    pub scale: u32,
    pub color: Color,
    pub bold: bool,
    /// Advance between lines of a multi-line run, at scale 1.
    pub line_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Content {
    Box(BoxStyle),
    Disc(Color),
    Text(TextRun),
    /// Artwork scaled to cover its rect, clipped to rounded corners.
    Image { image: EmbeddableImage, radius: u32 },
}

/// What part of the card a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Frame,
    Name,
    HitPointsLabel,
    HitPoints,
    TypeBadge,
    TypeLabel,
    ImageFrame,
    Artwork,
    Placeholder,
    PlaceholderCaption,
    Decoration,
    MovePanel(MoveSlot),
    MoveName(MoveSlot),
    MoveDamage(MoveSlot),
    MoveDescription(MoveSlot),
    Footer,
    Trim,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutNode {
    pub section: Section,
    pub rect: Rect,
    pub content: Content,
}

/// The rendered preview: nodes in paint order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisualTree {
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<LayoutNode>,
}

impl VisualTree {
    pub fn find(&self, section: Section) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.section == section)
    }

    /// Text shown by the first text node of `section`.
    pub fn text_of(&self, section: Section) -> Option<&str> {
        self.nodes
            .iter()
            .filter(|n| n.section == section)
            .find_map(|n| match &n.content {
                Content::Text(run) => Some(run.text.as_str()),
                _ => None,
            })
    }

    /// One line per node, for quick inspection.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "card {}x{}", self.width, self.height);
        for n in &self.nodes {
            let r = n.rect;
            let what = match &n.content {
                Content::Box(_) => "box".to_string(),
                Content::Disc(_) => "disc".to_string(),
                Content::Text(run) => format!("{:?}", run.text),
                Content::Image { image, .. } => format!("image {}", image.mime_type()),
            };
            let _ = writeln!(
                out,
                "  {:?} @ ({},{} {}x{}) {}",
                n.section, r.x, r.y, r.width, r.height, what
            );
        }
        out
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale
}

/// Shorten `text` to `max_chars`, marking the cut with "...".
fn fit(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars < 4 {
        return text.chars().take(max_chars).collect();
    }
    let mut s: String = text.chars().take(max_chars - 3).collect();
    s.push_str("...");
    s
}

/// Greedy word wrap on a fixed character grid. Words longer than a line
/// are broken across lines.
fn wrap(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > chars_per_line {
            if !cur.is_empty() {
                lines.push(std::mem::take(&mut cur));
            }
            let rest = word.split_off(chars_per_line);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let cur_len = cur.chars().count();
        if cur_len + word.len() + 1 > chars_per_line && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.extend(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

fn text_node(section: Section, x: i32, y: i32, text: String, scale: u32, color: Color, bold: bool) -> LayoutNode {
    let lines = text.lines().count().max(1) as u32;
    let width = text.lines().map(|l| text_width(l, scale)).max().unwrap_or(0);
    let height = (lines - 1) * LINE_HEIGHT * scale + GLYPH * scale;
    LayoutNode {
        section,
        rect: Rect::new(x, y, width, height),
        content: Content::Text(TextRun {
            text,
            scale,
            color,
            bold,
            line_height: LINE_HEIGHT,
        }),
    }
}

fn boxed(section: Section, rect: Rect, fill: Option<Fill>, border: Option<(u32, Color)>, radius: u32) -> LayoutNode {
    LayoutNode {
        section,
        rect,
        content: Content::Box(BoxStyle { fill, border, radius }),
    }
}

/// Lay out `card`. Pure: equal cards give equal trees.
pub fn layout_card(card: &CardDescription) -> VisualTree {
    let mut nodes = Vec::new();

    nodes.push(boxed(
        Section::Frame,
        Rect::new(0, 0, CARD_WIDTH, CARD_HEIGHT),
        Some(Fill::Vertical(vec![
            (0, palette::YELLOW_200),
            (50, Color::WHITE),
            (100, palette::YELLOW_100),
        ])),
        Some((4, palette::YELLOW_400)),
        16,
    ));

    // Header: type badge first, since the name gets whatever width is left.
    let badge_text = fit(&card.element_type, 12);
    let badge_w = text_width(&badge_text, 1) + 24;
    let badge = Rect::new(CARD_WIDTH as i32 - PAD - badge_w as i32, PAD, badge_w, 20);
    nodes.push(boxed(
        Section::TypeBadge,
        badge,
        Some(Fill::Solid(palette::type_accent(&card.element_type))),
        None,
        10,
    ));
    nodes.push(text_node(Section::TypeLabel, badge.x + 12, badge.y + 6, badge_text, 1, Color::WHITE, false));

    let name = if card.name.is_empty() { "Your Pokémon" } else { card.name.as_str() };
    let name_room = (badge.x - 8 - PAD).max(0) as u32 / (GLYPH * 2);
    nodes.push(text_node(Section::Name, PAD, PAD, fit(name, name_room as usize), 2, palette::GRAY_800, true));
    nodes.push(text_node(Section::HitPointsLabel, PAD, 46, "HP".into(), 1, palette::GRAY_600, false));
    nodes.push(text_node(
        Section::HitPoints,
        PAD + 20,
        42,
        card.hit_points.to_string(),
        2,
        palette::RED_600,
        true,
    ));

    // Image region
    let frame = Rect::new(PAD, IMAGE_TOP, INNER_WIDTH, IMAGE_HEIGHT);
    nodes.push(boxed(
        Section::ImageFrame,
        frame,
        Some(Fill::Diagonal(palette::BLUE_100, palette::BLUE_50)),
        Some((2, palette::BLUE_200)),
        8,
    ));
    match card.image.embedded() {
        Some(image) => nodes.push(LayoutNode {
            section: Section::Artwork,
            rect: frame.inset(2),
            content: Content::Image { image: image.clone(), radius: 6 },
        }),
        None => {
            let cx = frame.x + frame.width as i32 / 2;
            let top = frame.y + (frame.height as i32 - 80) / 2;
            nodes.push(LayoutNode {
                section: Section::Placeholder,
                rect: Rect::new(cx - 32, top, 64, 64),
                content: Content::Disc(palette::GRAY_200),
            });
            let caption = "Upload an image";
            let w = text_width(caption, 1) as i32;
            nodes.push(text_node(
                Section::PlaceholderCaption,
                cx - w / 2,
                top + 72,
                caption.into(),
                1,
                palette::GRAY_400,
                false,
            ));
        }
    }
    for (rect, color) in [
        (Rect::new(frame.x + 8, frame.y + 8, 12, 12), palette::YELLOW_400),
        (Rect::new(frame.right() - 16, frame.y + 8, 8, 8), palette::BLUE_400),
        (Rect::new(frame.x + 8, frame.bottom() - 16, 8, 8), palette::RED_400),
    ] {
        nodes.push(LayoutNode {
            section: Section::Decoration,
            rect,
            content: Content::Disc(color.with_alpha(153)),
        });
    }

    // Moves
    let mut y = MOVES_TOP;
    for (slot, fallback_name, fallback_desc) in [
        (MoveSlot::One, "Move 1", "A basic attack move."),
        (MoveSlot::Two, "Move 2", "A more powerful attack move."),
    ] {
        let mv = card.move_in(slot);
        let content_w = INNER_WIDTH - 2 * MOVE_PAD as u32;
        let chars_per_line = (content_w / GLYPH) as usize;

        let desc = if mv.description.is_empty() { fallback_desc } else { mv.description.as_str() };
        let mut lines = wrap(desc, chars_per_line);
        if lines.len() > MAX_DESCRIPTION_LINES {
            lines.truncate(MAX_DESCRIPTION_LINES);
            let last = fit(&format!("{} ...", lines[MAX_DESCRIPTION_LINES - 1]), chars_per_line);
            lines[MAX_DESCRIPTION_LINES - 1] = last;
        }
        let line_count = lines.len().max(1) as u32;
        let height = 2 * MOVE_PAD as u32 + GLYPH + 6 + line_count * LINE_HEIGHT - 2;

        let panel = Rect::new(PAD, y, INNER_WIDTH, height);
        nodes.push(boxed(
            Section::MovePanel(slot),
            panel,
            Some(Fill::Solid(Color::WHITE)),
            Some((1, palette::GRAY_200)),
            8,
        ));

        let damage = fit(&mv.damage, 8);
        let damage_w = text_width(&damage, 1) as i32;
        nodes.push(text_node(
            Section::MoveDamage(slot),
            panel.right() - MOVE_PAD - damage_w,
            y + MOVE_PAD,
            damage,
            1,
            palette::RED_600,
            true,
        ));

        let name = if mv.name.is_empty() { fallback_name } else { mv.name.as_str() };
        let name_room = (content_w as i32 - damage_w - 8).max(0) as usize / GLYPH as usize;
        nodes.push(text_node(
            Section::MoveName(slot),
            panel.x + MOVE_PAD,
            y + MOVE_PAD,
            fit(name, name_room),
            1,
            palette::GRAY_800,
            true,
        ));
        nodes.push(text_node(
            Section::MoveDescription(slot),
            panel.x + MOVE_PAD,
            y + MOVE_PAD + GLYPH as i32 + 6,
            lines.join("\n"),
            1,
            palette::GRAY_600,
            false,
        ));

        y = panel.bottom() + MOVE_GAP;
    }

    // Footer
    nodes.push(text_node(Section::Footer, PAD, FOOTER_TOP, "Custom Card".into(), 1, palette::GRAY_500, false));
    let rare = "★ Rare";
    nodes.push(text_node(
        Section::Footer,
        CARD_WIDTH as i32 - PAD - text_width(rare, 1) as i32,
        FOOTER_TOP,
        rare.into(),
        1,
        palette::GRAY_500,
        false,
    ));

    nodes.push(boxed(
        Section::Trim,
        Rect::new(0, 0, CARD_WIDTH, CARD_HEIGHT).inset(4),
        None,
        Some((2, palette::YELLOW_300)),
        12,
    ));

    VisualTree {
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardImage;

    #[test]
    fn empty_card_uses_fallback_text() {
        let tree = layout_card(&CardDescription::default());
        assert_eq!(tree.text_of(Section::Name), Some("Your Pokémon"));
        assert_eq!(tree.text_of(Section::MoveName(MoveSlot::One)), Some("Move 1"));
        assert_eq!(tree.text_of(Section::MoveName(MoveSlot::Two)), Some("Move 2"));
        assert_eq!(tree.text_of(Section::HitPoints), Some("100"));
        assert_eq!(tree.text_of(Section::TypeLabel), Some("Normal"));
        assert_eq!(tree.text_of(Section::PlaceholderCaption), Some("Upload an image"));
        assert!(tree.find(Section::Artwork).is_none());
    }

    #[test]
    fn sections_are_in_paint_order() {
        let tree = layout_card(&CardDescription::default());
        let first = |s: Section| tree.nodes.iter().position(|n| n.section == s).unwrap();
        assert_eq!(first(Section::Frame), 0);
        assert!(first(Section::Name) < first(Section::ImageFrame));
        assert!(first(Section::ImageFrame) < first(Section::MovePanel(MoveSlot::One)));
        assert!(first(Section::MovePanel(MoveSlot::One)) < first(Section::MovePanel(MoveSlot::Two)));
        assert!(first(Section::MovePanel(MoveSlot::Two)) < first(Section::Footer));
        assert_eq!(tree.nodes.last().unwrap().section, Section::Trim);
    }

    #[test]
    fn artwork_replaces_placeholder() {
        let mut card = CardDescription::default();
        card.image = CardImage::Embedded(EmbeddableImage::from_bytes("image/png", b"x"));
        let tree = layout_card(&card);
        let art = tree.find(Section::Artwork).expect("artwork node");
        assert_eq!(art.rect, Rect::new(22, 74, 276, 172));
        assert!(tree.find(Section::Placeholder).is_none());
    }

    #[test]
    fn everything_stays_on_the_card() {
        let mut card = CardDescription::default();
        card.name = "An Extraordinarily Long Creature Name".into();
        card.element_type = "Electric".into();
        card.move_one.description = "word ".repeat(80);
        card.move_two.description = "Supercalifragilisticexpialidocious".repeat(6);
        card.move_two.damage = "123456789012".into();
        let tree = layout_card(&card);
        for n in &tree.nodes {
            assert!(n.rect.x >= 0 && n.rect.y >= 0, "{:?}", n);
            assert!(n.rect.right() <= CARD_WIDTH as i32, "{:?}", n);
            assert!(n.rect.bottom() <= CARD_HEIGHT as i32, "{:?}", n);
        }
        let name = tree.text_of(Section::Name).unwrap();
        assert!(name.ends_with("..."));
        let desc = tree.text_of(Section::MoveDescription(MoveSlot::One)).unwrap();
        assert_eq!(desc.lines().count(), MAX_DESCRIPTION_LINES);
    }

    #[test]
    fn badge_color_follows_type_with_fallback() {
        let mut card = CardDescription::default();
        card.element_type = "Nonsense".into();
        let tree = layout_card(&card);
        match &tree.find(Section::TypeBadge).unwrap().content {
            Content::Box(style) => assert_eq!(style.fill, Some(Fill::Solid(palette::FALLBACK_ACCENT))),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wrap_breaks_long_words() {
        assert_eq!(wrap("aaaaaaa bb", 3), vec!["aaa", "aaa", "a", "bb"]);
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert!(wrap("   ", 5).is_empty());
    }

    #[test]
    fn fit_marks_truncation() {
        assert_eq!(fit("Pikachu", 10), "Pikachu");
        assert_eq!(fit("Pikachu", 6), "Pik...");
        assert_eq!(fit("Pikachu", 2), "Pi");
    }
}

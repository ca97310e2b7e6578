//! Colors used by the card layout and the type-to-accent lookup

use crate::card::ElementType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
            a: 255,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const WHITE: Color = Color::hex(0xffffff);
}

pub const YELLOW_100: Color = Color::hex(0xfef9c3);
pub const YELLOW_200: Color = Color::hex(0xfef08a);
pub const YELLOW_300: Color = Color::hex(0xfde047);
pub const YELLOW_400: Color = Color::hex(0xfacc15);
pub const BLUE_50: Color = Color::hex(0xeff6ff);
pub const BLUE_100: Color = Color::hex(0xdbeafe);
pub const BLUE_200: Color = Color::hex(0xbfdbfe);
pub const BLUE_400: Color = Color::hex(0x60a5fa);
pub const RED_400: Color = Color::hex(0xf87171);
pub const RED_600: Color = Color::hex(0xdc2626);
pub const GRAY_200: Color = Color::hex(0xe5e7eb);
pub const GRAY_400: Color = Color::hex(0x9ca3af);
pub const GRAY_500: Color = Color::hex(0x6b7280);
pub const GRAY_600: Color = Color::hex(0x4b5563);
pub const GRAY_800: Color = Color::hex(0x1f2937);

/// Badge color for types outside the canonical set.
pub const FALLBACK_ACCENT: Color = GRAY_400;

/// Accent color for a canonical type.
pub fn accent(t: ElementType) -> Color {
    match t {
        ElementType::Normal => GRAY_400,
        ElementType::Fire => Color::hex(0xef4444),
        ElementType::Water => Color::hex(0x3b82f6),
        ElementType::Electric => YELLOW_400,
        ElementType::Grass => Color::hex(0x22c55e),
        ElementType::Ice => Color::hex(0x67e8f9),
        ElementType::Fighting => Color::hex(0xb91c1c),
        ElementType::Poison => Color::hex(0xa855f7),
        ElementType::Ground => Color::hex(0xca8a04),
        ElementType::Flying => Color::hex(0x818cf8),
        ElementType::Psychic => Color::hex(0xec4899),
        ElementType::Bug => Color::hex(0x4ade80),
        ElementType::Rock => Color::hex(0x854d0e),
        ElementType::Ghost => Color::hex(0x7e22ce),
        ElementType::Dragon => Color::hex(0x4338ca),
        ElementType::Dark => GRAY_800,
        ElementType::Steel => GRAY_500,
        ElementType::Fairy => Color::hex(0xf9a8d4),
    }
}

/// Accent color for whatever text sits in the card's type field.
pub fn type_accent(element_type: &str) -> Color {
    element_type
        .parse::<ElementType>()
        .map(accent)
        .unwrap_or(FALLBACK_ACCENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(Color::hex(0x102030), Color { r: 0x10, g: 0x20, b: 0x30, a: 255 });
        assert_eq!(Color::hex(0x102030).with_alpha(7).a, 7);
    }

    #[test]
    fn unknown_types_fall_back() {
        assert_eq!(type_accent("Cosmic"), FALLBACK_ACCENT);
        assert_eq!(type_accent(""), FALLBACK_ACCENT);
        assert_eq!(type_accent("fire"), FALLBACK_ACCENT);
        assert_eq!(type_accent("Fire"), Color::hex(0xef4444));
    }

    #[test]
    fn every_canonical_type_has_an_entry() {
        for t in ElementType::ALL {
            assert_eq!(type_accent(t.as_str()), accent(t));
        }
    }
}

//! The card description being edited.
//!
//! A `CardDescription` is a plain value: the store replaces it wholesale on
//! every edit, the renderer reads it, the exporter checks it. Nothing here
//! validates ranges; the hit-point range is a contract of the input control,
//! not of the stored value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ingest::EmbeddableImage;
use crate::{Error, Result};

/// Lowest value the hit-point control offers.
pub const HP_MIN: i32 = 10;
/// Highest value the hit-point control offers.
pub const HP_MAX: i32 = 200;
/// Step of the hit-point control.
pub const HP_STEP: i32 = 10;

/// Whether `hp` is a value the hit-point control can produce.
pub fn is_slider_value(hp: i32) -> bool {
    (HP_MIN..=HP_MAX).contains(&hp) && (hp - HP_MIN) % HP_STEP == 0
}

/// The closed set of canonical element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl ElementType {
    /// All canonical types, in the order the type picker lists them.
    pub const ALL: [ElementType; 18] = [
        ElementType::Normal,
        ElementType::Fire,
        ElementType::Water,
        ElementType::Electric,
        ElementType::Grass,
        ElementType::Ice,
        ElementType::Fighting,
        ElementType::Poison,
        ElementType::Ground,
        ElementType::Flying,
        ElementType::Psychic,
        ElementType::Bug,
        ElementType::Rock,
        ElementType::Ghost,
        ElementType::Dragon,
        ElementType::Dark,
        ElementType::Steel,
        ElementType::Fairy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Normal => "Normal",
            ElementType::Fire => "Fire",
            ElementType::Water => "Water",
            ElementType::Electric => "Electric",
            ElementType::Grass => "Grass",
            ElementType::Ice => "Ice",
            ElementType::Fighting => "Fighting",
            ElementType::Poison => "Poison",
            ElementType::Ground => "Ground",
            ElementType::Flying => "Flying",
            ElementType::Psychic => "Psychic",
            ElementType::Bug => "Bug",
            ElementType::Rock => "Rock",
            ElementType::Ghost => "Ghost",
            ElementType::Dragon => "Dragon",
            ElementType::Dark => "Dark",
            ElementType::Steel => "Steel",
            ElementType::Fairy => "Fairy",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidField(format!("unknown element type {:?}", s)))
    }
}

/// One of the two move panels on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveSlot {
    One,
    Two,
}

/// A leaf field inside a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveField {
    Name,
    Damage,
    Description,
}

/// A move as shown on the card. `damage` is display text and is never
/// parsed as a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    pub damage: String,
    pub description: String,
}

impl Move {
    pub fn new(name: &str, damage: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            damage: damage.to_string(),
            description: description.to_string(),
        }
    }

    pub fn field(&self, field: MoveField) -> &str {
        match field {
            MoveField::Name => &self.name,
            MoveField::Damage => &self.damage,
            MoveField::Description => &self.description,
        }
    }

    pub fn field_mut(&mut self, field: MoveField) -> &mut String {
        match field {
            MoveField::Name => &mut self.name,
            MoveField::Damage => &mut self.damage,
            MoveField::Description => &mut self.description,
        }
    }
}

/// The card's artwork slot.
///
/// `Cleared` is distinct from `Absent`: the user removed an upload rather
/// than never providing one. Both block export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "Option<String>")]
pub enum CardImage {
    #[default]
    Absent,
    Cleared,
    Embedded(EmbeddableImage),
}

impl CardImage {
    pub fn embedded(&self) -> Option<&EmbeddableImage> {
        match self {
            CardImage::Embedded(img) => Some(img),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.embedded().is_some()
    }
}

impl TryFrom<Option<String>> for CardImage {
    type Error = Error;

    fn try_from(value: Option<String>) -> Result<Self> {
        match value {
            None => Ok(CardImage::Absent),
            Some(s) if s.is_empty() => Ok(CardImage::Cleared),
            Some(s) => EmbeddableImage::from_data_uri(&s).map(CardImage::Embedded),
        }
    }
}

impl From<CardImage> for Option<String> {
    fn from(value: CardImage) -> Self {
        match value {
            CardImage::Absent => None,
            CardImage::Cleared => Some(String::new()),
            CardImage::Embedded(img) => Some(img.as_data_uri().to_string()),
        }
    }
}

/// The single record describing the card being edited.
///
/// `element_type` is kept as text: the type picker only offers
/// [`ElementType::ALL`], but any string can arrive through the form
/// boundary or a loaded card file and the renderer must cope with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDescription {
    pub name: String,
    #[serde(default)]
    pub image: CardImage,
    #[serde(alias = "hp")]
    pub hit_points: i32,
    #[serde(alias = "type")]
    pub element_type: String,
    #[serde(alias = "move1")]
    pub move_one: Move,
    #[serde(alias = "move2")]
    pub move_two: Move,
}

impl Default for CardDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: CardImage::Absent,
            hit_points: 100,
            element_type: ElementType::Normal.as_str().to_string(),
            move_one: Move::new("", "20", "A basic attack move."),
            move_two: Move::new("", "40", "A more powerful attack move."),
        }
    }
}

impl CardDescription {
    pub fn move_in(&self, slot: MoveSlot) -> &Move {
        match slot {
            MoveSlot::One => &self.move_one,
            MoveSlot::Two => &self.move_two,
        }
    }

    pub fn move_in_mut(&mut self, slot: MoveSlot) -> &mut Move {
        match slot {
            MoveSlot::One => &mut self.move_one,
            MoveSlot::Two => &mut self.move_two,
        }
    }

    /// The canonical element type, if `element_type` names one.
    pub fn canonical_type(&self) -> Option<ElementType> {
        self.element_type.parse().ok()
    }

    /// Why this card cannot be exported yet, if it cannot.
    pub fn export_blocker(&self) -> Option<&'static str> {
        if !self.image.is_present() {
            Some("no image has been uploaded")
        } else if self.name.is_empty() {
            Some("the card has no name")
        } else {
            None
        }
    }
}

//! The card record store.
//!
//! Holds the single live [`CardDescription`]. Every edit replaces exactly one
//! field, publishes a fresh immutable snapshot and notifies subscribers. The
//! store never validates values; export-time checks do that.
//!
//! Edits are expressed as a closed set of [`CardUpdate`]s. Form events that
//! arrive as `("moveOne.name", value)` pairs go through [`FieldPath`], which
//! only knows the paths that exist.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;

use crate::card::{CardDescription, CardImage, MoveField, MoveSlot};
use crate::{Error, Result};

type Subscriber = Box<dyn Fn(&Arc<CardDescription>) + Send + Sync>;

/// Address of one leaf field of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Name,
    Image,
    HitPoints,
    ElementType,
    Move(MoveSlot, MoveField),
}

impl FieldPath {
    /// Every addressable field.
    pub const ALL: [FieldPath; 10] = [
        FieldPath::Name,
        FieldPath::Image,
        FieldPath::HitPoints,
        FieldPath::ElementType,
        FieldPath::Move(MoveSlot::One, MoveField::Name),
        FieldPath::Move(MoveSlot::One, MoveField::Damage),
        FieldPath::Move(MoveSlot::One, MoveField::Description),
        FieldPath::Move(MoveSlot::Two, MoveField::Name),
        FieldPath::Move(MoveSlot::Two, MoveField::Damage),
        FieldPath::Move(MoveSlot::Two, MoveField::Description),
    ];

    /// Pair this path with a primitive form value.
    ///
    /// Text fields take numbers as their decimal rendering; the hit-point
    /// field takes text only if it parses as an integer.
    pub fn with_value(self, value: FieldValue) -> Result<CardUpdate> {
        let text = match (self, value) {
            (FieldPath::Image, FieldValue::Image(img)) => return Ok(CardUpdate::Image(img)),
            (FieldPath::Image, other) => {
                return Err(Error::InvalidField(format!("image cannot be set from {:?}", other)))
            }
            (_, FieldValue::Image(_)) => {
                return Err(Error::InvalidField(format!("{} does not hold an image", self)))
            }
            (FieldPath::HitPoints, FieldValue::Number(n)) => return Ok(CardUpdate::HitPoints(n)),
            (FieldPath::HitPoints, FieldValue::Text(s)) => {
                let n = s.trim().parse::<i32>().map_err(|_| {
                    Error::InvalidField(format!("hitPoints expects an integer, got {:?}", s))
                })?;
                return Ok(CardUpdate::HitPoints(n));
            }
            (_, FieldValue::Number(n)) => n.to_string(),
            (_, FieldValue::Text(s)) => s,
        };
        match self {
            FieldPath::Name => Ok(CardUpdate::Name(text)),
            FieldPath::ElementType => Ok(CardUpdate::ElementType(text)),
            FieldPath::Move(slot, field) => Ok(CardUpdate::Move(slot, field, text)),
            FieldPath::Image | FieldPath::HitPoints => Err(Error::InvalidField(format!(
                "{} does not take text",
                self
            ))),
        }
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    /// Parse a top-level field name or a two-segment `move.field` path.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('.');
        let head = parts.next().unwrap_or_default();
        let leaf = parts.next();
        if parts.next().is_some() {
            return Err(Error::InvalidField(format!("path too deep: {:?}", s)));
        }

        match (head, leaf) {
            ("name", None) => Ok(FieldPath::Name),
            ("image", None) => Ok(FieldPath::Image),
            ("hitPoints" | "hp", None) => Ok(FieldPath::HitPoints),
            ("elementType" | "type", None) => Ok(FieldPath::ElementType),
            (group, Some(leaf)) => {
                let slot = match group {
                    "moveOne" | "move1" => MoveSlot::One,
                    "moveTwo" | "move2" => MoveSlot::Two,
                    _ => return Err(Error::InvalidField(format!("unknown group in {:?}", s))),
                };
                let field = match leaf {
                    "name" | "moveName" => MoveField::Name,
                    "damage" | "damageText" => MoveField::Damage,
                    "description" => MoveField::Description,
                    _ => return Err(Error::InvalidField(format!("unknown move field in {:?}", s))),
                };
                Ok(FieldPath::Move(slot, field))
            }
            _ => Err(Error::InvalidField(format!("unknown field {:?}", s))),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Name => f.write_str("name"),
            FieldPath::Image => f.write_str("image"),
            FieldPath::HitPoints => f.write_str("hitPoints"),
            FieldPath::ElementType => f.write_str("elementType"),
            FieldPath::Move(slot, field) => {
                let group = match slot {
                    MoveSlot::One => "moveOne",
                    MoveSlot::Two => "moveTwo",
                };
                let leaf = match field {
                    MoveField::Name => "name",
                    MoveField::Damage => "damage",
                    MoveField::Description => "description",
                };
                write!(f, "{}.{}", group, leaf)
            }
        }
    }
}

/// A primitive value emitted by a form control.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(i32),
    Image(CardImage),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n)
    }
}

/// A whole-field replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum CardUpdate {
    Name(String),
    Image(CardImage),
    HitPoints(i32),
    ElementType(String),
    Move(MoveSlot, MoveField, String),
}

impl CardUpdate {
    pub fn path(&self) -> FieldPath {
        match self {
            CardUpdate::Name(_) => FieldPath::Name,
            CardUpdate::Image(_) => FieldPath::Image,
            CardUpdate::HitPoints(_) => FieldPath::HitPoints,
            CardUpdate::ElementType(_) => FieldPath::ElementType,
            CardUpdate::Move(slot, field, _) => FieldPath::Move(*slot, *field),
        }
    }

    /// Apply to a card, producing the next card.
    pub fn apply(self, card: &CardDescription) -> CardDescription {
        let mut next = card.clone();
        match self {
            CardUpdate::Name(v) => next.name = v,
            CardUpdate::Image(v) => next.image = v,
            CardUpdate::HitPoints(v) => next.hit_points = v,
            CardUpdate::ElementType(v) => next.element_type = v,
            CardUpdate::Move(slot, field, v) => *next.move_in_mut(slot).field_mut(field) = v,
        }
        next
    }
}

/// Owner of the live card.
pub struct CardStore {
    current: Arc<CardDescription>,
    revision: u64,
    subscribers: Vec<Subscriber>,
}

impl Default for CardStore {
    fn default() -> Self {
        Self::new(CardDescription::default())
    }
}

impl CardStore {
    pub fn new(initial: CardDescription) -> Self {
        Self {
            current: Arc::new(initial),
            revision: 0,
            subscribers: Vec::new(),
        }
    }

    /// The current snapshot. Snapshots are never mutated after publication.
    pub fn snapshot(&self) -> Arc<CardDescription> {
        Arc::clone(&self.current)
    }

    /// Number of snapshots published since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback invoked with every new snapshot.
    pub fn subscribe<F>(&mut self, cb: F)
    where
        F: Fn(&Arc<CardDescription>) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(cb));
    }

    /// Replace one field. Always succeeds.
    pub fn update(&mut self, update: CardUpdate) -> Arc<CardDescription> {
        debug!("store: update {}", update.path());
        let next = update.apply(&self.current);
        self.publish(next)
    }

    /// Apply a form event addressed by a dotted path.
    pub fn update_path(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<Arc<CardDescription>> {
        let update = path.parse::<FieldPath>()?.with_value(value.into())?;
        Ok(self.update(update))
    }

    /// Replace the whole card, e.g. with a randomized copy.
    pub fn replace(&mut self, card: CardDescription) -> Arc<CardDescription> {
        debug!("store: replace card");
        self.publish(card)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Arc<CardDescription> {
        self.update(CardUpdate::Name(name.into()))
    }

    pub fn set_image(&mut self, image: CardImage) -> Arc<CardDescription> {
        self.update(CardUpdate::Image(image))
    }

    pub fn set_hit_points(&mut self, hp: i32) -> Arc<CardDescription> {
        self.update(CardUpdate::HitPoints(hp))
    }

    pub fn set_element_type(&mut self, element_type: impl Into<String>) -> Arc<CardDescription> {
        self.update(CardUpdate::ElementType(element_type.into()))
    }

    pub fn set_move_field(
        &mut self,
        slot: MoveSlot,
        field: MoveField,
        value: impl Into<String>,
    ) -> Arc<CardDescription> {
        self.update(CardUpdate::Move(slot, field, value.into()))
    }

    fn publish(&mut self, next: CardDescription) -> Arc<CardDescription> {
        self.current = Arc::new(next);
        self.revision += 1;
        for cb in &self.subscribers {
            cb(&self.current);
        }
        Arc::clone(&self.current)
    }
}

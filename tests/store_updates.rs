//! Field updates through the store touch exactly one field.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pokecard::{CardDescription, CardImage, CardStore, FieldPath, FieldValue, MoveField, MoveSlot};

fn value_for(path: FieldPath) -> FieldValue {
    match path {
        FieldPath::Image => FieldValue::Image(CardImage::Cleared),
        FieldPath::HitPoints => FieldValue::Number(170),
        _ => FieldValue::Text("changed".to_string()),
    }
}

/// Every field of `a` except the one at `path` equals `b`'s.
fn others_equal(a: &CardDescription, b: &CardDescription, path: FieldPath) -> bool {
    let mut a = a.clone();
    let b = b.clone();
    match path {
        FieldPath::Name => a.name = b.name.clone(),
        FieldPath::Image => a.image = b.image.clone(),
        FieldPath::HitPoints => a.hit_points = b.hit_points,
        FieldPath::ElementType => a.element_type = b.element_type.clone(),
        FieldPath::Move(slot, field) => {
            *a.move_in_mut(slot).field_mut(field) = b.move_in(slot).field(field).to_string()
        }
    }
    a == b
}

#[test]
fn every_path_changes_only_its_target() {
    for path in FieldPath::ALL {
        let mut store = CardStore::default();
        let before = store.snapshot();
        let update = path.with_value(value_for(path)).unwrap();
        let after = store.update(update);

        assert_ne!(*after, *before, "{} did not change", path);
        assert!(others_equal(&before, &after, path), "{} touched other fields", path);
    }
}

#[test]
fn dotted_paths_address_move_fields() {
    let mut store = CardStore::default();
    store.update_path("moveOne.name", "Thunder Shock").unwrap();
    store.update_path("moveTwo.damage", "120").unwrap();
    store.update_path("moveTwo.description", "Zap.").unwrap();

    let card = store.snapshot();
    assert_eq!(card.move_one.name, "Thunder Shock");
    assert_eq!(card.move_one.damage, "20");
    assert_eq!(card.move_two.damage, "120");
    assert_eq!(card.move_two.description, "Zap.");
    assert_eq!(card.move_in(MoveSlot::One).field(MoveField::Description), "A basic attack move.");
}

#[test]
fn numbers_and_text_are_accepted_where_meaningful() {
    let mut store = CardStore::default();
    store.update_path("hitPoints", "60").unwrap();
    assert_eq!(store.snapshot().hit_points, 60);

    store.update_path("moveOne.damage", 30).unwrap();
    assert_eq!(store.snapshot().move_one.damage, "30");

    assert!(store.update_path("hitPoints", "lots").is_err());
    assert!(store.update_path("name", FieldValue::Image(CardImage::Cleared)).is_err());
    assert_eq!(store.snapshot().hit_points, 60);
}

#[test]
fn unknown_and_nested_paths_are_rejected() {
    let mut store = CardStore::default();
    for bad in ["", "power", "moveThree.name", "moveOne.power", "moveOne.name.first"] {
        assert!(store.update_path(bad, "x").is_err(), "{:?} was accepted", bad);
    }
    assert_eq!(store.revision(), 0);
}

#[test]
fn snapshots_are_immutable_and_subscribers_see_each_one() {
    let seen = Arc::new(AtomicUsize::new(0));
    let mut store = CardStore::default();
    let counter = Arc::clone(&seen);
    store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let first = store.snapshot();
    store.set_name("Pika");
    store.set_element_type("Electric");
    store.set_hit_points(60);

    assert_eq!(first.name, "");
    assert_eq!(store.snapshot().name, "Pika");
    assert_eq!(store.revision(), 3);
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn arbitrary_type_strings_are_stored_verbatim() {
    let mut store = CardStore::default();
    store.update_path("elementType", "Shadow").unwrap();
    let card = store.snapshot();
    assert_eq!(card.element_type, "Shadow");
    assert!(card.canonical_type().is_none());
}

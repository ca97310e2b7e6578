use std::fs;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use pokecard::rendering::{capture_tree, encode_png};
use pokecard::{render, CardDescription, CardImage, EmbeddableImage};
use sha2::{Digest, Sha256};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn artwork() -> EmbeddableImage {
    let img = RgbaImage::from_fn(32, 32, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([250, 200, 20, 255])
        } else {
            Rgba([40, 40, 40, 255])
        }
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).expect("encode artwork");
    EmbeddableImage::from_bytes("image/png", &buf.into_inner())
}

const YELLOW_300: [u8; 4] = [253, 224, 71, 255];
const YELLOW_400: [u8; 4] = [250, 204, 21, 255];
const GRAY_200: [u8; 4] = [229, 231, 235, 255];
const GRAY_400: [u8; 4] = [156, 163, 175, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn digest_of(bitmap: &RgbaImage) -> String {
    let shot = encode_png(bitmap).expect("encode");
    hex::encode(Sha256::digest(&shot.png_data))
}

/// Capture `card` at 2x and check the pixels every card shares: the
/// transparent rounded corner, the outer border, the trim line and the
/// white midpoint of the frame gradient.
fn capture_card(card: &CardDescription) -> RgbaImage {
    let bitmap = capture_tree(&render(card), 2).expect("capture");
    assert_eq!(bitmap.dimensions(), (640, 880));
    assert_eq!(bitmap.get_pixel(0, 0)[3], 0, "corner is outside the card");
    assert_eq!(bitmap.get_pixel(1, 440).0, YELLOW_400, "border");
    assert_eq!(bitmap.get_pixel(9, 440).0, YELLOW_300, "trim");
    assert_eq!(bitmap.get_pixel(20, 440).0, WHITE, "frame gradient midpoint");
    bitmap
}

fn check_golden(name: &str, bitmap: &RgbaImage) {
    let digest = digest_of(bitmap);

    let expected_path = golden_path(name);
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, &digest).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    if !expected_path.exists() {
        println!(
            "No golden at {:?}; run with UPDATE_GOLDENS=1 to create it. Skipping.",
            expected_path
        );
        return;
    }

    let exp = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(digest, exp.trim(), "{} drifted", name);
}

#[test]
fn golden_default_card() {
    let card = CardDescription::default();
    let bitmap = capture_card(&card);
    // Normal badge and the centre of the placeholder disc.
    assert_eq!(bitmap.get_pixel(460, 60).0, GRAY_400);
    assert_eq!(bitmap.get_pixel(320, 304).0, GRAY_200);

    let again = capture_tree(&render(&card), 2).expect("capture");
    assert_eq!(digest_of(&bitmap), digest_of(&again));
    check_golden("default_card.sha256", &bitmap);
}

#[test]
fn golden_complete_card() {
    let mut card = CardDescription {
        name: "Pika".into(),
        image: CardImage::Embedded(artwork()),
        hit_points: 60,
        element_type: "Electric".into(),
        ..Default::default()
    };
    card.move_one.name = "Thunder Shock".into();
    card.move_two.name = "Volt Tackle".into();
    card.move_two.damage = "120".into();
    let bitmap = capture_card(&card);
    // Electric badge is wider than the Normal one and yellow.
    assert_eq!(bitmap.get_pixel(428, 60).0, YELLOW_400);
    // Artwork replaces the placeholder disc.
    assert_ne!(bitmap.get_pixel(320, 304).0, GRAY_200);
    check_golden("complete_card.sha256", &bitmap);
}

#[test]
fn golden_unknown_type() {
    let card = CardDescription {
        name: "Glitch".into(),
        element_type: "Shadow".into(),
        ..Default::default()
    };
    let bitmap = capture_card(&card);
    assert_eq!(bitmap.get_pixel(460, 60).0, GRAY_400, "fallback accent");
    check_golden("unknown_type.sha256", &bitmap);
}

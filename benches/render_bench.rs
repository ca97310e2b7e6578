use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pokecard::rendering::{capture_tree, encode_png};
use pokecard::{render, CardDescription};

fn sample_card() -> CardDescription {
    let mut card = CardDescription {
        name: "Benchmark".into(),
        element_type: "Fire".into(),
        hit_points: 120,
        ..Default::default()
    };
    card.move_one.name = "Ember".into();
    card.move_two.name = "Flamethrower".into();
    card
}

fn bench_render(c: &mut Criterion) {
    let card = sample_card();
    c.bench_function("render_tree", |b| b.iter(|| render(black_box(&card))));
}

fn bench_capture(c: &mut Criterion) {
    let tree = render(&sample_card());
    c.bench_function("capture_2x", |b| {
        b.iter(|| capture_tree(black_box(&tree), 2).unwrap())
    });
}

fn bench_encode(c: &mut Criterion) {
    let bitmap = capture_tree(&render(&sample_card()), 2).unwrap();
    c.bench_function("encode_png", |b| b.iter(|| encode_png(black_box(&bitmap)).unwrap()));
}

criterion_group!(benches, bench_render, bench_capture, bench_encode);
criterion_main!(benches);

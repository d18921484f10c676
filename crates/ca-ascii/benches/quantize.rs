use std::hint::black_box;

use ca_ascii::luminance::quantize;
use ca_core::charset::CharacterRamp;
use ca_core::frame::SourceImage;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_quantize(c: &mut Criterion) {
    let (w, h) = (200u32, 120u32);
    let data: Vec<u8> = (0..w * h * 3).map(|i| (i % 251) as u8).collect();
    let Ok(img) = SourceImage::from_raw(w, h, data) else {
        return;
    };
    let ramp = CharacterRamp::default();

    c.bench_function("quantize_200x120", |b| {
        b.iter(|| quantize(black_box(&img), black_box(&ramp)));
    });
}

criterion_group!(benches, bench_quantize);
criterion_main!(benches);

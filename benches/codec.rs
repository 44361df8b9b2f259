use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use qoif::{decode_image, encode_image};

fn sample() -> DynamicImage {
    let image = RgbaImage::from_fn(512, 512, |x, y| {
        // flat bands with soft gradients, roughly photo-like for the chunk mix
        let band = ((x / 64 + y / 48) % 5) as u8 * 40;
        Rgba([band + (x % 7) as u8, band, band.wrapping_sub((y % 5) as u8), 255])
    });
    DynamicImage::ImageRgba8(image)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let image = sample();
    let qoi = encode_image(&image).unwrap();
    let mut png = vec![];
    image
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .unwrap();

    c.bench_function("qoif-encode", |b| {
        b.iter(|| black_box(encode_image(black_box(&image)).unwrap()))
    });

    c.bench_function("qoif-decode", |b| {
        b.iter(|| black_box(decode_image(black_box(&qoi)).unwrap()))
    });

    c.bench_function("rapid-qoi-decode", |b| {
        b.iter(|| black_box(rapid_qoi::Qoi::decode_alloc(black_box(&qoi)).unwrap()))
    });

    c.bench_function("image-png-decode", |b| {
        b.iter(|| black_box(image::load_from_memory(black_box(&png)).unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

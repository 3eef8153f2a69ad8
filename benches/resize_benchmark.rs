use batchresize::{FilterType, ImageResizer, ResizeMode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};

fn source_image() -> DynamicImage {
    let image = RgbImage::from_fn(1920, 1080, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]));
    DynamicImage::ImageRgb8(image)
}

fn benchmark_modes(c: &mut Criterion) {
    let image = source_image();
    let resizer = ImageResizer::new();
    let mut group = c.benchmark_group("resize_mode");
    group.sample_size(20);

    let modes = [
        ("contain", ResizeMode::Contain { width: 640, height: 640 }),
        ("width", ResizeMode::ScaleByWidth { width: 640 }),
        ("height", ResizeMode::ScaleByHeight { height: 480 }),
    ];
    for (name, mode) in modes {
        group.bench_with_input(BenchmarkId::from_parameter(name), &mode, |b, &mode| {
            b.iter(|| resizer.resize(black_box(&image), mode).unwrap());
        });
    }
    group.finish();
}

fn benchmark_filters(c: &mut Criterion) {
    let image = source_image();
    let mode = ResizeMode::ScaleByWidth { width: 800 };
    let mut group = c.benchmark_group("resize_filter");
    group.sample_size(20);

    for filter in [FilterType::Nearest, FilterType::Triangle, FilterType::Lanczos3] {
        let resizer = ImageResizer::with_filter(filter);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", filter)), &resizer, |b, resizer| {
            b.iter(|| resizer.resize(black_box(&image), mode).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_modes, benchmark_filters);
criterion_main!(benches);

use std::io::Cursor;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::Array4;
use signsight::classifier::preprocess;
use signsight::{Classifier, ClassifierError, InputSpec, SignModel};

struct ConstantModel;

impl SignModel for ConstantModel {
    fn input_spec(&self) -> InputSpec {
        InputSpec::default()
    }

    fn infer(&self, _input: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        Ok((0..43).map(|i| (i % 7) as f32).collect())
    }
}

fn encoded_image(size: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(size, size, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Preprocessing");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let spec = InputSpec::default();
    for (name, size, format) in [
        ("png_32", 32, ImageFormat::Png),
        ("png_256", 256, ImageFormat::Png),
        ("jpeg_1024", 1024, ImageFormat::Jpeg),
    ] {
        let bytes = encoded_image(size, format);
        group.bench_function(name, |b| b.iter(|| {
            preprocess(black_box(&bytes), &spec).unwrap()
        }));
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let classifier = Classifier::builder()
        .with_model(Arc::new(ConstantModel))
        .build()
        .unwrap();
    let bytes = encoded_image(128, ImageFormat::Png);

    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);

    group.bench_function("rank_logits", |b| b.iter(|| {
        classifier.rank(black_box((0..43).map(|i| i as f32 * 0.1).collect())).unwrap()
    }));

    group.bench_function("predict_end_to_end", |b| b.iter(|| {
        classifier.predict(black_box(&bytes)).unwrap()
    }));

    group.finish();
}

criterion_group!(benches, bench_preprocessing, bench_prediction);
criterion_main!(benches);

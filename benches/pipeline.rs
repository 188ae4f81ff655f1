use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opencv::core::{Mat, Point, Rect, Scalar, CV_8UC3};
use opencv::imgproc::{circle, rectangle, FILLED, LINE_8};
use opencv::prelude::*;
use smartview::{DetectorConfig, FrameDetectionPipeline, HsvFrameContext};

/// 640x480 desk scene: one post-it per default band plus a yellow disc
fn desk_frame() -> Mat {
    let mut frame =
        Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::new(40.0, 40.0, 40.0, 0.0))
            .unwrap();
    let squares = [
        (Rect::new(60, 60, 110, 110), Scalar::new(0.0, 255.0, 0.0, 0.0)),
        (Rect::new(260, 60, 100, 100), Scalar::new(0.0, 220.0, 255.0, 0.0)),
        (Rect::new(460, 60, 105, 105), Scalar::new(147.0, 20.0, 255.0, 0.0)),
    ];
    for (rect, color) in squares {
        rectangle(&mut frame, rect, color, FILLED, LINE_8, 0).unwrap();
    }
    circle(&mut frame, Point::new(320, 340), 80, Scalar::new(0.0, 220.0, 255.0, 0.0), FILLED, LINE_8, 0)
        .unwrap();
    frame
}

fn benchmark_pipeline(c: &mut Criterion) {
    let config = DetectorConfig::default_post_it();
    let registry = config.registry().unwrap();
    let pipeline = FrameDetectionPipeline::new(&config.processing).unwrap();
    let frame = desk_frame();

    c.bench_function("process_640x480", |b| {
        b.iter(|| pipeline.process(black_box(&frame), registry.bands()).unwrap())
    });

    let context = HsvFrameContext::new();
    c.bench_function("process_and_publish_640x480", |b| {
        b.iter(|| {
            pipeline
                .process_and_publish(black_box(&frame), registry.bands(), &context)
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);

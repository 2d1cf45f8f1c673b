use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use cuesight_image::Image;
use cuesight_imgproc::{draw, filter, hough};

fn bench_hough(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hough Circles");

    for (width, height) in [(320, 240), (640, 480), (1280, 960)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        // a grid of bright disks on a dark table
        let mut image = Image::<u8, 1>::from_size_val([*width, *height].into(), 40).unwrap();
        for cy in (40..*height as i64 - 40).step_by(60) {
            for cx in (40..*width as i64 - 40).step_by(60) {
                draw::draw_filled_circle(&mut image, (cx, cy), 14, [230]);
            }
        }
        let mut blurred = image.clone();
        filter::gaussian_blur(&image, &mut blurred, (5, 5), (0.0, 0.0)).unwrap();

        let config = hough::HoughCirclesConfig::default();

        group.bench_with_input(
            BenchmarkId::new("hough_circles", &parameter_string),
            &blurred,
            |b, i| b.iter(|| black_box(hough::hough_circles(i, &config))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_hough);
criterion_main!(benches);

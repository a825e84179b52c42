use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glance::render::{render_results, result_lines};
use glance::{Category, Classifications, LabelTable, Report, ScoreScale};

fn imagenet_like_labels() -> LabelTable {
    LabelTable::new((0..1001).map(|i| format!("class_{}", i)).collect())
}

fn top5() -> Vec<Classifications> {
    vec![Classifications::new(
        0,
        vec![
            Category::new(207, 0.27),
            Category::new(208, 0.11),
            Category::new(222, 0.04),
            Category::new(1500, 0.02).with_display_name("out of table"),
            Category::new(-1, 0.01),
        ],
    )]
}

fn bench_rendering(c: &mut Criterion) {
    let labels = imagenet_like_labels();
    let results = top5();
    let scale = ScoreScale::default();
    let mut group = c.benchmark_group("Rendering");

    group.bench_function("result_lines", |b| b.iter(|| {
        result_lines(black_box(&results), &labels, &scale)
    }));

    group.bench_function("render_report", |b| b.iter(|| {
        let mut report = Report::new();
        render_results(&mut report, black_box(&results), &labels, &scale);
        report
    }));

    group.finish();
}

fn bench_label_parsing(c: &mut Criterion) {
    let contents: String = (0..1001).map(|i| format!("class_{}\n", i)).collect();
    c.bench_function("parse_labels", |b| b.iter(|| LabelTable::parse(black_box(&contents))));
}

criterion_group!(benches, bench_rendering, bench_label_parsing);
criterion_main!(benches);

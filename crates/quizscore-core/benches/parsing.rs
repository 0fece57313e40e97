use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizscore_core::parser::{lint_instrument, parse_instrument_str};

fn instrument_toml(per_dimension: usize) -> String {
    let mut s = String::from(
        r#"
[instrument]
id = "bench"
name = "Bench"

[[bands]]
min = 0
max = 39
label = "Low"

[[bands]]
min = 40
max = 69
label = "Moderate"

[[bands]]
min = 70
max = 100
label = "High"
"#,
    );
    let dims = ["workload", "control", "support", "recovery"];
    for dim in dims {
        s.push_str(&format!(
            "\n[[dimensions]]\nkey = \"{dim}\"\nlabel = \"{dim}\"\n"
        ));
    }
    for dim in dims {
        for i in 0..per_dimension {
            s.push_str(&format!(
                "\n[[questions]]\nid = \"{dim}-{i}\"\ntext = \"Statement {i} about {dim}\"\ndimension = \"{dim}\"\nreversed = {}\n",
                i % 3 == 0
            ));
        }
    }
    s
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_instrument");

    let small = instrument_toml(4);
    let large = instrument_toml(25);

    group.bench_function("16_questions", |b| {
        b.iter(|| parse_instrument_str(black_box(&small), Path::new("bench.toml")))
    });

    group.bench_function("100_questions", |b| {
        b.iter(|| parse_instrument_str(black_box(&large), Path::new("bench.toml")))
    });

    group.finish();
}

fn bench_lint(c: &mut Criterion) {
    let instrument = parse_instrument_str(&instrument_toml(25), Path::new("bench.toml"))
        .expect("bench instrument parses");
    c.bench_function("lint_100_questions", |b| {
        b.iter(|| lint_instrument(black_box(&instrument)))
    });
}

criterion_group!(benches, bench_parse, bench_lint);
criterion_main!(benches);

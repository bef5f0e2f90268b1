//! Parser throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mex_reg::Registries;
use mex_util::EngineConfig;

fn bench_parser(c: &mut Criterion) {
    let registries = Registries::default();
    let config = EngineConfig::default();

    let arith = "2 + 3 * 4^2 - (5 + 6) / 7";
    let dense = "fact(n) := if(n <= 1, 1, n * fact(n - 1)); {fact(x) for x in 1..10 if x mod 2 == 0}";
    let matrix = "[1, 2; 3, 4] @ [5, 6; 7, 8] + [[1, 0], [0, 1]]";

    let lex = |source: &str| mex_lex::tokenize(source, &registries, &config).unwrap();

    c.bench_function("parse_arith", |b| {
        let tokens = lex(arith);
        b.iter(|| mex_par::parse(black_box(tokens.clone()), &config).unwrap())
    });
    c.bench_function("parse_dense", |b| {
        let tokens = lex(dense);
        b.iter(|| mex_par::parse(black_box(tokens.clone()), &config).unwrap())
    });
    c.bench_function("parse_matrix", |b| {
        let tokens = lex(matrix);
        b.iter(|| mex_par::parse(black_box(tokens.clone()), &config).unwrap())
    });
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);

//! Lexer throughput benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mex_lex::tokenize;
use mex_reg::Registries;
use mex_util::EngineConfig;

fn bench_lexer(c: &mut Criterion) {
    let registries = Registries::default();
    let config = EngineConfig::default();

    let simple = "2 + 3 * 4^2";
    let dense = "fact(n) := if(n <= 1, 1, n * fact(n - 1)); fact(20) + sum({x^2 for x in 1..100})";
    let implicit = "2pi sin(x) 3cos(y) (a)(b) 4!2";

    c.bench_function("lex_simple", |b| {
        b.iter(|| tokenize(black_box(simple), &registries, &config).unwrap())
    });
    c.bench_function("lex_dense", |b| {
        b.iter(|| tokenize(black_box(dense), &registries, &config).unwrap())
    });
    c.bench_function("lex_implicit_mult", |b| {
        b.iter(|| tokenize(black_box(implicit), &registries, &config).unwrap())
    });
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);

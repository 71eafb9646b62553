use criterion::{Criterion, black_box, criterion_group, criterion_main};

use cu16_core::{Command, build_simple, build_status, build_two_data, make_address, parse_status};

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_simple", |b| {
        b.iter(|| build_simple(black_box(make_address(3, 7)), black_box(Command::UnlockOne.into())))
    });
    
    c.bench_function("build_two_data", |b| {
        b.iter(|| build_two_data(black_box(0x10), black_box(Command::SetUnlockTime.into()), black_box(500)))
    });
}

fn bench_parse(c: &mut Criterion) {
    let frame = build_status(0x30, 0x35, 0x00FF, 0xFF00);
    
    c.bench_function("parse_status", |b| {
        b.iter(|| parse_status(black_box(frame.as_bytes())))
    });
}

criterion_group!(benches, bench_build, bench_parse);
criterion_main!(benches);

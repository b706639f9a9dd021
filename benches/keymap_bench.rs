use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hookcore::event::VirtualCode;

fn bench_virtual_code_round_trip(c: &mut Criterion) {
    c.bench_function("virtual_code_from_u16_to_u16", |b| {
        b.iter(|| {
            for raw in 0u16..0x300 {
                let vc = VirtualCode::from_u16(black_box(raw));
                black_box(vc.as_u16());
            }
        })
    });
}

fn bench_virtual_code_name(c: &mut Criterion) {
    c.bench_function("virtual_code_name", |b| {
        b.iter(|| {
            black_box(VirtualCode::KeyA.name());
            black_box(VirtualCode::Enter.name());
            black_box(VirtualCode::VolumeUp.name());
        })
    });
}

criterion_group!(benches, bench_virtual_code_round_trip, bench_virtual_code_name);
criterion_main!(benches);

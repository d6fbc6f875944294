// 2025 Thomas Bicanic – MIT License

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use vecadd_cl::{DeviceKind, VecAdd, device};

fn bench_vec_add(c: &mut Criterion) {
    // Setup einmal, gemessen wird Upload + Kernel + Readback
    let dev = device::select(0, 0, DeviceKind::Gpu).unwrap();
    let mut pipeline = VecAdd::new(dev, false).unwrap();

    let mut group = c.benchmark_group("vec_add");
    for n in [1024_usize, 1 << 16, 1 << 20] {
        let h_a = vec![1.0_f32; n];
        let h_b = vec![2.0_f32; n];
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let out = pipeline.run(&h_a, &h_b).unwrap();
                assert_eq!(out.values[0], 3.0);
            });
        });
    }
    group.finish();
}

fn bench_setup(c: &mut Criterion) {
    c.bench_function("vec_add_setup", |b| {
        b.iter(|| {
            let dev = device::select(0, 0, DeviceKind::Gpu).unwrap();
            VecAdd::new(dev, false).unwrap()
        });
    });
}

// Diese Zeilen sind notwendig, damit Criterion den Benchmark ausführt
criterion_group!(benches, bench_vec_add, bench_setup);
criterion_main!(benches);

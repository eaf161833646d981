use criterion::{criterion_group, criterion_main, Criterion};
use fluid_simulation::{RecordingDevice, Simulation, SphParams};

fn bench_step(c: &mut Criterion) {
    let mut sim = Simulation::new(RecordingDevice::new(), SphParams::default(), 4096, 64)
        .expect("simulation setup");

    c.bench_function("step_4k_recorded", |b| {
        b.iter(|| {
            sim.step(1.0 / 60.0).expect("step");
            sim.device_mut().clear_calls();
        })
    });
}

criterion_group!(benches, bench_step);
criterion_main!(benches);

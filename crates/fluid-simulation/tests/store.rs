use fluid_simulation::{DeviceCall, ParticleStore, RecordedBuffer, RecordingDevice, SimulationError};

#[test]
fn both_buffers_start_identical() {
    for (count, width) in [(1, 1), (4, 2), (100, 10), (257, 7), (3, 10)] {
        let mut device = RecordingDevice::new();
        let store = ParticleStore::initialize(&mut device, count, width).unwrap();
        let [front, back] = *store.buffers().unwrap();

        let front = device.contents(front).unwrap();
        let back = device.contents(back).unwrap();
        assert_eq!(front.len(), count as usize);
        assert_eq!(front, back, "count {} width {}", count, width);
    }
}

#[test]
fn lattice_end_to_end() {
    let mut device = RecordingDevice::new();
    let store = ParticleStore::initialize(&mut device, 4, 2).unwrap();

    for buffer in store.buffers().unwrap() {
        let particles = device.contents(*buffer).unwrap();
        let positions: Vec<[f32; 2]> = particles.iter().map(|p| p.position).collect();
        assert_eq!(
            positions,
            vec![[-1.0, 0.0], [0.0, 0.0], [-1.0, 1.0], [0.0, 1.0]]
        );
        assert!(particles.iter().all(|p| p.velocity == [0.0, 0.0]));
        assert!(particles.iter().all(|p| p.mass == 1.0));
    }
}

#[test]
fn zero_particles_is_rejected_before_allocating() {
    let mut device = RecordingDevice::new();
    let result = ParticleStore::initialize(&mut device, 0, 10);
    assert_eq!(result.err(), Some(SimulationError::InvalidParticleCount(0)));
    assert!(device.calls().is_empty());
}

#[test]
fn zero_lattice_width_is_rejected() {
    let mut device = RecordingDevice::new();
    let result = ParticleStore::initialize(&mut device, 10, 0);
    assert_eq!(result.err(), Some(SimulationError::InvalidLatticeWidth(0)));
    assert!(device.calls().is_empty());
}

#[test]
fn failed_second_allocation_leaves_nothing_behind() {
    let mut device = RecordingDevice::with_allocation_budget(1);
    let result = ParticleStore::initialize(&mut device, 10, 5);

    assert!(matches!(
        result.err(),
        Some(SimulationError::BufferAllocation { .. })
    ));
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(
        device.calls(),
        &[
            DeviceCall::CreateBuffer { buffer: 0, len: 10 },
            DeviceCall::ReleaseBuffer { buffer: 0 },
        ]
    );
}

#[test]
fn release_frees_both_buffers_once() {
    let mut device = RecordingDevice::new();
    let mut store = ParticleStore::initialize(&mut device, 8, 4).unwrap();
    assert_eq!(device.live_buffers(), 2);

    store.release(&mut device).unwrap();
    assert_eq!(device.live_buffers(), 0);
    assert!(store.is_released());
    assert_eq!(device.contents(RecordedBuffer(0)), None);

    assert_eq!(
        store.release(&mut device),
        Err(SimulationError::UseAfterRelease)
    );
    let releases = device
        .calls()
        .iter()
        .filter(|call| matches!(call, DeviceCall::ReleaseBuffer { .. }))
        .count();
    assert_eq!(releases, 2);
}

#[test]
fn released_store_rejects_access() {
    let mut device = RecordingDevice::new();
    let mut store = ParticleStore::initialize(&mut device, 8, 4).unwrap();
    store.release(&mut device).unwrap();

    assert_eq!(store.buffers().err(), Some(SimulationError::UseAfterRelease));
    assert_eq!(store.buffer(0).err(), Some(SimulationError::UseAfterRelease));
    assert_eq!(store.particle_count(), Err(SimulationError::UseAfterRelease));
}

use fluid_physics::lattice;
use fluid_simulation::{
    DeviceCall, KernelBindings, KernelStage, ParticleStore, RecordedBuffer, RecordingDevice,
    Simulation, SimulationError, SphParams,
};
use glam::Vec2;

fn simulation(particle_count: u32, lattice_width: u32) -> Simulation<RecordingDevice> {
    let mut sim = Simulation::new(
        RecordingDevice::new(),
        SphParams::default(),
        particle_count,
        lattice_width,
    )
    .unwrap();
    sim.device_mut().clear_calls();
    sim
}

#[test]
fn initialization_binds_front_to_back() {
    let sim = Simulation::new(RecordingDevice::new(), SphParams::default(), 4, 2).unwrap();
    assert_eq!(
        &sim.device().calls()[2..],
        &[
            DeviceCall::Bind {
                stage: KernelStage::Advection,
                input: 0,
                output: 1
            },
            DeviceCall::Bind {
                stage: KernelStage::Update,
                input: 0,
                output: 1
            },
        ]
    );
    assert_eq!(sim.current_index(), 0);
}

#[test]
fn step_issues_half_full_half() {
    let mut sim = simulation(100, 10);
    sim.step(0.5).unwrap();

    assert_eq!(sim.device().time_steps(), vec![0.25, 0.5, 0.25]);
    assert_eq!(
        sim.device().dispatches(),
        vec![
            (KernelStage::Advection, 1),
            (KernelStage::Update, 1),
            (KernelStage::Advection, 1),
        ]
    );
}

#[test]
fn every_dispatch_sees_its_own_time_step() {
    let mut sim = simulation(16, 4);
    sim.step(0.5).unwrap();
    sim.step(0.1).unwrap();

    let mut last_dt = None;
    let mut seen = Vec::new();
    for call in sim.device().calls() {
        match call {
            DeviceCall::WriteTimeStep(dt) => last_dt = Some(*dt),
            DeviceCall::Dispatch { stage, .. } => seen.push((*stage, last_dt.take())),
            _ => {}
        }
    }

    assert_eq!(
        seen,
        vec![
            (KernelStage::Advection, Some(0.25)),
            (KernelStage::Update, Some(0.5)),
            (KernelStage::Advection, Some(0.25)),
            (KernelStage::Advection, Some(0.05)),
            (KernelStage::Update, Some(0.1)),
            (KernelStage::Advection, Some(0.05)),
        ]
    );
}

#[test]
fn exact_call_sequence_for_one_step() {
    let mut sim = simulation(4, 2);
    sim.set_interaction(Vec2::new(3.0, 7.0));
    sim.step(0.5).unwrap();

    let bind = |stage, input, output| DeviceCall::Bind {
        stage,
        input,
        output,
    };
    let calls = sim.device().calls();

    match &calls[0] {
        DeviceCall::WriteParams(params) => {
            assert_eq!(params.particle_count, 4);
            assert_eq!(params.interaction_point, [3.0, 7.0]);
            assert_eq!(params.pressure_stiffness, 5.0);
            assert_eq!(params.rest_density, 1.0);
            assert_eq!(params.kernel_radius, 2.0);
            assert_eq!(params.viscosity, 1.0);
            assert_eq!(params.domain_size, [50.0, 50.0]);
        }
        other => panic!("expected params first, got {:?}", other),
    }

    assert_eq!(
        &calls[1..],
        &[
            DeviceCall::WriteTimeStep(0.25),
            DeviceCall::Dispatch {
                stage: KernelStage::Advection,
                workgroups: 1
            },
            bind(KernelStage::Advection, 1, 0),
            bind(KernelStage::Update, 1, 0),
            DeviceCall::WriteTimeStep(0.5),
            DeviceCall::Dispatch {
                stage: KernelStage::Update,
                workgroups: 1
            },
            bind(KernelStage::Advection, 0, 1),
            bind(KernelStage::Update, 0, 1),
            DeviceCall::WriteTimeStep(0.25),
            DeviceCall::Dispatch {
                stage: KernelStage::Advection,
                workgroups: 1
            },
            bind(KernelStage::Advection, 1, 0),
            bind(KernelStage::Update, 1, 0),
        ]
    );
}

#[test]
fn no_stage_ever_reads_and_writes_one_buffer() {
    let mut sim = simulation(32, 8);
    for _ in 0..5 {
        sim.step(0.01).unwrap();
    }

    let binds: Vec<_> = sim
        .device()
        .calls()
        .iter()
        .filter_map(|call| match call {
            DeviceCall::Bind { input, output, .. } => Some((*input, *output)),
            _ => None,
        })
        .collect();

    assert_eq!(binds.len(), 5 * 3 * 2);
    assert!(binds.iter().all(|(input, output)| input != output));
    assert!(binds.contains(&(0, 1)));
    assert!(binds.contains(&(1, 0)));
}

#[test]
fn swap_parity() {
    let mut device = RecordingDevice::new();
    let store = ParticleStore::initialize(&mut device, 4, 2).unwrap();
    let mut bindings = KernelBindings::new();
    let initial = bindings.current();

    for swaps in 1..=7u64 {
        bindings.swap(&mut device, &store).unwrap();
        assert_eq!(bindings.generation(), swaps);
        if swaps % 2 == 1 {
            assert_ne!(bindings.current(), initial);
        } else {
            assert_eq!(bindings.current(), initial);
        }
    }
}

#[test]
fn each_step_flips_the_current_buffer() {
    let mut sim = simulation(4, 2);
    let initial = sim.current_index();

    sim.step(0.1).unwrap();
    assert_eq!(sim.generation(), 3);
    assert_ne!(sim.current_index(), initial);

    sim.step(0.1).unwrap();
    assert_eq!(sim.generation(), 6);
    assert_eq!(sim.current_index(), initial);
}

#[test]
fn workgroups_follow_particle_count() {
    let mut sim = simulation(257, 16);
    sim.step(0.1).unwrap();
    assert!(sim
        .device()
        .dispatches()
        .iter()
        .all(|(_, workgroups)| *workgroups == 3));
}

#[test]
fn final_state_lands_in_the_current_buffer() {
    let mut sim = simulation(4, 2);
    for buffer in [RecordedBuffer(0), RecordedBuffer(1)] {
        for particle in sim.device_mut().contents_mut(buffer).unwrap() {
            particle.velocity = [1.0, 2.0];
        }
    }

    sim.step(0.5).unwrap();

    let current = *sim.current_buffer().unwrap();
    let particles = sim.device().contents(current).unwrap();
    for (particle, start) in particles.iter().zip(lattice(4, 2)) {
        assert_eq!(particle.position[0], start.position[0] + 0.5);
        assert_eq!(particle.position[1], start.position[1] + 1.0);
    }
}

#[test]
fn tuned_params_are_pushed_on_the_next_step() {
    let mut sim = simulation(4, 2);
    sim.set_params(SphParams {
        viscosity: 0.25,
        domain_height: 20.0,
        ..SphParams::default()
    });
    sim.step(0.1).unwrap();

    let DeviceCall::WriteParams(params) = &sim.device().calls()[0] else {
        panic!("expected params first");
    };
    assert_eq!(params.viscosity, 0.25);
    assert_eq!(params.domain_size, [50.0, 20.0]);
    assert_eq!(params.interaction_point, [0.0, 0.0]);
}

#[test]
fn stepping_after_release_fails_without_dispatching() {
    let mut sim = simulation(4, 2);
    sim.release().unwrap();
    sim.device_mut().clear_calls();

    assert_eq!(sim.step(0.1), Err(SimulationError::UseAfterRelease));
    assert!(sim.device().dispatches().is_empty());
    assert_eq!(sim.current_buffer().err(), Some(SimulationError::UseAfterRelease));
    assert_eq!(sim.release(), Err(SimulationError::UseAfterRelease));
}

#[test]
fn invalid_configuration_is_fatal_at_construction() {
    let result = Simulation::new(RecordingDevice::new(), SphParams::default(), 0, 10);
    assert_eq!(result.err(), Some(SimulationError::InvalidParticleCount(0)));
}

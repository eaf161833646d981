//! Host-side stand-in for a compute device
//!
//! [`RecordingDevice`] logs every call the stepper makes and keeps particle
//! buffers in host memory. Dispatches honour the buffer contract of the real
//! kernels (read input, write output, never the reverse): advection moves
//! positions by `velocity * dt` and the update stage copies its input, since
//! the force model lives only in the GPU kernels.

use crate::{ComputeDevice, KernelStage, SimParams, SimulationError};
use fluid_physics::{Particle, PARTICLE_WORKGROUP_SIZE};

/// Handle to a buffer owned by a [`RecordingDevice`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedBuffer(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCall {
    CreateBuffer { buffer: usize, len: usize },
    ReleaseBuffer { buffer: usize },
    Bind { stage: KernelStage, input: usize, output: usize },
    WriteParams(SimParams),
    WriteTimeStep(f32),
    Dispatch { stage: KernelStage, workgroups: u32 },
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    buffers: Vec<Option<Vec<Particle>>>,
    bound: [Option<(usize, usize)>; 2],
    time_step: f32,
    /// Allocations that succeed before every further one fails
    allocation_budget: Option<usize>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device that refuses allocations after the first `count`
    pub fn with_allocation_budget(count: usize) -> Self {
        Self {
            allocation_budget: Some(count),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Contents of a live buffer, `None` once released
    pub fn contents(&self, buffer: RecordedBuffer) -> Option<&[Particle]> {
        self.buffers.get(buffer.0)?.as_deref()
    }

    pub fn contents_mut(&mut self, buffer: RecordedBuffer) -> Option<&mut [Particle]> {
        self.buffers.get_mut(buffer.0)?.as_deref_mut()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.iter().filter(|b| b.is_some()).count()
    }

    /// Time increments written, in order
    pub fn time_steps(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::WriteTimeStep(dt) => Some(*dt),
                _ => None,
            })
            .collect()
    }

    /// Dispatched stages, in order
    pub fn dispatches(&self) -> Vec<(KernelStage, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Dispatch { stage, workgroups } => Some((*stage, *workgroups)),
                _ => None,
            })
            .collect()
    }

    fn run(&mut self, stage: KernelStage, workgroups: u32) {
        let Some((input, output)) = self.bound[stage.index()] else {
            log::error!("{:?} dispatched without a binding", stage);
            return;
        };
        let Some(source) = self.buffers.get(input).cloned().flatten() else {
            log::error!("{:?} reads released buffer {}", stage, input);
            return;
        };
        let Some(Some(target)) = self.buffers.get_mut(output) else {
            log::error!("{:?} writes released buffer {}", stage, output);
            return;
        };

        // Invocations past the end of the buffer are bounds-checked away
        let invocations = (workgroups * PARTICLE_WORKGROUP_SIZE) as usize;
        let dt = self.time_step;
        for (index, particle) in source.iter().enumerate().take(invocations) {
            let mut next = *particle;
            if stage == KernelStage::Advection {
                next.position[0] += particle.velocity[0] * dt;
                next.position[1] += particle.velocity[1] * dt;
            }
            target[index] = next;
        }
    }
}

impl ComputeDevice for RecordingDevice {
    type Buffer = RecordedBuffer;

    fn create_particle_buffer(
        &mut self,
        _label: &str,
        particles: &[Particle],
    ) -> Result<RecordedBuffer, SimulationError> {
        if let Some(budget) = self.allocation_budget.as_mut() {
            if *budget == 0 {
                return Err(SimulationError::BufferAllocation {
                    bytes: std::mem::size_of_val(particles) as u64,
                    reason: "allocation budget exhausted".to_string(),
                });
            }
            *budget -= 1;
        }

        let buffer = self.buffers.len();
        self.buffers.push(Some(particles.to_vec()));
        self.calls.push(DeviceCall::CreateBuffer {
            buffer,
            len: particles.len(),
        });
        Ok(RecordedBuffer(buffer))
    }

    fn release_particle_buffer(&mut self, buffer: RecordedBuffer) {
        if let Some(slot) = self.buffers.get_mut(buffer.0) {
            *slot = None;
        }
        self.calls
            .push(DeviceCall::ReleaseBuffer { buffer: buffer.0 });
    }

    fn bind_stage(&mut self, stage: KernelStage, input: &RecordedBuffer, output: &RecordedBuffer) {
        self.bound[stage.index()] = Some((input.0, output.0));
        self.calls.push(DeviceCall::Bind {
            stage,
            input: input.0,
            output: output.0,
        });
    }

    fn write_params(&mut self, params: &SimParams) {
        self.time_step = params.delta_time;
        self.calls.push(DeviceCall::WriteParams(*params));
    }

    fn write_time_step(&mut self, dt: f32) {
        self.time_step = dt;
        self.calls.push(DeviceCall::WriteTimeStep(dt));
    }

    fn dispatch(&mut self, stage: KernelStage, workgroups: u32) {
        self.calls.push(DeviceCall::Dispatch { stage, workgroups });
        self.run(stage, workgroups);
    }
}

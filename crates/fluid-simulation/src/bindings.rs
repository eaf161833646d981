//! Buffer role tracking and per-stage binding

use crate::{ComputeDevice, KernelStage, ParticleStore, SimulationError};

/// Which buffer a stage reads and which it writes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageBinding {
    pub stage: KernelStage,
    pub input: usize,
    pub output: usize,
}

impl StageBinding {
    /// Rejects a binding that reads and writes the same buffer
    pub fn new(stage: KernelStage, input: usize, output: usize) -> Result<Self, SimulationError> {
        if input == output {
            return Err(SimulationError::AliasedBinding {
                stage,
                buffer: input,
            });
        }
        Ok(Self {
            stage,
            input,
            output,
        })
    }
}

/// Tracks which of the two particle buffers is current and keeps every stage
/// bound as (current -> scratch).
///
/// The current index only changes through [`KernelBindings::swap`].
#[derive(Debug, Default)]
pub struct KernelBindings {
    current: usize,
    generation: u64,
}

impl KernelBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding the latest complete state
    pub fn current(&self) -> usize {
        self.current
    }

    /// Buffer the next dispatch writes
    pub fn scratch(&self) -> usize {
        (self.current + 1) % 2
    }

    /// Number of swaps so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn binding(&self, stage: KernelStage) -> Result<StageBinding, SimulationError> {
        StageBinding::new(stage, self.current(), self.scratch())
    }

    /// Bind every stage to (current -> scratch)
    pub fn bind_all<D: ComputeDevice>(
        &self,
        device: &mut D,
        store: &ParticleStore<D::Buffer>,
    ) -> Result<(), SimulationError> {
        let buffers = store.buffers()?;
        for stage in KernelStage::ALL {
            let binding = self.binding(stage)?;
            device.bind_stage(stage, &buffers[binding.input], &buffers[binding.output]);
        }
        Ok(())
    }

    /// Make the scratch buffer current and rebind. Call right after the
    /// dispatch that wrote the scratch buffer.
    pub fn swap<D: ComputeDevice>(
        &mut self,
        device: &mut D,
        store: &ParticleStore<D::Buffer>,
    ) -> Result<(), SimulationError> {
        store.buffers()?;
        self.current = self.scratch();
        self.generation += 1;
        self.bind_all(device, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_buffer_in_and_out_is_rejected() {
        for buffer in 0..2 {
            assert_eq!(
                StageBinding::new(KernelStage::Update, buffer, buffer),
                Err(SimulationError::AliasedBinding {
                    stage: KernelStage::Update,
                    buffer
                })
            );
        }
    }

    #[test]
    fn scratch_is_the_other_buffer() {
        let bindings = KernelBindings::new();
        assert_eq!(bindings.current(), 0);
        assert_eq!(bindings.scratch(), 1);
        assert_eq!(bindings.generation(), 0);
    }

    #[test]
    fn both_current_values_bind_distinct_buffers() {
        let mut bindings = KernelBindings::new();
        for _ in 0..2 {
            for stage in KernelStage::ALL {
                let binding = bindings.binding(stage).unwrap();
                assert_ne!(binding.input, binding.output);
                assert_eq!(binding.input, bindings.current());
            }
            bindings.current = bindings.scratch();
        }
    }
}

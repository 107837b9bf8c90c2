use tracing::debug;

use crate::{
    cpu::Cpu,
    cpu_error::{CpuError, CpuResult},
    harness::{simulator::SimulatedCpu, snapshot::RegisterSnapshot},
    mem::program_memory::ProgramMemory,
    reg::registers::RegisterId,
    target::{Target, TargetFeature},
};

/// The reference simulator: a single AVR core attached to its flash.
pub struct VirtualMachine {
    pub target: Target,
    pub mem: ProgramMemory,
    pub cpu: Cpu,
}

impl VirtualMachine {
    /// Build a new [`VirtualMachine`] instance in its power-on state.
    ///
    /// # Arguments
    ///
    /// * `target` - The [`Target`] describing the simulated part.
    pub fn new(target: &Target) -> Self {
        debug!(
            "building {} with {} bytes of flash and features [{}]",
            target.name(),
            target.flash_size(),
            target
                .features()
                .iter()
                .map(|feature| feature.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            target: target.clone(),
            mem: ProgramMemory::new(target.flash_size()),
            cpu: Cpu::new(target),
        }
    }
}

impl SimulatedCpu for VirtualMachine {
    fn target_name(&self) -> &str {
        self.target.name()
    }

    fn target_has_extended_addressing(&self) -> bool {
        self.target.has(TargetFeature::Rampz)
    }

    fn write_register(&mut self, id: RegisterId, value: u8) -> CpuResult<()> {
        if !id.is_general() {
            return Err(CpuError::NotGeneralPurpose(id));
        }

        self.cpu.registers.write_general(id, value);
        Ok(())
    }

    fn read_register(&self, id: RegisterId) -> CpuResult<u8> {
        if !id.is_general() {
            return Err(CpuError::NotGeneralPurpose(id));
        }

        Ok(self.cpu.registers.read_general(id))
    }

    fn write_extension_register(&mut self, value: u8) -> CpuResult<()> {
        if self.cpu.registers.set_rampz(value) {
            Ok(())
        } else {
            Err(CpuError::MissingRegister(RegisterId::RAMPZ))
        }
    }

    fn read_extension_register(&self) -> Option<u8> {
        self.cpu.registers.rampz()
    }

    fn write_program_word(&mut self, byte_address: u32, word: u16) {
        self.mem.write_word(byte_address, word);
    }

    fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot::capture(&self.cpu.registers)
    }

    fn execute_one_instruction(&mut self, opcode: u16) -> CpuResult<RegisterSnapshot> {
        self.cpu.execute_word(&self.mem, opcode)?;

        Ok(self.snapshot())
    }
}

use tracing::trace;

use crate::{
    cpu_error::{CpuError, CpuResult},
    ins::instruction::Instruction,
    mem::program_memory::ProgramMemory,
    reg::registers::{RegisterId, Registers},
    target::{Target, TargetFeature},
    utils,
};

pub struct Cpu {
    /// The registers associated with this CPU.
    pub registers: Registers,
    /// The value of the stack pointer after reset.
    reset_sp: u16,
    /// The number of instructions retired since the last reset.
    retired: u64,
}

impl Cpu {
    /// Build a CPU core for a specific part.
    ///
    /// # Arguments
    ///
    /// * `target` - The [`Target`] describing the part.
    pub fn new(target: &Target) -> Self {
        Self {
            registers: Registers::new(target.has(TargetFeature::Rampz), target.ram_end()),
            reset_sp: target.ram_end(),
            retired: 0,
        }
    }

    /// Get the 24-bit RAMPZ:Z pointer.
    #[inline(always)]
    fn extended_z(&self, ins: &Instruction) -> CpuResult<u32> {
        let rampz = self
            .registers
            .rampz()
            .ok_or(CpuError::UnsupportedInstruction(*ins))?;

        Ok(utils::compose_extended_address(rampz, self.registers.z()))
    }

    /// Set the 24-bit RAMPZ:Z pointer.
    #[inline(always)]
    fn set_extended_z(&mut self, address: u32) -> CpuResult<()> {
        let (rampz, z) = utils::split_extended_address(address);
        self.registers.set_z(z);
        if !self.registers.set_rampz(rampz) {
            return Err(CpuError::MissingRegister(RegisterId::RAMPZ));
        }

        Ok(())
    }

    /// Get the program counter, as a word address.
    #[inline(always)]
    pub fn get_program_counter(&self) -> u32 {
        self.registers.pc()
    }

    /// The number of instructions retired since the last reset.
    #[inline(always)]
    pub fn get_retired_count(&self) -> u64 {
        self.retired
    }

    /// Advance the program counter, wrapping around the end of program memory.
    #[inline(always)]
    fn increase_pc_by(&mut self, words: u32, mem: &ProgramMemory) {
        let pc = (self.registers.pc() + words) % mem.len_words() as u32;
        self.registers.set_pc(pc);
    }

    /// Reset the CPU to its power-on state.
    pub fn reset(&mut self) {
        self.registers = Registers::new(self.registers.rampz().is_some(), self.reset_sp);
        self.retired = 0;
    }

    /// Decode and execute a single raw instruction word.
    ///
    /// # Arguments
    ///
    /// * `mem` - The [`ProgramMemory`] the instruction reads from.
    /// * `word` - The raw instruction word.
    ///
    /// # Returns
    ///
    /// The executed [`Instruction`], or a [`CpuError`] if it could not be executed. A failed instruction
    /// leaves the register file untouched.
    pub fn execute_word(&mut self, mem: &ProgramMemory, word: u16) -> CpuResult<Instruction> {
        let ins = Instruction::decode(word)?;
        self.run_instruction(mem, &ins)?;

        Ok(ins)
    }

    /// Execute a single decoded instruction.
    ///
    /// # Arguments
    ///
    /// * `mem` - The [`ProgramMemory`] the instruction reads from.
    /// * `ins` - The [`Instruction`] to be executed.
    pub fn run_instruction(&mut self, mem: &ProgramMemory, ins: &Instruction) -> CpuResult<()> {
        let address = self.extended_z(ins)?;
        let value = mem.read_byte(address);

        trace!("{ins}: [{address:06x}] -> {value:02x}");

        self.registers.write_general(ins.destination(), value);

        if ins.post_increments() {
            self.set_extended_z(utils::increment_extended_address(address))?;
        }

        self.increase_pc_by(ins.size_words(), mem);
        self.retired += 1;

        Ok(())
    }
}

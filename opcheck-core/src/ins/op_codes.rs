use num_derive::FromPrimitive;
use strum_macros::EnumIter;

/// The bits of a register-form ELPM opcode that hold the destination register.
pub const DESTINATION_MASK: u16 = 0b0000_0001_1111_0000;
/// The position of the lowest destination register bit.
pub const DESTINATION_SHIFT: u16 = 4;

/// The opcode for an instruction.
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialOrd, Ord, PartialEq, Hash, FromPrimitive, EnumIter)]
pub enum OpCode {
    /// Extended load from program memory into R0, from RAMPZ:Z.
    ///
    /// `1001 0101 1101 1000`
    Elpm = 0b1001_0101_1101_1000,
    /// Extended load from program memory into Rd, from RAMPZ:Z.
    ///
    /// `1001 000d dddd 0110`
    ElpmZ = 0b1001_0000_0000_0110,
    /// Extended load from program memory into Rd, from RAMPZ:Z, then post-increment RAMPZ:Z.
    ///
    /// `1001 000d dddd 0111`
    ElpmZInc = 0b1001_0000_0000_0111,
}

impl OpCode {
    /// Does this opcode carry a destination register field?
    #[inline(always)]
    pub fn has_destination(&self) -> bool {
        !matches!(self, OpCode::Elpm)
    }

    /// Split a raw instruction word into its opcode and destination register index.
    ///
    /// # Arguments
    ///
    /// * `word` - The raw instruction word.
    ///
    /// # Returns
    ///
    /// An option containing the [`OpCode`] and the destination register index, or None if the word is not
    /// a member of the ELPM family.
    pub fn split(word: u16) -> Option<(OpCode, u8)> {
        if word == OpCode::Elpm as u16 {
            return Some((OpCode::Elpm, 0));
        }

        // The implied form sets bits inside the destination field, so a masked word never matches it.
        let base = word & !DESTINATION_MASK;
        let destination = ((word & DESTINATION_MASK) >> DESTINATION_SHIFT) as u8;
        let op: OpCode = num_traits::FromPrimitive::from_u16(base)?;

        Some((op, destination))
    }

    /// Build a raw instruction word from this opcode and a destination register index.
    #[inline(always)]
    pub fn join(&self, destination: u8) -> u16 {
        if self.has_destination() {
            *self as u16 | ((destination as u16) << DESTINATION_SHIFT) & DESTINATION_MASK
        } else {
            *self as u16
        }
    }
}

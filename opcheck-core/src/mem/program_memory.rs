use crate::utils::{EXTENDED_ADDRESS_MASK, WORD_ALIGN_MASK};

/*
 * Program memory is organised in 16-bit words but addressed by the ELPM family
 * at byte granularity. Words are stored little endian: the low byte of a word
 * lives at the even address, the high byte at the following odd address.
 *
 * Addresses are first cut down to 24 bits (the reach of RAMPZ:Z) and then
 * wrap around the physical size of the flash, which is always even.
 */

pub struct ProgramMemory {
    /// The flash contents.
    storage: Vec<u8>,
}

impl ProgramMemory {
    /// Create a new, erased, program memory image.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the flash in bytes. Must be even and non-zero, which every [`Target`]
    ///   guarantees.
    ///
    /// [`Target`]: crate::target::Target
    pub(crate) fn new(size: usize) -> Self {
        assert!(size > 0 && size % 2 == 0);

        // Erased flash reads back as all ones.
        Self {
            storage: vec![0xff; size],
        }
    }

    /// The size of the flash, in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// The size of the flash, in words.
    #[inline(always)]
    pub fn len_words(&self) -> usize {
        self.storage.len() / 2
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Map an extended byte address onto a physical storage index.
    #[inline(always)]
    fn physical_index(&self, address: u32) -> usize {
        (address & EXTENDED_ADDRESS_MASK) as usize % self.storage.len()
    }

    /// Read a single byte from program memory.
    ///
    /// # Arguments
    ///
    /// * `address` - The extended byte address.
    #[inline(always)]
    pub fn read_byte(&self, address: u32) -> u8 {
        self.storage[self.physical_index(address)]
    }

    /// Read a 16-bit word from program memory.
    ///
    /// # Arguments
    ///
    /// * `address` - The extended byte address. The lowest bit is ignored.
    pub fn read_word(&self, address: u32) -> u16 {
        let index = self.physical_index(address & WORD_ALIGN_MASK);
        u16::from_le_bytes([self.storage[index], self.storage[index + 1]])
    }

    /// Write a 16-bit word into program memory.
    ///
    /// # Arguments
    ///
    /// * `address` - The extended byte address. The lowest bit is ignored.
    /// * `value` - The word to be written.
    pub fn write_word(&mut self, address: u32, value: u16) {
        let index = self.physical_index(address & WORD_ALIGN_MASK);
        let [low, high] = value.to_le_bytes();
        self.storage[index] = low;
        self.storage[index + 1] = high;
    }
}

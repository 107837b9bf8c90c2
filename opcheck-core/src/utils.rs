/// The mask covering the 24 bits of an extended address.
pub const EXTENDED_ADDRESS_MASK: u32 = 0xff_ffff;
/// The mask that forces an extended address onto a word boundary.
pub const WORD_ALIGN_MASK: u32 = 0xff_fffe;

/// The number of hexadecimal digits used when printing a value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HexWidth {
    /// Two digits.
    Byte,
    /// Four digits.
    Word,
    /// Six digits, for 24-bit addresses.
    Address,
}

impl HexWidth {
    /// Format a value as zero-padded lowercase hexadecimal.
    pub fn format(self, value: u32) -> String {
        match self {
            HexWidth::Byte => format!("{value:02x}"),
            HexWidth::Word => format!("{value:04x}"),
            HexWidth::Address => format!("{value:06x}"),
        }
    }
}

/// Combine a RAMPZ value and a 16-bit Z pointer into a 24-bit extended address.
#[inline(always)]
pub fn compose_extended_address(rampz: u8, z: u16) -> u32 {
    ((rampz as u32) << 16) | z as u32
}

/// Split a 24-bit extended address into its RAMPZ value and 16-bit Z pointer.
#[inline(always)]
pub fn split_extended_address(address: u32) -> (u8, u16) {
    let address = address & EXTENDED_ADDRESS_MASK;
    ((address >> 16) as u8, address as u16)
}

/// Increment a 24-bit extended address, wrapping at the top of the address space.
#[inline(always)]
pub fn increment_extended_address(address: u32) -> u32 {
    address.wrapping_add(1) & EXTENDED_ADDRESS_MASK
}

#[cfg(test)]
mod tests_utils {
    use test_case::test_case;

    use super::*;

    #[test_case(HexWidth::Byte, 0xa, "0a")]
    #[test_case(HexWidth::Word, 0xa, "000a")]
    #[test_case(HexWidth::Address, 0x20000, "020000")]
    fn test_hex_width(width: HexWidth, value: u32, expected: &str) {
        assert_eq!(width.format(value), expected);
    }

    #[test]
    fn test_extended_address_round_trip_boundaries() {
        assert_eq!(compose_extended_address(0x01, 0xffff), 0x1ffff);
        assert_eq!(split_extended_address(0x1ffff), (0x01, 0xffff));
        assert_eq!(split_extended_address(0x20000), (0x02, 0x0000));
    }

    #[test_case(0x00_0010, 0x00_0011; "low page")]
    #[test_case(0x00_ffff, 0x01_0000; "carry into rampz")]
    #[test_case(0x01_ffff, 0x02_0000; "carry within rampz")]
    #[test_case(0xff_ffff, 0x00_0000; "wrap at top of address space")]
    fn test_increment_extended_address(address: u32, expected: u32) {
        assert_eq!(increment_extended_address(address), expected);
    }
}

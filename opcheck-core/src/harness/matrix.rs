use core::fmt;
use itertools::iproduct;

use crate::{reg::registers::RegisterId, utils};

use super::{
    error::{HarnessError, HarnessResult},
    opcode_test::OpcodeFamily,
    test_case::TestCase,
};

/// Extended addresses covering the low page, a page boundary and the 16-bit overflow boundary.
pub const DEFAULT_ADDRESSES: [u32; 5] = [0x10, 0x11, 0x100, 0x101, 0xffff];
/// RAMPZ seeds covering zero and two non-zero extension values.
pub const DEFAULT_SEEDS: [u8; 3] = [0x00, 0x01, 0x02];

/// A validated parameter tuple.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CaseParams {
    /// The destination register.
    pub destination: RegisterId,
    /// The 16-bit Z pointer.
    pub z: u16,
    /// The RAMPZ seed.
    pub rampz: u8,
}

impl CaseParams {
    /// Validate a raw parameter tuple against an opcode family.
    ///
    /// # Arguments
    ///
    /// * `destination` - The destination register index.
    /// * `address` - The extended address held by the Z pointer pair. Must fit in 16 bits.
    /// * `rampz` - The RAMPZ seed.
    pub fn validate<F: OpcodeFamily>(destination: u8, address: u32, rampz: u8) -> HarnessResult<Self> {
        if !F::valid_destinations().contains(&destination) {
            return Err(HarnessError::Configuration(format!(
                "r{destination} is not a valid destination for {}",
                F::NAME
            )));
        }

        let z = u16::try_from(address).map_err(|_| {
            HarnessError::Configuration(format!(
                "address {address:06x} does not fit the Z pointer pair of {}",
                F::NAME
            ))
        })?;

        let destination = RegisterId::general(destination).ok_or_else(|| {
            HarnessError::Configuration(format!("r{destination} is not a general purpose register"))
        })?;

        Ok(Self {
            destination,
            z,
            rampz,
        })
    }

    /// The byte address the instruction reads from, `(RAMPZ << 16) + Z`.
    #[inline(always)]
    pub fn extended_address(&self) -> u32 {
        utils::compose_extended_address(self.rampz, self.z)
    }
}

/// The stable identity of a generated case.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CaseId {
    /// The name of the opcode family.
    pub family: &'static str,
    pub params: CaseParams,
}

impl CaseId {
    /// A stable 64-bit value derived from the identity, used to seed per-case randomness.
    pub fn seed(&self) -> u64 {
        // FNV-1a over the family name, followed by the packed parameters.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in self.family.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }

        let params = ((self.params.destination as u64) << 32)
            | ((self.params.z as u64) << 8)
            | self.params.rampz as u64;

        hash ^ params
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_r{:02}_Z{:04x}_RZ{:02x}",
            self.family, self.params.destination as u8, self.params.z, self.params.rampz
        )
    }
}

/// The cross-product of parameter values to generate cases from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseMatrix {
    destinations: Vec<u8>,
    addresses: Vec<u32>,
    seeds: Vec<u8>,
}

impl CaseMatrix {
    /// Build an explicit matrix. Values are not validated until generation.
    pub fn new(destinations: &[u8], addresses: &[u32], seeds: &[u8]) -> Self {
        Self {
            destinations: destinations.to_vec(),
            addresses: addresses.to_vec(),
            seeds: seeds.to_vec(),
        }
    }

    /// The default matrix for an opcode family: every defined destination register crossed with
    /// the default addresses and seeds.
    pub fn for_family<F: OpcodeFamily>() -> Self {
        Self {
            destinations: F::valid_destinations().collect(),
            addresses: DEFAULT_ADDRESSES.to_vec(),
            seeds: DEFAULT_SEEDS.to_vec(),
        }
    }

    /// The number of cases the matrix describes.
    pub fn len(&self) -> usize {
        self.destinations.len() * self.addresses.len() * self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the raw parameter tuples, destination-major.
    pub fn tuples(&self) -> impl Iterator<Item = (u8, u32, u8)> + '_ {
        iproduct!(
            self.destinations.iter().copied(),
            self.addresses.iter().copied(),
            self.seeds.iter().copied()
        )
    }

    /// Instantiate one pending case per parameter tuple.
    ///
    /// # Returns
    ///
    /// The cases in matrix order, or a [`HarnessError::Configuration`] naming the first tuple that lies
    /// outside the family's domain. Nothing is generated if any tuple is invalid.
    pub fn generate<F: OpcodeFamily>(&self) -> HarnessResult<Vec<TestCase>> {
        self.tuples()
            .map(|(destination, address, rampz)| {
                let params = CaseParams::validate::<F>(destination, address, rampz)?;
                let id = CaseId {
                    family: F::NAME,
                    params,
                };

                Ok(TestCase::new(id, Box::new(F::from_params(params))))
            })
            .collect()
    }
}

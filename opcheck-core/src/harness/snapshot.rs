use core::fmt;
use prettytable::{Table, row};
use std::collections::BTreeMap;

use crate::{
    reg::registers::{RegisterId, Registers, Z_HIGH, Z_LOW},
    utils,
};

/// An immutable, ordered copy of a register file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RegisterSnapshot {
    values: BTreeMap<RegisterId, u32>,
}

impl RegisterSnapshot {
    /// Capture every implemented register of a register file.
    pub fn capture(registers: &Registers) -> Self {
        registers.iter().collect()
    }

    /// Get the value of a register, if it was captured.
    #[inline(always)]
    pub fn get(&self, id: RegisterId) -> Option<u32> {
        self.values.get(&id).copied()
    }

    /// Does the snapshot contain the given register?
    #[inline(always)]
    pub fn contains(&self, id: RegisterId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the captured registers, in register order.
    pub fn iter(&self) -> impl Iterator<Item = (RegisterId, u32)> + '_ {
        self.values.iter().map(|(id, value)| (*id, *value))
    }

    /// Reassemble the 24-bit RAMPZ:Z pointer.
    ///
    /// # Returns
    ///
    /// An option containing the pointer, or None if any of its three registers was not captured.
    pub fn extended_z(&self) -> Option<u32> {
        let low = self.get(Z_LOW)? as u8;
        let high = self.get(Z_HIGH)? as u8;
        let rampz = self.get(RegisterId::RAMPZ)? as u8;

        Some(utils::compose_extended_address(
            rampz,
            u16::from_le_bytes([low, high]),
        ))
    }

    /// List every register whose presence or value differs between this snapshot and a later one.
    ///
    /// # Arguments
    ///
    /// * `after` - The later [`RegisterSnapshot`].
    pub fn differences(&self, after: &RegisterSnapshot) -> Vec<RegisterDelta> {
        let mut ids: Vec<RegisterId> = self.values.keys().chain(after.values.keys()).copied().collect();
        ids.sort();
        ids.dedup();

        ids.into_iter()
            .map(|id| RegisterDelta {
                id,
                before: self.get(id),
                after: after.get(id),
            })
            .filter(|delta| delta.before != delta.after)
            .collect()
    }
}

impl FromIterator<(RegisterId, u32)> for RegisterSnapshot {
    fn from_iter<I: IntoIterator<Item = (RegisterId, u32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A single register that differs between two snapshots.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegisterDelta {
    pub id: RegisterId,
    pub before: Option<u32>,
    pub after: Option<u32>,
}

impl RegisterDelta {
    fn format_value(&self, value: Option<u32>) -> String {
        match value {
            Some(value) => self.id.hex_width().format(value),
            None => "--".to_string(),
        }
    }
}

impl fmt::Display for RegisterDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.id,
            self.format_value(self.before),
            self.format_value(self.after)
        )
    }
}

/// Build a printable table from a list of register differences.
pub fn delta_table(deltas: &[RegisterDelta]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Register", "Before", "After"]);

    for delta in deltas {
        table.add_row(row![
            delta.id,
            delta.format_value(delta.before),
            delta.format_value(delta.after)
        ]);
    }

    table
}

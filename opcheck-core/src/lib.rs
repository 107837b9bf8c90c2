#![crate_name = "opcheck_core"]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod cpu;
pub mod cpu_error;
pub mod harness;
pub mod ins;
pub mod mem;
pub mod opcodes;
pub mod reg;
pub mod target;
pub mod utils;
pub mod vm;

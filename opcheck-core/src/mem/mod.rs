pub mod program_memory;

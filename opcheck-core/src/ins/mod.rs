pub mod instruction;
pub mod op_codes;

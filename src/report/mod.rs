//! Report assembly (channel replay) and human-readable rendering.

pub mod assembler;
pub mod printer;

pub use assembler::replay_channel;

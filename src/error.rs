use std::io;

/// Everything that can stop the interpreter. Undefined opcodes are not in
/// here: they run as no-ops.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not read ROM: {0}")]
    RomLoad(#[from] io::Error),

    #[error("ROM is {len} bytes but only {capacity} bytes fit above 0x200")]
    RomTooLarge { len: usize, capacity: usize },

    #[error("call stack overflow at pc {pc:#06x}")]
    StackOverflow { pc: u16 },

    #[error("return with empty call stack at pc {pc:#06x}")]
    StackUnderflow { pc: u16 },

    #[error("access of {len} byte(s) at {addr:#06x} runs past the end of memory")]
    MemoryOutOfBounds { addr: u16, len: usize },

    #[error("program wrote to reserved interpreter memory at {addr:#06x}")]
    ReservedWrite { addr: u16 },

    #[error("machine is halted")]
    Halted,
}

pub type Result<T> = std::result::Result<T, Error>;

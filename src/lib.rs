//! A CHIP-8 interpreter.
//!
//! ## Design
//!
//! * the core is plain data plus `cycle()`: no threads, no clock, no I/O
//! * one cycle is fetch, decode, execute, then tick both timers; whoever calls
//!   `cycle()` sets the pace, and with it the timer rate
//! * decode is table driven: 16 routes on the high nibble, with second-level
//!   tables on the low nibble (0x0, 0x8, 0xE) or low byte (0xF); empty slots
//!   are no-ops
//! * faults (stack over/underflow, memory past 4K, writes into the reserved
//!   area) come back as `Error` and halt the machine; the caller picks the
//!   exit code
//! * where the reference interpreter decodes an instruction wrongly, the
//!   corrected behaviour is the default and the reference one is a `Quirks`
//!   switch
//! * display, input and audio are traits, so the interpreter doesn't need to
//!   know how the terminal works
//!
//! Model
//!
//! ```text
//! Environment
//!  |-- display, input, sound
//!  |-- interpreter(config, random)
//!  |    |-- memory, registers, framebuffer, keypad
//!  |    `-- dispatcher(quirks)
//!  `-- main loop
//!       |-- input.poll(keypad)
//!       |-- interpreter.cycle()
//!       |-- sound.follow_timer(sound_timer)
//!       |-- display.draw(framebuffer) if dirty
//!       `-- sleep out the rest of the cycle delay
//! ```
pub mod config;
pub mod display;
pub mod environment;
pub mod error;
mod execute;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod opcode;
pub mod random;
pub mod registers;
pub mod sound;

pub use error::{Error, Result};
pub use interpreter::Chip8Interpreter;

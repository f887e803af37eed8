use crate::error::{Error, Result};
use crate::memory::CHIP8_PROGRAM_ADDR;

/// depth of the return address stack
pub const STACK_DEPTH: usize = 16;

/// index of the flag register
pub const VF: usize = 0xf;

/// Machine registers visible to CHIP-8 programs, plus the call stack and the
/// two countdown timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    /// V0..VF; VF doubles as the carry/borrow/collision flag
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    stack: [u16; STACK_DEPTH],
    /// next free stack slot
    sp: usize,
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile {
            v: [0; 16],
            i: 0,
            pc: CHIP8_PROGRAM_ADDR,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
        }
    }

    pub fn sp(&self) -> usize {
        self.sp
    }

    /// return addresses currently on the stack, oldest first
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.sp]
    }

    pub fn push(&mut self, addr: u16) -> Result<()> {
        let slot = self
            .stack
            .get_mut(self.sp)
            .ok_or(Error::StackOverflow { pc: self.pc })?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow { pc: self.pc });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// count both timers down by one, stopping at zero
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

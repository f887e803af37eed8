//! # interpreter
//!
//! The whole machine: memory, registers, screen, keypad, random source and
//! the dispatch tables. `cycle()` is one fetch/decode/execute/tick step; the
//! caller decides how often to call it, and so how fast the timers run.
//!
//! Fx0A does not block. It parks the interpreter with a pending register and
//! PC left on the Fx0A itself; while parked, a cycle only scans the keypad and
//! ticks the timers. A key press fills the register and moves PC past Fx0A.
use crate::config::Config;
use crate::display::Framebuffer;
use crate::error::{Error, Result};
use crate::input::Keypad;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::opcode::{Dispatcher, Instruction};
use crate::random::{ByteRng, RandomSource};
use crate::registers::RegisterFile;
use std::io;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Halted,
}

pub struct Chip8Interpreter {
    pub(crate) memory: Chip8MemoryMap,
    pub(crate) registers: RegisterFile,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) keypad: Keypad,
    pub(crate) random: Box<dyn RandomSource>,
    pub(crate) config: Config,
    /// register waiting on Fx0A
    pub(crate) waiting_for_key: Option<usize>,
    pub(crate) dispatcher: Dispatcher,
    state: State,
    cycles: u64,
}

impl Chip8Interpreter {
    /// corrected semantics, random source seeded from the clock
    pub fn new() -> Self {
        Self::with_config(Config::default(), Box::new(ByteRng::from_time()))
    }

    pub fn with_config(config: Config, random: Box<dyn RandomSource>) -> Self {
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            registers: RegisterFile::new(),
            framebuffer: Framebuffer::new(),
            keypad: Keypad::new(),
            random,
            config,
            waiting_for_key: None,
            dispatcher: Dispatcher::new(&config.quirks),
            state: State::Running,
            cycles: 0,
        }
    }

    /// load a chip8 program at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        self.memory.load_program(reader)
    }

    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<()> {
        self.memory.load_program_bytes(rom)
    }

    /// Run one instruction and tick the timers. A fault halts the machine;
    /// every later call returns `Error::Halted`.
    pub fn cycle(&mut self) -> Result<()> {
        if self.state == State::Halted {
            return Err(Error::Halted);
        }
        if let Err(e) = self.step() {
            warn!(pc = self.registers.pc, "halting: {}", e);
            self.state = State::Halted;
            return Err(e);
        }
        self.registers.tick_timers();
        self.cycles += 1;
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        if let Some(x) = self.waiting_for_key {
            if let Some(key) = self.keypad.first_pressed() {
                self.registers.v[x] = key;
                self.registers.pc = self.registers.pc.wrapping_add(2);
                self.waiting_for_key = None;
            }
            return Ok(());
        }

        let ins = Instruction(self.memory.get_word(self.registers.pc)?);
        trace!(pc = self.registers.pc, "{:04x}", ins.0);
        self.registers.pc = self.registers.pc.wrapping_add(2);
        let handler = self.dispatcher.lookup(ins);
        handler(self, ins)
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// the renderer has caught up with the framebuffer
    pub fn mark_frame_clean(&mut self) {
        self.framebuffer.mark_clean();
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// for the input collaborator only; the interpreter never writes it
    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.waiting_for_key.is_some()
    }

    /// cycles completed without a fault
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for Chip8Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

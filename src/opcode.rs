//! # opcode
//!
//! Instruction words are 16 bits, big-endian in memory:
//!
//! ```text
//!   | c | x | y | n |
//!           |  kk   |
//!       |    nnn    |
//! ```
//!
//! The high nibble `c` picks one of 16 routes. Most routes go straight to a
//! handler; 0x0, 0x8 and 0xE pick again on `n`, and 0xF picks again on `kk`.
//! Any slot without an instruction behind it is a no-op.

use crate::config::Quirks;
use crate::error::Result;
use crate::execute as ex;
use crate::interpreter::Chip8Interpreter;

/// A raw instruction word with accessors for its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction(pub u16);

impl Instruction {
    pub fn category(self) -> usize {
        (self.0 >> 12) as usize
    }

    pub fn x(self) -> usize {
        ((self.0 >> 8) & 0x0f) as usize
    }

    pub fn y(self) -> usize {
        ((self.0 >> 4) & 0x0f) as usize
    }

    pub fn n(self) -> u8 {
        (self.0 & 0x0f) as u8
    }

    pub fn kk(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn nnn(self) -> u16 {
        self.0 & 0x0fff
    }
}

pub type Handler = fn(&mut Chip8Interpreter, Instruction) -> Result<()>;

enum Route {
    Direct(Handler),
    ByNibble([Handler; 16]),
    ByByte(Box<[Handler; 256]>),
}

/// Nested lookup tables from instruction word to handler. Quirks are settled
/// here, once, by choosing which handler sits in a slot.
pub struct Dispatcher {
    table: [Route; 16],
}

impl Dispatcher {
    pub fn new(quirks: &Quirks) -> Self {
        let mut table0 = [ex::undefined as Handler; 16];
        table0[0x0] = ex::clear_screen;
        table0[0xe] = ex::ret;

        let mut table8 = [ex::undefined as Handler; 16];
        table8[0x0] = ex::load_reg;
        table8[0x1] = ex::or;
        table8[0x2] = if quirks.and_runs_or {
            ex::or as Handler
        } else {
            ex::and
        };
        table8[0x3] = ex::xor;
        table8[0x4] = ex::add_reg;
        table8[0x5] = ex::sub;
        table8[0x6] = ex::shr;
        table8[0x7] = ex::subn;
        table8[0xe] = ex::shl;

        let mut table_e = [ex::undefined as Handler; 16];
        table_e[0x1] = ex::skip_key_up;
        table_e[0xe] = ex::skip_key_down;

        let mut table_f = Box::new([ex::undefined as Handler; 256]);
        table_f[0x07] = ex::load_delay;
        table_f[0x0a] = ex::wait_key;
        table_f[0x15] = if quirks.delay_index_scrambled {
            ex::set_delay_scrambled as Handler
        } else {
            ex::set_delay
        };
        table_f[0x18] = ex::set_sound;
        table_f[0x1e] = ex::add_index;
        table_f[0x29] = ex::glyph;
        table_f[0x33] = ex::bcd;
        table_f[0x55] = ex::store_regs;
        table_f[0x65] = ex::load_regs;

        let skip_ne_reg = if quirks.skip_ne_reads_v0 {
            ex::skip_ne_v0 as Handler
        } else {
            ex::skip_ne_reg
        };

        Dispatcher {
            table: [
                Route::ByNibble(table0),
                Route::Direct(ex::jump),
                Route::Direct(ex::call),
                Route::Direct(ex::skip_eq_imm),
                Route::Direct(ex::skip_ne_imm),
                Route::Direct(ex::skip_eq_reg),
                Route::Direct(ex::load_imm),
                Route::Direct(ex::add_imm),
                Route::ByNibble(table8),
                Route::Direct(skip_ne_reg),
                Route::Direct(ex::set_index),
                Route::Direct(ex::jump_offset),
                Route::Direct(ex::random),
                Route::Direct(ex::draw),
                Route::ByNibble(table_e),
                Route::ByByte(table_f),
            ],
        }
    }

    pub fn lookup(&self, ins: Instruction) -> Handler {
        match &self.table[ins.category()] {
            Route::Direct(h) => *h,
            Route::ByNibble(t) => t[ins.n() as usize],
            Route::ByByte(t) => t[ins.kk() as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let i = Instruction(0xd12f);
        assert_eq!(i.category(), 0xd);
        assert_eq!(i.x(), 0x1);
        assert_eq!(i.y(), 0x2);
        assert_eq!(i.n(), 0xf);
        assert_eq!(i.kk(), 0x2f);
        assert_eq!(i.nnn(), 0x12f);
    }
}

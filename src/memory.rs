use crate::error::{Error, Result};
use std::io;
use tracing::debug;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the byte-addressable memory map. Every access is bounds checked;
/// running off the end is an `Error::MemoryOutOfBounds`, never a wrap.
pub trait MemoryMap {
    /// write unknown len of data into memory at a particular address
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.write(&buf, addr)?;
        Ok(len)
    }

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<()> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    fn get_byte(&self, addr: u16) -> Result<u8> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }

    fn set_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        self.get_rw_slice(addr, 1)?[0] = value;
        Ok(())
    }

    /// get a big-endian two-byte word (instructions)
    fn get_word(&self, addr: u16) -> Result<u16> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]>;
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded; everything below belongs to the interpreter
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x050;

/// bytes per glyph
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// The CHIP-8 memory map:
///   0x0000-0x004f  unused
///   0x0050-0x009f  font, 16 glyphs of 4x5 pixels
///   0x00a0-0x01ff  unused
///   0x0200-0x0fff  program
///
/// chip-8 programs *should* not write below 0x200
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8]> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..a + len)
            .ok_or(Error::MemoryOutOfBounds { addr, len })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8]> {
        let a = addr as usize;
        self.bytes
            .get(a..a + len)
            .ok_or(Error::MemoryOutOfBounds { addr, len })
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice();
        let f = CHIP8_FONT_ADDR as usize;
        bytes[f..f + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap {
            bytes,
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
        }
    }

    /// room left above the program address
    pub fn program_capacity(&self) -> usize {
        CHIP8_RAM_SIZE_BYTES - self.program_addr as usize
    }

    /// load a CHIP-8 program at 0x200, all or nothing
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.load_program_bytes(&rom)?;
        Ok(rom.len())
    }

    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<()> {
        let capacity = self.program_capacity();
        if rom.len() > capacity {
            return Err(Error::RomTooLarge {
                len: rom.len(),
                capacity,
            });
        }
        self.write(rom, self.program_addr)?;
        debug!(len = rom.len(), addr = self.program_addr, "loaded program");
        Ok(())
    }

    /// address of the glyph for a hex digit
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr + CHIP8_FONT_GLYPH_BYTES * (digit & 0x0f) as u16
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed_above_font() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
    }

    #[test]
    fn test_font_loaded() -> Result<()> {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0x50, 5)?, &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(m.get_ro_slice(m.glyph_addr(0xf), 5)?, &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
        Ok(())
    }

    #[test]
    fn test_write_any_data_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write_any(&mut src, 8)?, 8);
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word_big_endian() -> Result<()> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.get_word(0x304)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_read_past_end_faults() {
        let m = Chip8MemoryMap::new();
        assert!(m.get_word(0xfff).is_err());
        assert!(m.get_byte(0xfff).is_ok());
        assert!(matches!(
            m.get_ro_slice(0xffc, 8),
            Err(Error::MemoryOutOfBounds { addr: 0xffc, len: 8 })
        ));
    }

    #[test]
    fn test_write_too_much_faults() {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0; 8];
        assert!(dst.write_any(&mut src, 4089).is_err());
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        assert_eq!(dst.load_program(&mut prog)?, 2);
        assert_eq!(dst.get_ro_slice(0x200, 2)?, &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory_exactly() -> Result<()> {
        let mut dst = Chip8MemoryMap::new();
        let rom = vec![0xaa; 4096 - 0x200];
        dst.load_program_bytes(&rom)?;
        assert_eq!(dst.get_byte(0xfff)?, 0xaa);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let rom = vec![0xaa; 4096 - 0x200 + 1];
        match dst.load_program_bytes(&rom) {
            Err(Error::RomTooLarge { len, capacity }) => {
                assert_eq!(len, 3585);
                assert_eq!(capacity, 3584);
            }
            other => panic!("expected RomTooLarge, got {:?}", other),
        }
        // nothing was copied
        assert_eq!(dst.bytes[0x200], 0);
    }
}

//! # execute
//!
//! One function per instruction. Each runs after the fetch has already moved
//! pc past the instruction word, so skips add 2 and calls push the address of
//! the next instruction.
//!
//! Arithmetic is modulo 256. Instructions with a flag result compute it from
//! the operands as they were, then write VF last, so VF holds the flag even
//! when it was also the destination.

use crate::error::{Error, Result};
use crate::interpreter::Chip8Interpreter;
use crate::memory::MemoryMap;
use crate::opcode::Instruction;
use crate::registers::VF;
use tracing::debug;

/// program writes below the program area fault when protection is on
fn store(vm: &mut Chip8Interpreter, addr: u16, data: &[u8]) -> Result<()> {
    if vm.config.protect_reserved && addr < vm.memory.program_addr {
        return Err(Error::ReservedWrite { addr });
    }
    vm.memory.write(data, addr)
}

fn skip_if(vm: &mut Chip8Interpreter, cond: bool) {
    if cond {
        vm.registers.pc = vm.registers.pc.wrapping_add(2);
    }
}

/// holes in the dispatch tables
pub(crate) fn undefined(_vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    debug!("undefined opcode {:04x}, ignored", ins.0);
    Ok(())
}

// 00E0
pub(crate) fn clear_screen(vm: &mut Chip8Interpreter, _ins: Instruction) -> Result<()> {
    vm.framebuffer.clear();
    Ok(())
}

// 00EE
pub(crate) fn ret(vm: &mut Chip8Interpreter, _ins: Instruction) -> Result<()> {
    vm.registers.pc = vm.registers.pop()?;
    Ok(())
}

// 1nnn
pub(crate) fn jump(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.pc = ins.nnn();
    Ok(())
}

// 2nnn
pub(crate) fn call(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let pc = vm.registers.pc;
    vm.registers.push(pc)?;
    vm.registers.pc = ins.nnn();
    Ok(())
}

// 3xkk
pub(crate) fn skip_eq_imm(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let cond = vm.registers.v[ins.x()] == ins.kk();
    skip_if(vm, cond);
    Ok(())
}

// 4xkk
pub(crate) fn skip_ne_imm(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let cond = vm.registers.v[ins.x()] != ins.kk();
    skip_if(vm, cond);
    Ok(())
}

// 5xy0
pub(crate) fn skip_eq_reg(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let cond = vm.registers.v[ins.x()] == vm.registers.v[ins.y()];
    skip_if(vm, cond);
    Ok(())
}

// 6xkk
pub(crate) fn load_imm(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.v[ins.x()] = ins.kk();
    Ok(())
}

// 7xkk, no carry
pub(crate) fn add_imm(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let v = &mut vm.registers.v[ins.x()];
    *v = v.wrapping_add(ins.kk());
    Ok(())
}

// 8xy0
pub(crate) fn load_reg(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.v[ins.x()] = vm.registers.v[ins.y()];
    Ok(())
}

// 8xy1
pub(crate) fn or(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.v[ins.x()] |= vm.registers.v[ins.y()];
    Ok(())
}

// 8xy2
pub(crate) fn and(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.v[ins.x()] &= vm.registers.v[ins.y()];
    Ok(())
}

// 8xy3
pub(crate) fn xor(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.v[ins.x()] ^= vm.registers.v[ins.y()];
    Ok(())
}

// 8xy4, VF = carry
pub(crate) fn add_reg(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let (sum, carry) = vm.registers.v[ins.x()].overflowing_add(vm.registers.v[ins.y()]);
    vm.registers.v[ins.x()] = sum;
    vm.registers.v[VF] = carry as u8;
    Ok(())
}

// 8xy5, VF = Vx > Vy
pub(crate) fn sub(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let (x, y) = (vm.registers.v[ins.x()], vm.registers.v[ins.y()]);
    vm.registers.v[ins.x()] = x.wrapping_sub(y);
    vm.registers.v[VF] = (x > y) as u8;
    Ok(())
}

// 8xy6, VF = bit shifted out; y is ignored
pub(crate) fn shr(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let x = vm.registers.v[ins.x()];
    vm.registers.v[ins.x()] = x >> 1;
    vm.registers.v[VF] = x & 0x01;
    Ok(())
}

// 8xy7, VF = Vy > Vx
pub(crate) fn subn(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let (x, y) = (vm.registers.v[ins.x()], vm.registers.v[ins.y()]);
    vm.registers.v[ins.x()] = y.wrapping_sub(x);
    vm.registers.v[VF] = (y > x) as u8;
    Ok(())
}

// 8xyE, VF = bit shifted out; y is ignored
pub(crate) fn shl(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let x = vm.registers.v[ins.x()];
    vm.registers.v[ins.x()] = x << 1;
    vm.registers.v[VF] = x >> 7;
    Ok(())
}

// 9xy0
pub(crate) fn skip_ne_reg(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let cond = vm.registers.v[ins.x()] != vm.registers.v[ins.y()];
    skip_if(vm, cond);
    Ok(())
}

// 9xy0 as the reference interpreter decodes it: y is masked away
pub(crate) fn skip_ne_v0(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let cond = vm.registers.v[ins.x()] != vm.registers.v[0];
    skip_if(vm, cond);
    Ok(())
}

// Annn
pub(crate) fn set_index(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.i = ins.nnn();
    Ok(())
}

// Bnnn
pub(crate) fn jump_offset(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.pc = vm.registers.v[0] as u16 + ins.nnn();
    Ok(())
}

// Cxkk
pub(crate) fn random(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.v[ins.x()] = vm.random.next_byte() & ins.kk();
    Ok(())
}

// Dxyn, VF = collision
pub(crate) fn draw(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let x = vm.registers.v[ins.x()];
    let y = vm.registers.v[ins.y()];
    let rows = vm.memory.get_ro_slice(vm.registers.i, ins.n() as usize)?;
    let collision = vm.framebuffer.draw_sprite(x, y, rows);
    vm.registers.v[VF] = collision as u8;
    Ok(())
}

// Ex9E
pub(crate) fn skip_key_down(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let cond = vm.keypad.is_pressed(vm.registers.v[ins.x()]);
    skip_if(vm, cond);
    Ok(())
}

// ExA1
pub(crate) fn skip_key_up(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let cond = !vm.keypad.is_pressed(vm.registers.v[ins.x()]);
    skip_if(vm, cond);
    Ok(())
}

// Fx07
pub(crate) fn load_delay(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.v[ins.x()] = vm.registers.delay_timer;
    Ok(())
}

// Fx0A; with no key down the interpreter parks on this instruction until one is
pub(crate) fn wait_key(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    match vm.keypad.first_pressed() {
        Some(key) => vm.registers.v[ins.x()] = key,
        None => {
            vm.registers.pc = vm.registers.pc.wrapping_sub(2);
            vm.waiting_for_key = Some(ins.x());
        }
    }
    Ok(())
}

// Fx15
pub(crate) fn set_delay(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.delay_timer = vm.registers.v[ins.x()];
    Ok(())
}

// Fx15 as the reference interpreter decodes it: (word * 0x0f00) >> 8 as a
// byte, which is 0x3b whatever x is. That machine keeps its 16 registers
// directly in front of memory, so an index past VF reads memory[index - 16].
pub(crate) fn set_delay_scrambled(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let index = ((ins.0 as u32).wrapping_mul(0x0f00) >> 8) as u8 as usize;
    vm.registers.delay_timer = match vm.registers.v.get(index) {
        Some(v) => *v,
        None => vm.memory.get_byte((index - vm.registers.v.len()) as u16)?,
    };
    Ok(())
}

// Fx18
pub(crate) fn set_sound(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.sound_timer = vm.registers.v[ins.x()];
    Ok(())
}

// Fx1E, no flag
pub(crate) fn add_index(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.i = vm.registers.i.wrapping_add(vm.registers.v[ins.x()] as u16);
    Ok(())
}

// Fx29, low nibble of Vx
pub(crate) fn glyph(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    vm.registers.i = vm.memory.glyph_addr(vm.registers.v[ins.x()]);
    Ok(())
}

// Fx33
pub(crate) fn bcd(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let v = vm.registers.v[ins.x()];
    let digits = [v / 100, v / 10 % 10, v % 10];
    let i = vm.registers.i;
    store(vm, i, &digits)
}

// Fx55, I is left alone
pub(crate) fn store_regs(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let (regs, i) = (vm.registers.v, vm.registers.i);
    store(vm, i, &regs[..=ins.x()])
}

// Fx65, I is left alone
pub(crate) fn load_regs(vm: &mut Chip8Interpreter, ins: Instruction) -> Result<()> {
    let bytes = vm.memory.get_ro_slice(vm.registers.i, ins.x() + 1)?;
    vm.registers.v[..=ins.x()].copy_from_slice(bytes);
    Ok(())
}

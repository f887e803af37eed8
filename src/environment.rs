use crate::display::Display;
use crate::input::{Control, Input};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::info;

/// Wires the interpreter to its collaborators and runs the main loop:
///
///  poll input -> one cycle -> beeper follows the sound timer
///    -> redraw if the framebuffer changed -> sleep out the rest of the delay
///
/// Timers tick once per cycle, so the cycle delay also sets the timer rate.
pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    cycle_delay: Duration,
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        cycle_delay: Duration,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            sound,
            cycle_delay,
        }
    }

    /// run until the input asks to quit, a fault halts the interpreter, or
    /// `max_cycles` have run; returns the number of cycles run. The beeper is
    /// silenced on the way out, whichever way that is.
    pub fn main_loop(&mut self, max_cycles: Option<u64>) -> Result<u64, Box<dyn Error>> {
        let result = self.run_cycles(max_cycles);
        if self.sound.is_beeping() {
            let stopped = self.sound.stop();
            let cycles = result?;
            stopped?;
            return Ok(cycles);
        }
        result
    }

    fn run_cycles(&mut self, max_cycles: Option<u64>) -> Result<u64, Box<dyn Error>> {
        let mut cycles = 0;
        while max_cycles.map_or(true, |max| cycles < max) {
            let started = Instant::now();
            if self.input.poll(self.interpreter.keypad_mut())? == Control::Quit {
                info!(cycles, "quit requested");
                break;
            }
            self.interpreter.cycle()?;
            self.sound
                .follow_timer(self.interpreter.registers().sound_timer)?;
            if self.interpreter.framebuffer().is_dirty() {
                self.display.draw(self.interpreter.framebuffer())?;
                self.interpreter.mark_frame_clean();
            }
            cycles += 1;
            if let Some(rest) = self.cycle_delay.checked_sub(started.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
        Ok(cycles)
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::random::ByteRng;
    use crate::sound::Mute;

    fn interpreter(rom: &[u8]) -> Result<Chip8Interpreter, Box<dyn Error>> {
        let mut i = Chip8Interpreter::with_config(Config::default(), Box::new(ByteRng::seeded(9)));
        i.load_program_bytes(rom)?;
        Ok(i)
    }

    #[test]
    fn test_runs_until_quit() -> Result<(), Box<dyn Error>> {
        // 0x200: jump to self
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]).quit_after(5);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0x12, 0x00])?,
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        );
        assert_eq!(env.main_loop(None)?, 5);
        assert_eq!(env.interpreter().cycles(), 5);
        drop(env);
        // only the initial frame; nothing drew after that
        assert_eq!(display.frames, 1);
        Ok(())
    }

    #[test]
    fn test_stops_at_max_cycles() -> Result<(), Box<dyn Error>> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0x12, 0x00])?,
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        );
        assert_eq!(env.main_loop(Some(3))?, 3);
        Ok(())
    }

    #[test]
    fn test_beeps_while_sound_timer_runs() -> Result<(), Box<dyn Error>> {
        // v0 = 2; sound = v0; loop
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0x60, 0x02, 0xf0, 0x18, 0x12, 0x04])?,
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        );
        env.main_loop(Some(6))?;
        drop(env);
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
        Ok(())
    }

    #[test]
    fn test_fault_ends_loop() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0x00, 0xee]).unwrap(),
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        );
        assert!(env.main_loop(None).is_err());
        assert!(env.interpreter().is_halted());
    }

    #[test]
    fn test_fault_while_beeping_silences() {
        // v0 = 5; sound = v0; return with an empty stack
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0x60, 0x05, 0xf0, 0x18, 0x00, 0xee]).unwrap(),
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        );
        assert!(env.main_loop(None).is_err());
        drop(env);
        assert_eq!(sound.beeps, 1);
        assert!(!sound.is_beeping());
    }

    #[test]
    fn test_keys_reach_the_program() -> Result<(), Box<dyn Error>> {
        // wait for a key into v5
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(&[0x7]);
        let mut sound = Mute::new();
        let mut env = Environment::new(
            interpreter(&[0xf5, 0x0a])?,
            &mut display,
            &mut input,
            &mut sound,
            Duration::ZERO,
        );
        env.main_loop(Some(1))?;
        assert_eq!(env.interpreter().registers().v[5], 7);
        Ok(())
    }
}

use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};
use tracing::warn;

/// left-hand side of a qwerty keyboard laid out like the COSMAC keypad:
///   1 2 3 C      1 2 3 4
///   4 5 6 D      q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x0c),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('r', 0x0d),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('f', 0x0e),
    ('z', 0x0a),
    ('x', 0x00),
    ('c', 0x0b),
    ('v', 0x0f),
];

/// terminals only report presses (and auto-repeats), never releases, so a
/// key counts as held for this long after its last event
const KEY_HOLD: Duration = Duration::from_millis(150);

/// The 16 key lines. Written by an `Input` between cycles, only ever read by
/// the interpreter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad { keys: [false; 16] }
    }

    /// lines past 0xF do not exist, so are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = pressed;
        }
    }

    /// lowest numbered line that is down
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }

    pub fn release_all(&mut self) {
        self.keys = [false; 16];
    }
}

/// what the environment should do after polling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// reads keypresses
pub trait Input {
    /// bring the keypad up to date with whatever the user has done since the
    /// last call
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Control, io::Error>;
}

/// keyboard in a raw-mode terminal, using crossterm
pub struct TermInput {
    keymap: HashMap<char, u8>,
    last_seen: [Option<Instant>; 16],
}

impl TermInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(TermInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            last_seen: [None; 16],
        })
    }

    fn read_events(&mut self, now: Instant) -> Result<Control, io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                match evt.code {
                    KeyCode::Esc => return Ok(Control::Quit),
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(Control::Quit)
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => self.last_seen[*mapped_key as usize] = Some(now),
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    _ => {}
                }
            }
        }
        Ok(Control::Continue)
    }
}

impl Drop for TermInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for TermInput {
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Control, io::Error> {
        let now = Instant::now();
        let control = self.read_events(now)?;
        for (key, seen) in self.last_seen.iter().enumerate() {
            let held = matches!(seen, Some(t) if now.duration_since(*t) < KEY_HOLD);
            keypad.set(key as u8, held);
        }
        Ok(control)
    }
}

/// scripted Input implementation for testing
pub struct DummyInput {
    keys: Vec<u8>,
    polls_left: Option<usize>,
}

impl DummyInput {
    /// hold `keys` down forever
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            keys: Vec::from(keys),
            polls_left: None,
        }
    }

    /// ask to quit on the poll after `n` polls
    pub fn quit_after(mut self, n: usize) -> Self {
        self.polls_left = Some(n);
        self
    }
}

impl Input for DummyInput {
    fn poll(&mut self, keypad: &mut Keypad) -> Result<Control, io::Error> {
        if let Some(n) = self.polls_left.as_mut() {
            if *n == 0 {
                return Ok(Control::Quit);
            }
            *n -= 1;
        }
        keypad.release_all();
        for key in &self.keys {
            keypad.set(*key, true);
        }
        Ok(Control::Continue)
    }
}

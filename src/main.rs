use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use chip8vm::config::{Config, Quirks};
use chip8vm::display::MonoTermDisplay;
use chip8vm::environment::Environment;
use chip8vm::input::TermInput;
use chip8vm::interpreter::Chip8Interpreter;
use chip8vm::random::{ByteRng, RandomSource};
use chip8vm::sound::{Mute, SimpleBeep, Sound};

/// CHIP-8 interpreter for the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// terminal cells per CHIP-8 pixel (1 to 32)
    scale: usize,

    /// milliseconds per cycle; timers tick once per cycle
    cycle_delay_ms: u64,

    /// raw CHIP-8 program, loaded at 0x200
    rom_path: PathBuf,

    /// reproduce the reference interpreter's 8xy2, 9xy0 and Fx15 decoding
    #[arg(long)]
    reference_quirks: bool,

    /// fixed seed for the random instruction
    #[arg(long)]
    seed: Option<u64>,

    /// no beeper
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config {
        quirks: if args.reference_quirks {
            Quirks::reference()
        } else {
            Quirks::default()
        },
        ..Config::default()
    };
    let random: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(ByteRng::seeded(seed)),
        None => Box::new(ByteRng::from_time()),
    };
    let mut interpreter = Chip8Interpreter::with_config(config, random);

    // load before the terminal is taken over, so a bad ROM reports cleanly
    let mut rom = File::open(&args.rom_path)
        .map_err(|e| format!("can't open {}: {}", args.rom_path.display(), e))?;
    interpreter.load_program(&mut rom)?;

    let mut display = MonoTermDisplay::new(args.scale)?;
    let mut input = TermInput::new()?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    let mut env = Environment::new(
        interpreter,
        &mut display,
        &mut input,
        sound.as_mut(),
        Duration::from_millis(args.cycle_delay_ms),
    );
    env.main_loop(None)?;
    Ok(())
}

/// Behavioural switches for instructions whose semantics differ between the
/// reference interpreter and a corrected one.
///
/// Every flag defaults to `false`, i.e. corrected behaviour. Turn them on to
/// run programs that were only ever tested against the reference interpreter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 9xy0 masks `y` with zero, so it always compares Vx with V0
    pub skip_ne_reads_v0: bool,
    /// 8xy2 is wired to the OR handler
    pub and_runs_or: bool,
    /// Fx15 multiplies by the field mask instead of and-ing with it; the
    /// resulting index runs past VF and reads memory[0x2b]
    pub delay_index_scrambled: bool,
}

impl Quirks {
    /// bit-compatible with the reference interpreter
    pub fn reference() -> Self {
        Quirks {
            skip_ne_reads_v0: true,
            and_runs_or: true,
            delay_index_scrambled: true,
        }
    }
}

/// Interpreter configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub quirks: Quirks,
    /// fault on program writes below the program area (font and interpreter data)
    pub protect_reserved: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quirks: Quirks::default(),
            protect_reserved: true,
        }
    }
}

use crossterm::{cursor, execute, terminal};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// a lit pixel; all bits set so sprites can be XOR-ed straight in
pub const PIXEL_ON: u32 = 0xffff_ffff;
pub const PIXEL_OFF: u32 = 0;

/// The 64x32 monochrome screen. Only the clear and draw instructions change
/// it; renderers get a shared reference between cycles.
#[derive(Clone)]
pub struct Framebuffer {
    pixels: [u32; SCREEN_WIDTH * SCREEN_HEIGHT],
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [PIXEL_OFF; SCREEN_WIDTH * SCREEN_HEIGHT],
            dirty: true,
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(PIXEL_OFF);
        self.dirty = true;
    }

    /// XOR an 8-pixel-wide sprite onto the screen with its top-left corner at
    /// (x, y). The corner wraps onto the screen, and so does every pixel of the
    /// sprite that would fall off the right or bottom edge.
    ///
    /// Returns true if any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let x0 = x as usize % SCREEN_WIDTH;
        let y0 = y as usize % SCREEN_HEIGHT;
        let mut collision = false;
        for (r, byte) in rows.iter().enumerate() {
            for c in 0..8 {
                if byte & (0x80 >> c) == 0 {
                    continue;
                }
                let px = (x0 + c) % SCREEN_WIDTH;
                let py = (y0 + r) % SCREEN_HEIGHT;
                let cell = &mut self.pixels[py * SCREEN_WIDTH + px];
                collision |= *cell == PIXEL_ON;
                *cell ^= PIXEL_ON;
            }
        }
        self.dirty = true;
        collision
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.pixels[y * SCREEN_WIDTH + x] == PIXEL_ON
    }

    /// row-major pixels, `pitch()` bytes per row
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pitch(&self) -> usize {
        SCREEN_WIDTH * std::mem::size_of::<u32>()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.pixels.chunks(SCREEN_WIDTH)
    }

    /// changed since the last `mark_clean`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display is used by the environment to put the framebuffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of screen
/// would work.
pub trait Display {
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error>;
}

/// largest terminal scale `MonoTermDisplay` will use; the canvas must fit in
/// the terminal's u16 coordinates
pub const MAX_SCALE: usize = 32;

// canvas geometry: chip-8 resolution times a whole-number scale
struct Resolution(usize, usize, usize);

impl Resolution {
    /// the chip-8 screen at `scale`, clamped to 1..=MAX_SCALE
    fn scaled(scale: usize) -> Self {
        Resolution(SCREEN_WIDTH, SCREEN_HEIGHT, scale.clamp(1, MAX_SCALE))
    }

    fn width(&self) -> usize {
        self.0 * self.2
    }

    fn height(&self) -> usize {
        self.1 * self.2
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.width() - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.height() - 1) as f64, 0.0]
    }

    /// every lit pixel, blown up to scale x scale canvas points
    fn lit_points(&self, frame: &Framebuffer) -> Vec<(f64, f64)> {
        let scale = self.2;
        let mut points = Vec::new();
        for (y, row) in frame.rows().enumerate() {
            for (x, px) in row.iter().enumerate() {
                if *px != PIXEL_ON {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        points.push((
                            (x * scale + dx) as f64,
                            -1.0 * (y * scale + dy) as f64,
                        ));
                    }
                }
            }
        }
        points
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new(scale: usize) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution::scaled(scale),
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error> {
        let points = self.resolution.lit_points(frame);
        let want = Rect::new(
            0,
            0,
            2 + self.resolution.width() as u16,
            2 + self.resolution.height() as u16,
        );
        let resolution = &self.resolution;
        self.terminal.draw(|f| {
            let size = want.intersection(f.size());
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &points,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = execute!(
            self.terminal.backend_mut(),
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
    }
}

/// useful for testing non-display routines
pub struct DummyDisplay {
    pub frames: usize,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay { frames: 0 }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _frame: &Framebuffer) -> Result<(), io::Error> {
        self.frames += 1;
        Ok(())
    }
}

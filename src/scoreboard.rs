use crate::controller::ScoreRecord;
use crate::raster::{Frame, Rgba};
use crate::render::INK;
use crate::viewport::{ResizeObserver, SurfaceSize};

pub const HEADER_HEIGHT: u32 = 28;

const HEADER_BACKGROUND: Rgba = Rgba::opaque(139, 172, 72);
const TEXT_SCALE: u32 = 2;
const PADDING: i64 = 7;

/// Header band showing the current and best scores. Display only.
#[derive(Debug)]
pub struct Scoreboard {
    current: u32,
    best: u32,
    paused: bool,
    width: u32,
}

impl Scoreboard {
    pub fn new(width: u32, score: ScoreRecord) -> Self {
        Self { current: score.current, best: score.best, paused: false, width }
    }

    pub fn set_current(&mut self, score: u32) {
        self.current = score;
    }

    pub fn set_best(&mut self, score: u32) {
        self.best = score;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Where the scoreboard mounts: the top band of the framebuffer.
    pub fn bounds(&self) -> SurfaceSize {
        SurfaceSize { width: self.width, height: HEADER_HEIGHT }
    }

    pub fn current_text(&self) -> String {
        format!("CURRENT: {}", self.current)
    }

    pub fn best_text(&self) -> String {
        format!("BEST: {}", self.best)
    }

    pub fn draw(&self, frame: &mut Frame) {
        frame.clear(HEADER_BACKGROUND);
        let mut x = PADDING;
        x += frame.draw_text(&self.current_text(), x, PADDING, TEXT_SCALE, INK) as i64;
        x += 4 * TEXT_SCALE as i64;
        frame.draw_text(&self.best_text(), x, PADDING, TEXT_SCALE, INK);
        if self.paused {
            let label = "PAUSED";
            let label_width = (label.len() as u32 * 6 * TEXT_SCALE) as i64;
            let right = self.width.min(frame.width()) as i64;
            frame.draw_text(label, right - label_width - PADDING, PADDING, TEXT_SCALE, INK);
        }
    }
}

impl ResizeObserver for Scoreboard {
    fn on_resize(&mut self, size: SurfaceSize) {
        self.width = size.width;
    }
}

use std::cell::RefCell;
use std::rc::Rc;

use winit::window::Window;

use crate::controller::{Presenter, ScoreRecord};
use crate::engine::Snapshot;
use crate::render::Renderer;
use crate::scoreboard::Scoreboard;
use crate::viewport::{container_size, ResizeObserver, SurfaceSize, Viewport, ViewportError};

/// Window contents: scoreboard header over the board canvas.
pub struct Screen {
    viewport: Viewport,
    renderer: Renderer,
    scoreboard: Rc<RefCell<Scoreboard>>,
    /// Last frame shown, redrawn onto a rebuilt surface.
    last_snapshot: Option<Snapshot>,
}

impl Screen {
    pub fn new(
        window: &Window,
        board_width: u32,
        board_height: u32,
        score: ScoreRecord,
    ) -> Result<Self, ViewportError> {
        let mut scoreboard = Scoreboard::new(0, score);
        let header_height = scoreboard.bounds().height;
        let container = container_size(window.inner_size().into(), header_height);
        let renderer = Renderer::new(board_width, board_height, container);
        let canvas = renderer.canvas_size();
        scoreboard.on_resize(canvas);
        let scoreboard = Rc::new(RefCell::new(scoreboard));
        let mut viewport = Viewport::new(window, header_height, canvas)?;
        viewport.subscribe(scoreboard.clone());
        Ok(Self { viewport, renderer, scoreboard, last_snapshot: None })
    }

    /// Refits the board to a resized window and rebuilds the surface before
    /// anything else is drawn.
    pub fn resize(&mut self, window: SurfaceSize) -> Result<(), ViewportError> {
        if window.is_empty() {
            log::debug!("ignoring resize to an empty window");
            return Ok(());
        }
        self.viewport.set_window_size(window);
        self.renderer.fit(self.viewport.container_size());
        self.viewport.rebuild(self.renderer.canvas_size())?;
        if let Some(snapshot) = &self.last_snapshot {
            let (_, mut board) = self.viewport.frames();
            self.renderer.render(snapshot, &mut board);
        }
        Ok(())
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.scoreboard.borrow_mut().set_paused(paused);
    }

    /// Redraws the header and pushes the frame to the window.
    pub fn present(&mut self) -> Result<(), ViewportError> {
        {
            let (mut header, _) = self.viewport.frames();
            self.scoreboard.borrow().draw(&mut header);
        }
        self.viewport.present()
    }
}

impl Presenter for Screen {
    fn show(&mut self, snapshot: &Snapshot, score: ScoreRecord) {
        {
            let mut scoreboard = self.scoreboard.borrow_mut();
            scoreboard.set_current(score.current);
            scoreboard.set_best(score.best);
        }
        let (_, mut board) = self.viewport.frames();
        self.renderer.render(snapshot, &mut board);
        self.last_snapshot = Some(snapshot.clone());
    }
}

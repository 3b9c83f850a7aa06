//! The drawable surface: a `pixels` framebuffer inside the window, torn down
//! and rebuilt on every resize.

use std::cell::RefCell;
use std::rc::Rc;

use pixels::{Pixels, SurfaceTexture, TextureError};
use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::raster::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<PhysicalSize<u32>> for SurfaceSize {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self { width: size.width, height: size.height }
    }
}

#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("failed to create pixel surface: {0}")]
    Create(#[source] pixels::Error),
    #[error("failed to resize pixel surface: {0}")]
    Resize(#[source] TextureError),
    #[error("failed to present frame: {0}")]
    Present(#[source] pixels::Error),
}

/// Told the new canvas size after each rebuild.
pub trait ResizeObserver {
    fn on_resize(&mut self, size: SurfaceSize);
}

#[derive(Default)]
pub struct ResizeNotifier {
    observers: Vec<Rc<RefCell<dyn ResizeObserver>>>,
}

impl ResizeNotifier {
    pub fn subscribe(&mut self, observer: Rc<RefCell<dyn ResizeObserver>>) {
        self.observers.push(observer);
    }

    pub fn notify(&self, size: SurfaceSize) {
        for observer in &self.observers {
            observer.borrow_mut().on_resize(size);
        }
    }
}

/// Space left for the board once the header band is taken off the top.
pub fn container_size(window: SurfaceSize, header_height: u32) -> SurfaceSize {
    SurfaceSize { width: window.width, height: window.height.saturating_sub(header_height) }
}

/// Framebuffer holding the header band on top of the board canvas.
pub fn buffer_size(canvas: SurfaceSize, header_height: u32) -> SurfaceSize {
    SurfaceSize { width: canvas.width.max(1), height: canvas.height.max(1) + header_height }
}

pub struct Viewport {
    pixels: Pixels,
    window: SurfaceSize,
    canvas: SurfaceSize,
    header_height: u32,
    notifier: ResizeNotifier,
}

impl Viewport {
    pub fn new(window: &Window, header_height: u32, canvas: SurfaceSize) -> Result<Self, ViewportError> {
        let window_size = SurfaceSize::from(window.inner_size());
        let buffer = buffer_size(canvas, header_height);
        let surface = SurfaceTexture::new(window_size.width.max(1), window_size.height.max(1), window);
        let pixels = Pixels::new(buffer.width, buffer.height, surface).map_err(ViewportError::Create)?;
        Ok(Self { pixels, window: window_size, canvas, header_height, notifier: ResizeNotifier::default() })
    }

    pub fn subscribe(&mut self, observer: Rc<RefCell<dyn ResizeObserver>>) {
        self.notifier.subscribe(observer);
    }

    pub fn container_size(&self) -> SurfaceSize {
        container_size(self.window, self.header_height)
    }

    /// Records a new window size; the board container shrinks or grows with it.
    pub fn set_window_size(&mut self, window: SurfaceSize) {
        self.window = window;
    }

    /// Recreates the surface and framebuffer for `canvas`, clears it, and
    /// tells observers the new canvas size. Nothing may draw in between.
    pub fn rebuild(&mut self, canvas: SurfaceSize) -> Result<(), ViewportError> {
        let buffer = buffer_size(canvas, self.header_height);
        self.pixels
            .resize_surface(self.window.width.max(1), self.window.height.max(1))
            .map_err(ViewportError::Resize)?;
        self.pixels.resize_buffer(buffer.width, buffer.height).map_err(ViewportError::Resize)?;
        self.pixels.frame_mut().fill(0);
        self.canvas = canvas;
        log::info!(
            "surface rebuilt: window {}x{}, canvas {}x{}",
            self.window.width,
            self.window.height,
            canvas.width,
            canvas.height
        );
        self.notifier.notify(canvas);
        Ok(())
    }

    /// The header band and the board canvas as separate frames.
    pub fn frames(&mut self) -> (Frame<'_>, Frame<'_>) {
        let buffer = buffer_size(self.canvas, self.header_height);
        Frame::new(self.pixels.frame_mut(), buffer.width, buffer.height).split_rows(self.header_height)
    }

    pub fn present(&self) -> Result<(), ViewportError> {
        self.pixels.render().map_err(ViewportError::Present)
    }
}

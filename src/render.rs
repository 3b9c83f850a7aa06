use crate::engine::Snapshot;
use crate::projection::{compute_scale, project_scalar, project_vector, ProjectionScale};
use crate::raster::{Frame, Rgba};
use crate::viewport::SurfaceSize;

pub const BACKGROUND: Rgba = Rgba::opaque(155, 186, 90);
pub const INK: Rgba = Rgba::opaque(0x3b, 0x4a, 0x2a);

/// Food ring radius in grid units.
const FOOD_RADIUS: f64 = 1.0 / 2.5;

/// Draws the board into a canvas sized for the current projection scale.
pub struct Renderer {
    board_width: u32,
    board_height: u32,
    scale: ProjectionScale,
}

impl Renderer {
    pub fn new(board_width: u32, board_height: u32, container: SurfaceSize) -> Self {
        let mut renderer = Self { board_width, board_height, scale: ProjectionScale::new(1.0) };
        renderer.fit(container);
        renderer
    }

    /// Recomputes the scale for a new container bounding box.
    pub fn fit(&mut self, container: SurfaceSize) {
        self.scale = compute_scale(
            container.width as f64,
            container.height as f64,
            self.board_width,
            self.board_height,
        );
    }

    #[cfg(test)]
    pub fn scale(&self) -> ProjectionScale {
        self.scale
    }

    /// Pixel size of the whole board at the current scale, at least 1x1.
    pub fn canvas_size(&self) -> SurfaceSize {
        SurfaceSize {
            width: (project_scalar(self.board_width as f64, self.scale).round() as u32).max(1),
            height: (project_scalar(self.board_height as f64, self.scale).round() as u32).max(1),
        }
    }

    pub fn render(&self, snapshot: &Snapshot, frame: &mut Frame) {
        frame.clear(BACKGROUND);
        self.render_food(snapshot, frame);
        self.render_snake(snapshot, frame);
    }

    fn render_food(&self, snapshot: &Snapshot, frame: &mut Frame) {
        let (x, y) = project_vector(snapshot.food, self.scale);
        let radius = project_scalar(FOOD_RADIUS, self.scale);
        let line_width = (self.scale.get() / 5.0).clamp(1.0, 5.0);
        frame.stroke_circle(x, y, radius, line_width, INK);
    }

    fn render_snake(&self, snapshot: &Snapshot, frame: &mut Frame) {
        let path: Vec<(f64, f64)> = snapshot.body.iter().map(|&v| project_vector(v, self.scale)).collect();
        frame.stroke_polyline(&path, self.scale.get(), INK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Direction;
    use crate::geometry::GridVector;

    fn snapshot() -> Snapshot {
        Snapshot {
            board_width: 30,
            board_height: 15,
            body: vec![GridVector::new(5.5, 2.5), GridVector::new(2.5, 2.5)],
            heading: Direction::Right,
            speed: 0.006,
            food: GridVector::new(20.5, 10.5),
            score: 0,
            over: false,
        }
    }

    #[test]
    fn canvas_follows_the_container() {
        let mut renderer = Renderer::new(30, 15, SurfaceSize { width: 800, height: 300 });
        assert_eq!(renderer.scale().get(), 20.0);
        assert_eq!(renderer.canvas_size(), SurfaceSize { width: 600, height: 300 });

        renderer.fit(SurfaceSize { width: 300, height: 900 });
        assert_eq!(renderer.canvas_size(), SurfaceSize { width: 300, height: 150 });
    }

    #[test]
    fn draws_snake_and_food_on_a_cleared_canvas() {
        let renderer = Renderer::new(30, 15, SurfaceSize { width: 300, height: 150 });
        let size = renderer.canvas_size();
        let mut data = vec![7u8; (size.width * size.height * 4) as usize];
        let mut frame = Frame::new(&mut data, size.width, size.height);
        renderer.render(&snapshot(), &mut frame);

        // Scale 10: the body runs from (25, 25) to (55, 25), ten pixels thick.
        assert_eq!(frame.pixel(40, 25), Some(INK));
        assert_eq!(frame.pixel(40, 31), Some(BACKGROUND));
        // Food ring of radius 4 around (205, 105): rim inked, centre empty.
        assert_eq!(frame.pixel(205, 105), Some(BACKGROUND));
        assert_eq!(frame.pixel(209, 104), Some(INK));
        // Untouched corners were cleared.
        assert_eq!(frame.pixel(0, 0), Some(BACKGROUND));
    }

    #[test]
    fn rerender_after_fit_fills_the_rebuilt_canvas() {
        let mut renderer = Renderer::new(30, 15, SurfaceSize { width: 300, height: 150 });
        renderer.fit(SurfaceSize { width: 600, height: 400 });
        let size = renderer.canvas_size();
        assert_eq!(size, SurfaceSize { width: 600, height: 300 });

        // A rebuilt surface starts zeroed.
        let mut data = vec![0u8; (size.width * size.height * 4) as usize];
        let mut frame = Frame::new(&mut data, size.width, size.height);
        renderer.render(&snapshot(), &mut frame);
        assert!(data.chunks_exact(4).all(|px| px[3] == 255));
        assert!(data.chunks_exact(4).all(|px| px != [0, 0, 0, 0]));
    }
}

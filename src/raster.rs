//! Software drawing on an RGBA8 frame.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba(r, g, b, 255)
    }
}

/// Mutable view over a row-major RGBA8 buffer.
pub struct Frame<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Frame<'a> {
    /// The height is clamped to the number of whole rows `data` holds.
    pub fn new(data: &'a mut [u8], width: u32, height: u32) -> Self {
        let stride = width as usize * 4;
        let rows = if stride == 0 { 0 } else { (data.len() / stride) as u32 };
        Self { data, width, height: height.min(rows) }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    #[cfg(test)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Splits into the first `top` rows and the rest.
    pub fn split_rows(self, top: u32) -> (Frame<'a>, Frame<'a>) {
        let top = top.min(self.height);
        let stride = self.width as usize * 4;
        let (upper, lower) = self.data.split_at_mut(top as usize * stride);
        (
            Frame { data: upper, width: self.width, height: top },
            Frame { data: lower, width: self.width, height: self.height - top },
        )
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = &self.data[idx..idx + 4];
        Some(Rgba(px[0], px[1], px[2], px[3]))
    }

    pub fn clear(&mut self, c: Rgba) {
        let rows = (self.width * self.height * 4) as usize;
        for px in self.data[..rows].chunks_exact_mut(4) {
            px.copy_from_slice(&[c.0, c.1, c.2, c.3]);
        }
    }

    pub fn blend_pixel(&mut self, x: i64, y: i64, c: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as u64 * self.width as u64 + x as u64) * 4) as usize;
        let a = c.3 as u16;
        let ia = 255 - a;
        let dst = &mut self.data[idx..idx + 4];
        dst[0] = ((c.0 as u16 * a + dst[0] as u16 * ia) / 255) as u8;
        dst[1] = ((c.1 as u16 * a + dst[1] as u16 * ia) / 255) as u8;
        dst[2] = ((c.2 as u16 * a + dst[2] as u16 * ia) / 255) as u8;
        dst[3] = 255;
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, c: Rgba) {
        for py in y..y + h as i64 {
            for px in x..x + w as i64 {
                self.blend_pixel(px, py, c);
            }
        }
    }

    /// Ring of the given line width centred on the circle of `radius`.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, c: Rgba) {
        let half = line_width / 2.0;
        let reach = radius + half;
        self.for_each_pixel_near(cx - reach, cy - reach, cx + reach, cy + reach, |x, y| {
            (f64::hypot(x - cx, y - cy) - radius).abs() <= half
        }, c);
    }

    /// One continuous stroke through `points`, with round joins and caps.
    pub fn stroke_polyline(&mut self, points: &[(f64, f64)], line_width: f64, c: Rgba) {
        if points.is_empty() {
            return;
        }
        let half = line_width / 2.0;
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let segments: Vec<((f64, f64), (f64, f64))> = if points.len() == 1 {
            vec![(points[0], points[0])]
        } else {
            points.windows(2).map(|w| (w[0], w[1])).collect()
        };
        self.for_each_pixel_near(min_x - half, min_y - half, max_x + half, max_y + half, |x, y| {
            segments.iter().any(|&(a, b)| distance_to_segment((x, y), a, b) <= half)
        }, c);
    }

    /// Draws `text` in the 5x7 font; returns the advance in pixels.
    pub fn draw_text(&mut self, text: &str, x: i64, y: i64, scale: u32, c: Rgba) -> u32 {
        let mut cx = x;
        for ch in text.chars() {
            cx += self.draw_char(ch, cx, y, scale, c) as i64;
        }
        (cx - x) as u32
    }

    fn draw_char(&mut self, ch: char, x: i64, y: i64, scale: u32, c: Rgba) -> u32 {
        if let Some(rows) = glyph_5x7(ch) {
            for (ry, row) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (row >> (4 - rx)) & 1 == 1 {
                        self.fill_rect(x + (rx * scale) as i64, y + (ry as u32 * scale) as i64, scale, scale, c);
                    }
                }
            }
        }
        6 * scale
    }

    fn for_each_pixel_near(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        inside: impl Fn(f64, f64) -> bool,
        c: Rgba,
    ) {
        let left = x0.floor().max(0.0) as i64;
        let top = y0.floor().max(0.0) as i64;
        let right = x1.ceil().min(self.width as f64) as i64;
        let bottom = y1.ceil().min(self.height as f64) as i64;
        for py in top..bottom {
            for px in left..right {
                // Sample at the pixel centre.
                if inside(px as f64 + 0.5, py as f64 + 0.5) {
                    self.blend_pixel(px, py, c);
                }
            }
        }
    }
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
    };
    f64::hypot(p.0 - (a.0 + abx * t), p.1 - (a.1 + aby * t))
}

/// Glyphs for the scoreboard and overlays.
fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    Some(match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b11110, 0b10001, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        ' ' => [0; 7],
        _ => return None,
    })
}

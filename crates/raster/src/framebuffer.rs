use squash_common::Color;

/// CPU pixel buffer, row-major, one packed `0x00RRGGBB` word per pixel.
///
/// All drawing clips silently: coordinates outside the buffer are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Framebuffer {
    /// A black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK.0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Resize, discarding the contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, Color::BLACK.0);
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.0);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color.0;
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| Color(self.pixels[i]))
    }

    pub fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut u32> {
        self.index(x, y).map(|i| &mut self.pixels[i])
    }

    /// DDA line stepping along the major axis.
    ///
    /// Vertical lines stop one pixel short of `(x1, y1)`.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 > x1 { -1 } else { 1 };
        let sy = if y0 > y1 { -1 } else { 1 };

        if dx == 0 {
            for i in 0..dy {
                self.set_pixel(x0, y0 + i * sy, color);
            }
            return;
        }

        let m = dy as f32 / dx as f32;
        if m <= 1.0 {
            for i in 0..=dx {
                let y = y0 as f32 + i as f32 * m * sy as f32;
                self.set_pixel(x0 + i * sx, y.ceil() as i32, color);
            }
        } else {
            for i in 0..=dy {
                let x = x0 as f32 + i as f32 / m * sx as f32;
                self.set_pixel(x.ceil() as i32, y0 + i * sy, color);
            }
        }
    }

    /// Filled rectangle, both corners inclusive.
    pub fn rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let (cx0, cx1) = (x0.max(0), x1.min(self.width as i32 - 1));
        let (cy0, cy1) = (y0.max(0), y1.min(self.height as i32 - 1));
        for y in cy0..=cy1 {
            for x in cx0..=cx1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Vertical lines every `cell_width` px and horizontal lines every
    /// `cell_height` px, starting at the origin.
    pub fn grid(&mut self, cell_width: u32, cell_height: u32, color: Color) {
        let (w, h) = (self.width as i32, self.height as i32);
        if cell_width > 0 {
            for x in (0..w).step_by(cell_width as usize) {
                self.line(x, 0, x, h, color);
            }
        }
        if cell_height > 0 {
            for y in (0..h).step_by(cell_height as usize) {
                self.line(0, y, w, y, color);
            }
        }
    }

    /// Filled circle: every pixel with `dx² + dy² <= r²`.
    pub fn circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        if r < 0 {
            return;
        }
        let (Some(xs), Some(ys)) = (
            clip_offsets(cx, r, self.width),
            clip_offsets(cy, r, self.height),
        ) else {
            return;
        };
        let r2 = r as i64 * r as i64;
        for dy in ys.0..=ys.1 {
            for dx in xs.0..=xs.1 {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel((cx as i64 + dx) as i32, (cy as i64 + dy) as i32, color);
                }
            }
        }
    }

    /// Filled axis-aligned ellipse with radii `rx`, `ry`. Degenerate radii
    /// draw nothing.
    pub fn ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        if rx <= 0 || ry <= 0 {
            return;
        }
        let (Some(xs), Some(ys)) = (
            clip_offsets(cx, rx, self.width),
            clip_offsets(cy, ry, self.height),
        ) else {
            return;
        };
        for dy in ys.0..=ys.1 {
            for dx in xs.0..=xs.1 {
                let nx = dx as f32 / rx as f32;
                let ny = dy as f32 / ry as f32;
                if nx * nx + ny * ny <= 1.0 {
                    self.set_pixel((cx as i64 + dx) as i32, (cy as i64 + dy) as i32, color);
                }
            }
        }
    }

    /// Pixels as tightly packed RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&p| Color(p).to_rgb())
            .collect()
    }

    /// Number of pixels currently holding `color`.
    pub fn count(&self, color: Color) -> usize {
        self.pixels.iter().filter(|&&p| p == color.0).count()
    }
}

/// Offsets in `-radius..=radius` that land inside `0..len` when added to
/// `center`, or `None` if the span misses the buffer entirely.
fn clip_offsets(center: i32, radius: i32, len: u32) -> Option<(i64, i64)> {
    let (c, r) = (center as i64, radius as i64);
    let lo = (-r).max(-c);
    let hi = r.min(len as i64 - 1 - c);
    (lo <= hi).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_black() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.pixels().len(), 12);
        assert_eq!(fb.count(Color::BLACK), 12);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(-1, 0, Color::RED);
        fb.set_pixel(0, 4, Color::RED);
        fb.set_pixel(4, 0, Color::RED);
        assert_eq!(fb.count(Color::RED), 0);
        assert!(fb.pixel(4, 0).is_none());
        assert!(fb.pixel_mut(0, -1).is_none());
    }

    #[test]
    fn pixel_mut_writes_through() {
        let mut fb = Framebuffer::new(2, 2);
        *fb.pixel_mut(1, 1).unwrap() = Color::GREEN.0;
        assert_eq!(fb.pixel(1, 1), Some(Color::GREEN));
        assert_eq!(fb.pixels()[3], Color::GREEN.0);
    }

    #[test]
    fn rect_is_inclusive_and_clipped() {
        let mut fb = Framebuffer::new(10, 10);
        fb.rect(2, 3, 4, 5, Color::BLUE);
        assert_eq!(fb.count(Color::BLUE), 9);
        assert_eq!(fb.pixel(4, 5), Some(Color::BLUE));
        assert_eq!(fb.pixel(5, 5), Some(Color::BLACK));

        fb.clear(Color::WHITE);
        fb.rect(-5, -5, 1, 1, Color::RED);
        assert_eq!(fb.count(Color::RED), 4);
    }

    #[test]
    fn horizontal_line_covers_both_ends() {
        let mut fb = Framebuffer::new(10, 10);
        fb.line(1, 2, 6, 2, Color::RED);
        assert_eq!(fb.count(Color::RED), 6);
        assert_eq!(fb.pixel(1, 2), Some(Color::RED));
        assert_eq!(fb.pixel(6, 2), Some(Color::RED));
    }

    #[test]
    fn vertical_line_stops_short() {
        let mut fb = Framebuffer::new(10, 10);
        fb.line(3, 1, 3, 5, Color::RED);
        assert_eq!(fb.count(Color::RED), 4);
        assert_eq!(fb.pixel(3, 5), Some(Color::BLACK));

        fb.clear(Color::BLACK);
        fb.line(3, 5, 3, 1, Color::RED);
        assert_eq!(fb.pixel(3, 5), Some(Color::RED));
        assert_eq!(fb.pixel(3, 1), Some(Color::BLACK));
    }

    #[test]
    fn diagonal_line_hits_every_step() {
        let mut fb = Framebuffer::new(10, 10);
        fb.line(0, 0, 4, 4, Color::GREEN);
        for i in 0..=4 {
            assert_eq!(fb.pixel(i, i), Some(Color::GREEN));
        }
        assert_eq!(fb.count(Color::GREEN), 5);
    }

    #[test]
    fn steep_line_steps_along_y() {
        let mut fb = Framebuffer::new(10, 10);
        fb.line(0, 0, 2, 8, Color::GREEN);
        assert_eq!(fb.count(Color::GREEN), 9);
        assert_eq!(fb.pixel(0, 0), Some(Color::GREEN));
        assert_eq!(fb.pixel(2, 8), Some(Color::GREEN));
    }

    #[test]
    fn grid_draws_lines_on_cell_boundaries() {
        let mut fb = Framebuffer::new(8, 8);
        fb.grid(4, 4, Color::WHITE);
        assert_eq!(fb.pixel(0, 3), Some(Color::WHITE));
        assert_eq!(fb.pixel(4, 6), Some(Color::WHITE));
        assert_eq!(fb.pixel(6, 4), Some(Color::WHITE));
        assert_eq!(fb.pixel(1, 1), Some(Color::BLACK));

        // Zero spacing is a no-op rather than an endless loop.
        let mut fb = Framebuffer::new(8, 8);
        fb.grid(0, 0, Color::WHITE);
        assert_eq!(fb.count(Color::WHITE), 0);
    }

    #[test]
    fn circle_is_filled_and_round() {
        let mut fb = Framebuffer::new(11, 11);
        fb.circle(5, 5, 2, Color::RED);
        // 5x5 square minus the twelve cells with dx² + dy² > 4.
        assert_eq!(fb.count(Color::RED), 13);
        assert_eq!(fb.pixel(5, 5), Some(Color::RED));
        assert_eq!(fb.pixel(7, 7), Some(Color::BLACK));
    }

    #[test]
    fn ellipse_respects_both_radii() {
        let mut fb = Framebuffer::new(20, 20);
        fb.ellipse(10, 10, 6, 2, Color::BLUE);
        assert_eq!(fb.pixel(16, 10), Some(Color::BLUE));
        assert_eq!(fb.pixel(17, 10), Some(Color::BLACK));
        assert_eq!(fb.pixel(10, 12), Some(Color::BLUE));
        assert_eq!(fb.pixel(10, 13), Some(Color::BLACK));
    }

    #[test]
    fn shapes_centered_far_outside_draw_nothing() {
        let mut fb = Framebuffer::new(16, 16);
        fb.ellipse(8, i32::MAX, 10, 10, Color::RED);
        fb.ellipse(i32::MIN, 8, 10, 10, Color::RED);
        fb.circle(i32::MAX, i32::MAX, 10, Color::RED);
        fb.circle(8, i32::MIN, 10, Color::RED);
        assert_eq!(fb.count(Color::RED), 0);
    }

    #[test]
    fn shapes_straddling_the_edge_are_clipped() {
        let mut fb = Framebuffer::new(11, 11);
        fb.circle(0, 5, 2, Color::RED);
        // Only columns dx = 0, 1, 2 of the 13-pixel disc are on screen.
        assert_eq!(fb.count(Color::RED), 5 + 3 + 1);
        assert_eq!(fb.pixel(0, 3), Some(Color::RED));
        assert_eq!(fb.pixel(2, 5), Some(Color::RED));

        let mut fb = Framebuffer::new(20, 20);
        fb.ellipse(19, 19, 6, 2, Color::BLUE);
        assert_eq!(fb.pixel(13, 19), Some(Color::BLUE));
        assert_eq!(fb.pixel(19, 17), Some(Color::BLUE));
        assert_eq!(fb.pixel(12, 19), Some(Color::BLACK));
    }

    #[test]
    fn degenerate_ellipse_draws_nothing() {
        let mut fb = Framebuffer::new(20, 20);
        fb.ellipse(10, 10, 0, 5, Color::BLUE);
        fb.ellipse(10, 10, 5, 0, Color::BLUE);
        assert_eq!(fb.count(Color::BLUE), 0);
    }

    #[test]
    fn rgb_export() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set_pixel(0, 0, Color::rgb(1, 2, 3));
        assert_eq!(fb.to_rgb8(), vec![1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn resize_resets_contents() {
        let mut fb = Framebuffer::new(2, 2);
        fb.clear(Color::RED);
        fb.resize(3, 1);
        assert_eq!((fb.width(), fb.height()), (3, 1));
        assert_eq!(fb.count(Color::BLACK), 3);
    }
}

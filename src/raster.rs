use crate::device::{Primitive, RenderDevice};
use crate::math::{clip_to_screen, edge_function, max_depth_slope};
use crate::vertex::ScreenVertex;
use glam::{DMat4, DVec3};
use tracing::trace;

/// Smallest depth step the polygon offset `units` are measured in
const DEPTH_UNIT: f64 = 2.0 / (1u64 << 20) as f64;

/// Software rasterizer with a color buffer and a z-buffer
pub struct RasterDevice {
    width: usize,
    height: usize,
    pixels: Vec<[u8; 3]>,
    z_buffer: Vec<f64>,
    clear_color: [f64; 3],
    depth_test: bool,
    line_width: f64,
    polygon_offset: (f64, f64),
    polygon_offset_enabled: bool,
    projection: DMat4,
    model_view: DMat4,
    stack: Vec<DMat4>,
    color: [f64; 3],
    primitive: Option<Primitive>,
    pending: Vec<Option<ScreenVertex>>,
}

impl RasterDevice {
    pub fn new(width: usize, height: usize) -> Self {
        RasterDevice {
            width,
            height,
            pixels: vec![[0; 3]; width * height],
            z_buffer: vec![f64::INFINITY; width * height],
            clear_color: [0.0; 3],
            depth_test: false,
            line_width: 1.0,
            polygon_offset: (0.0, 0.0),
            polygon_offset_enabled: false,
            projection: DMat4::IDENTITY,
            model_view: DMat4::IDENTITY,
            stack: Vec::new(),
            color: [1.0; 3],
            primitive: None,
            pending: Vec::new(),
        }
    }

    /// Resizes the buffers; contents are undefined until the next clear
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0; 3]; width * height];
        self.z_buffer = vec![f64::INFINITY; width * height];
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixels[y * self.width + x]
    }

    fn passes_depth(&self, offset: usize, depth: f64) -> bool {
        if !(-1.0..=1.0).contains(&depth) {
            return false;
        }
        !self.depth_test || depth <= self.z_buffer[offset]
    }

    fn plot(&mut self, x: isize, y: isize, depth: f64, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return;
        }
        let offset = y as usize * self.width + x as usize;
        if self.passes_depth(offset, depth) {
            self.z_buffer[offset] = depth;
            self.pixels[offset] = rgb;
        }
    }

    /// Fills a triangle with the current color, either winding
    fn draw_triangle(&mut self, v0: &ScreenVertex, v1: &ScreenVertex, v2: &ScreenVertex) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        // Compute bounding box of the triangle
        let min_x = v0.screen_position[0]
            .min(v1.screen_position[0])
            .min(v2.screen_position[0])
            .floor()
            .max(0.0) as usize;
        let max_x = v0.screen_position[0]
            .max(v1.screen_position[0])
            .max(v2.screen_position[0])
            .ceil()
            .min(self.width as f64 - 1.0) as usize;
        let min_y = v0.screen_position[1]
            .min(v1.screen_position[1])
            .min(v2.screen_position[1])
            .floor()
            .max(0.0) as usize;
        let max_y = v0.screen_position[1]
            .max(v1.screen_position[1])
            .max(v2.screen_position[1])
            .ceil()
            .min(self.height as f64 - 1.0) as usize;

        let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
        if area == 0.0 {
            return;
        }

        let bias = if self.polygon_offset_enabled {
            let (factor, units) = self.polygon_offset;
            factor * max_depth_slope(v0, v1, v2) + units * DEPTH_UNIT
        } else {
            0.0
        };
        let rgb = to_rgb8(self.color);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f64 + 0.5, y as f64 + 0.5];

                // Normalized barycentric coordinates are non-negative inside
                // regardless of winding
                let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
                let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
                let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;

                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2 + bias;
                    self.plot(x as isize, y as isize, depth, rgb);
                }
            }
        }
    }

    /// Draws a depth-tested line using Bresenham's algorithm
    fn draw_line(&mut self, from: &ScreenVertex, to: &ScreenVertex) {
        let (mut x0, mut y0, x1, y1) = (
            from.screen_position[0].floor() as isize,
            from.screen_position[1].floor() as isize,
            to.screen_position[0].floor() as isize,
            to.screen_position[1].floor() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let steps = dx.max(-dy).max(1) as f64;
        let mut step = 0.0;
        let width = self.line_width.round().max(1.0) as isize;
        let lo = -((width - 1) / 2);
        let rgb = to_rgb8(self.color);

        loop {
            let depth = from.depth + (to.depth - from.depth) * (step / steps);
            for oy in lo..lo + width {
                for ox in lo..lo + width {
                    self.plot(x0 + ox, y0 + oy, depth, rgb);
                }
            }

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1.0;
        }
    }
}

/// Converts color channels to bytes, clamping out-of-range values
pub fn to_rgb8(color: [f64; 3]) -> [u8; 3] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

impl RenderDevice for RasterDevice {
    fn viewport(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn set_clear_color(&mut self, color: [f64; 3]) {
        self.clear_color = color;
    }

    fn clear(&mut self) {
        let rgb = to_rgb8(self.clear_color);
        self.pixels.fill(rgb);
        self.z_buffer.fill(f64::INFINITY);
    }

    fn enable_depth_test(&mut self) {
        self.depth_test = true;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_polygon_offset(&mut self, factor: f64, units: f64) {
        self.polygon_offset = (factor, units);
    }

    fn set_polygon_offset_enabled(&mut self, enabled: bool) {
        self.polygon_offset_enabled = enabled;
    }

    fn set_projection(&mut self, projection: DMat4) {
        self.projection = projection;
    }

    fn load_view(&mut self, view: DMat4) {
        self.model_view = view;
    }

    fn push_matrix(&mut self) {
        self.stack.push(self.model_view);
    }

    fn pop_matrix(&mut self) {
        if let Some(matrix) = self.stack.pop() {
            self.model_view = matrix;
        }
    }

    fn translate(&mut self, offset: DVec3) {
        self.model_view *= DMat4::from_translation(offset);
    }

    fn scale(&mut self, factor: DVec3) {
        self.model_view *= DMat4::from_scale(factor);
    }

    fn set_color(&mut self, color: [f64; 3]) {
        self.color = color;
    }

    fn begin(&mut self, primitive: Primitive) {
        self.primitive = Some(primitive);
        self.pending.clear();
    }

    fn vertex(&mut self, position: DVec3) {
        let clip = self.projection * self.model_view * position.extend(1.0);
        self.pending
            .push(clip_to_screen(clip, self.width, self.height));
    }

    fn end(&mut self) {
        let Some(primitive) = self.primitive.take() else {
            return;
        };
        let Some(vertices) = std::mem::take(&mut self.pending)
            .into_iter()
            .collect::<Option<Vec<ScreenVertex>>>()
        else {
            trace!(?primitive, "dropping primitive behind the eye");
            return;
        };

        match primitive {
            Primitive::TriangleFan => {
                for i in 1..vertices.len().saturating_sub(1) {
                    self.draw_triangle(&vertices[0], &vertices[i], &vertices[i + 1]);
                }
            }
            Primitive::LineLoop => {
                let n = vertices.len();
                for i in 0..n {
                    self.draw_line(&vertices[i], &vertices[(i + 1) % n]);
                }
            }
        }
    }
}

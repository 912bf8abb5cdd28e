use glam::{DMat4, DVec3};
use std::fmt;

/// Primitive kinds the pipeline draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Convex fan anchored at the first vertex
    TriangleFan,
    /// Closed outline through every vertex
    LineLoop,
}

/// Immediate-mode drawing surface
///
/// Modeled on a fixed-function pipeline: a projection matrix, a model-view
/// matrix with a push/pop stack, a current color, and `begin`/`vertex`/`end`
/// primitive assembly.
pub trait RenderDevice {
    /// Viewport size in device pixels
    fn viewport(&self) -> (usize, usize);

    fn set_clear_color(&mut self, color: [f64; 3]);
    /// Clears the color and depth buffers
    fn clear(&mut self);
    fn enable_depth_test(&mut self);
    fn set_line_width(&mut self, width: f64);
    fn set_polygon_offset(&mut self, factor: f64, units: f64);
    fn set_polygon_offset_enabled(&mut self, enabled: bool);

    fn set_projection(&mut self, projection: DMat4);
    /// Replaces the model-view matrix
    fn load_view(&mut self, view: DMat4);
    fn push_matrix(&mut self);
    fn pop_matrix(&mut self);
    fn translate(&mut self, offset: DVec3);
    fn scale(&mut self, factor: DVec3);

    fn set_color(&mut self, color: [f64; 3]);
    fn begin(&mut self, primitive: Primitive);
    fn vertex(&mut self, position: DVec3);
    fn end(&mut self);
}

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    SetClearColor([f64; 3]),
    Clear,
    EnableDepthTest,
    SetLineWidth(f64),
    SetPolygonOffset(f64, f64),
    PolygonOffset(bool),
    SetProjection(DMat4),
    LoadView(DMat4),
    PushMatrix,
    PopMatrix,
    Translate(DVec3),
    Scale(DVec3),
    SetColor([f64; 3]),
    Begin(Primitive),
    Vertex(DVec3),
    End,
}

impl fmt::Display for DrawCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCall::SetClearColor([r, g, b]) => write!(f, "clear-color {r:.3} {g:.3} {b:.3}"),
            DrawCall::Clear => write!(f, "clear"),
            DrawCall::EnableDepthTest => write!(f, "depth-test on"),
            DrawCall::SetLineWidth(width) => write!(f, "line-width {width}"),
            DrawCall::SetPolygonOffset(factor, units) => {
                write!(f, "polygon-offset {factor} {units}")
            }
            DrawCall::PolygonOffset(enabled) => {
                write!(f, "polygon-offset {}", if *enabled { "on" } else { "off" })
            }
            DrawCall::SetProjection(m) => write!(f, "projection {:?}", m.to_cols_array()),
            DrawCall::LoadView(m) => write!(f, "view {:?}", m.to_cols_array()),
            DrawCall::PushMatrix => write!(f, "push"),
            DrawCall::PopMatrix => write!(f, "pop"),
            DrawCall::Translate(v) => write!(f, "translate {:.3} {:.3} {:.3}", v.x, v.y, v.z),
            DrawCall::Scale(v) => write!(f, "scale {:.3} {:.3} {:.3}", v.x, v.y, v.z),
            DrawCall::SetColor([r, g, b]) => write!(f, "color {r:.3} {g:.3} {b:.3}"),
            DrawCall::Begin(primitive) => write!(f, "begin {primitive:?}"),
            DrawCall::Vertex(v) => write!(f, "  vertex {:.4} {:.4} {:.4}", v.x, v.y, v.z),
            DrawCall::End => write!(f, "end"),
        }
    }
}

/// Device that records calls instead of drawing
#[derive(Debug, Clone)]
pub struct RecordingDevice {
    width: usize,
    height: usize,
    pub calls: Vec<DrawCall>,
}

impl RecordingDevice {
    pub fn new(width: usize, height: usize) -> Self {
        RecordingDevice {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// Returns the recorded calls, leaving the recording empty
    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl RenderDevice for RecordingDevice {
    fn viewport(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn set_clear_color(&mut self, color: [f64; 3]) {
        self.calls.push(DrawCall::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
    }

    fn enable_depth_test(&mut self) {
        self.calls.push(DrawCall::EnableDepthTest);
    }

    fn set_line_width(&mut self, width: f64) {
        self.calls.push(DrawCall::SetLineWidth(width));
    }

    fn set_polygon_offset(&mut self, factor: f64, units: f64) {
        self.calls.push(DrawCall::SetPolygonOffset(factor, units));
    }

    fn set_polygon_offset_enabled(&mut self, enabled: bool) {
        self.calls.push(DrawCall::PolygonOffset(enabled));
    }

    fn set_projection(&mut self, projection: DMat4) {
        self.calls.push(DrawCall::SetProjection(projection));
    }

    fn load_view(&mut self, view: DMat4) {
        self.calls.push(DrawCall::LoadView(view));
    }

    fn push_matrix(&mut self) {
        self.calls.push(DrawCall::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.calls.push(DrawCall::PopMatrix);
    }

    fn translate(&mut self, offset: DVec3) {
        self.calls.push(DrawCall::Translate(offset));
    }

    fn scale(&mut self, factor: DVec3) {
        self.calls.push(DrawCall::Scale(factor));
    }

    fn set_color(&mut self, color: [f64; 3]) {
        self.calls.push(DrawCall::SetColor(color));
    }

    fn begin(&mut self, primitive: Primitive) {
        self.calls.push(DrawCall::Begin(primitive));
    }

    fn vertex(&mut self, position: DVec3) {
        self.calls.push(DrawCall::Vertex(position));
    }

    fn end(&mut self) {
        self.calls.push(DrawCall::End);
    }
}

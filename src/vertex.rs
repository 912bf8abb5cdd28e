/// Vertex after projection, in device pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub screen_position: [f64; 2],
    /// Normalized device depth, -1 near to 1 far
    pub depth: f64,
}

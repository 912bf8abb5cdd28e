use crate::vertex::ScreenVertex;
use glam::{DMat4, DVec3, DVec4};

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Perspective projection for the view volume `[left, right] x [bottom, top]`
/// at distance `near`, matching `glFrustum`
pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> DMat4 {
    DMat4::from_cols(
        DVec4::new(2.0 * near / (right - left), 0.0, 0.0, 0.0),
        DVec4::new(0.0, 2.0 * near / (top - bottom), 0.0, 0.0),
        DVec4::new(
            (right + left) / (right - left),
            (top + bottom) / (top - bottom),
            -(far + near) / (far - near),
            -1.0,
        ),
        DVec4::new(0.0, 0.0, -2.0 * far * near / (far - near), 0.0),
    )
}

/// Maps a clip-space position to pixel coordinates, or `None` when it lies
/// behind the eye
pub fn clip_to_screen(clip: DVec4, width: usize, height: usize) -> Option<ScreenVertex> {
    if clip.w <= f64::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(ScreenVertex {
        screen_position: [
            (ndc.x + 1.0) * 0.5 * width as f64,
            (1.0 - ndc.y) * 0.5 * height as f64,
        ],
        depth: ndc.z,
    })
}

/// Projects a viewport position onto the virtual trackball sphere.
///
/// `x` and `y` are in `[-1, 1]` with `y` pointing up; points outside the unit
/// circle land on its rim.
pub fn trackball_point(x: f64, y: f64) -> DVec3 {
    let d2 = x * x + y * y;
    if d2 >= 1.0 {
        DVec3::new(x, y, 0.0) / d2.sqrt()
    } else {
        DVec3::new(x, y, (1.0 - d2).sqrt())
    }
}

/// Largest screen-space depth gradient of a triangle, for polygon offset
pub fn max_depth_slope(v0: &ScreenVertex, v1: &ScreenVertex, v2: &ScreenVertex) -> f64 {
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area.abs() <= f64::EPSILON {
        return 0.0;
    }
    let (x0, y0) = (v0.screen_position[0], v0.screen_position[1]);
    let (dx1, dy1, dz1) = (
        v1.screen_position[0] - x0,
        v1.screen_position[1] - y0,
        v1.depth - v0.depth,
    );
    let (dx2, dy2, dz2) = (
        v2.screen_position[0] - x0,
        v2.screen_position[1] - y0,
        v2.depth - v0.depth,
    );
    let det = dx1 * dy2 - dx2 * dy1;
    let dzdx = (dz1 * dy2 - dz2 * dy1) / det;
    let dzdy = (dx1 * dz2 - dx2 * dz1) / det;
    dzdx.abs().max(dzdy.abs())
}

//! Per-frame draw sequence
//!
//! One frame is: clear, install the camera, push the model transform, fill
//! pass, outline pass, pop. The same state always produces the same calls.

use crate::camera::Camera;
use crate::device::{Primitive, RenderDevice};
use crate::polyhedron::Geometry;
use crate::state::{FillMode, ModeState, Projection, TransformState};
use glam::DVec3;

pub const CLEAR_COLOR: [f64; 3] = [0.0, 0.0, 0.0];
pub const POLYGON_OFFSET: (f64, f64) = (1.0, 2.0);
pub const EDGE_COLOR_ALONE: [f64; 3] = [1.0, 1.0, 1.0];
pub const EDGE_COLOR_OVER_FACES: [f64; 3] = [0.0, 0.0, 0.0];

pub const CAMERA_EYE: DVec3 = DVec3::new(2.0, 2.0, 6.0);
pub const CAMERA_TARGET: DVec3 = DVec3::ZERO;
pub const CAMERA_UP: DVec3 = DVec3::Y;
pub const CAMERA_SCALE: f64 = 3.0;

/// One-time device and camera setup
pub fn init(device: &mut dyn RenderDevice, camera: &mut dyn Camera, line_width: f64) {
    device.set_clear_color(CLEAR_COLOR);
    device.enable_depth_test();
    device.set_line_width(line_width);
    device.set_polygon_offset(POLYGON_OFFSET.0, POLYGON_OFFSET.1);
    reset_camera(camera);
    camera.set_scale(CAMERA_SCALE);
}

/// Re-applies the fixed look-at, discarding any drag rotation
pub fn reset_camera(camera: &mut dyn Camera) {
    camera.look_at(CAMERA_EYE, CAMERA_TARGET, CAMERA_UP);
}

/// Renders one frame.
///
/// Unset scale axes in `transform` are resolved from the model's bounding
/// radius and kept. Panics if a face references a vertex index out of range.
pub fn render(
    device: &mut dyn RenderDevice,
    camera: &mut dyn Camera,
    mode: &ModeState,
    transform: &mut TransformState,
    model: &dyn Geometry,
) {
    device.clear();
    camera.set_orthographic(mode.projection == Projection::Orthographic);
    camera.apply(device);

    device.push_matrix();
    device.translate(transform.translation());
    let scale = transform.resolve_scale(model.bounding_radius());
    device.scale(scale);

    if mode.fill.draws_faces() {
        if mode.fill == FillMode::Both {
            device.set_polygon_offset_enabled(true);
        }
        device.set_color(transform.color);
        draw_faces(device, model, Primitive::TriangleFan);
    }
    device.set_polygon_offset_enabled(false);

    if mode.fill.draws_edges() {
        if mode.fill == FillMode::Both {
            device.set_color(EDGE_COLOR_OVER_FACES);
        } else {
            device.set_color(EDGE_COLOR_ALONE);
        }
        draw_faces(device, model, Primitive::LineLoop);
    }

    device.pop_matrix();
}

fn draw_faces(device: &mut dyn RenderDevice, model: &dyn Geometry, primitive: Primitive) {
    let vertices = model.vertices();
    for face in model.faces() {
        device.begin(primitive);
        for &index in face {
            device.vertex(vertices[index]);
        }
        device.end();
    }
}

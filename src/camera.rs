use crate::device::RenderDevice;
use crate::math::{frustum, trackball_point};
use glam::{DMat4, DQuat, DVec3};

/// View and projection provider with drag-to-rotate input
pub trait Camera {
    /// Places the camera, discarding any accumulated drag rotation
    fn look_at(&mut self, eye: DVec3, target: DVec3, up: DVec3);
    /// Half extent of the visible volume around the target
    fn set_scale(&mut self, scale: f64);
    fn set_orthographic(&mut self, orthographic: bool);
    /// Installs the projection and view matrices on `device`
    fn apply(&self, device: &mut dyn RenderDevice);

    /// Starts a trackball drag at a viewport pixel position
    fn begin_drag(&mut self, position: [f64; 2], viewport: (usize, usize));
    /// Continues a drag; returns whether the view changed
    fn drag_to(&mut self, position: [f64; 2], viewport: (usize, usize)) -> bool;
    fn end_drag(&mut self);
}

/// Look-at camera with a virtual-sphere trackball
#[derive(Debug, Clone)]
pub struct TrackballCamera {
    eye: DVec3,
    target: DVec3,
    up: DVec3,
    scale: f64,
    orthographic: bool,
    /// Rotation about the target, in eye coordinates
    rotation: DQuat,
    drag_anchor: Option<DVec3>,
}

impl TrackballCamera {
    pub fn new() -> Self {
        TrackballCamera {
            eye: DVec3::new(0.0, 0.0, 30.0),
            target: DVec3::ZERO,
            up: DVec3::Y,
            scale: 10.0,
            orthographic: false,
            rotation: DQuat::IDENTITY,
            drag_anchor: None,
        }
    }

    fn view_distance(&self) -> f64 {
        (self.eye - self.target).length()
    }

    pub fn projection(&self, viewport: (usize, usize)) -> DMat4 {
        let (width, height) = viewport;
        let s = self.scale;
        let (mut xmin, mut xmax, mut ymin, mut ymax) = (-s, s, -s, s);
        let (zmin, zmax) = (-s, s);

        // widen whichever axis is longer so the volume keeps its aspect
        let aspect = width.max(1) as f64 / height.max(1) as f64;
        if aspect >= 1.0 {
            xmin *= aspect;
            xmax *= aspect;
        } else {
            ymin /= aspect;
            ymax /= aspect;
        }

        let distance = self.view_distance();
        if self.orthographic {
            DMat4::orthographic_rh_gl(xmin, xmax, ymin, ymax, distance - zmax, distance - zmin)
        } else {
            let near = (distance - zmax).max(0.1 * distance);
            let far = distance - zmin;
            let k = near / distance;
            frustum(xmin * k, xmax * k, ymin * k, ymax * k, near, far)
        }
    }

    pub fn view(&self) -> DMat4 {
        let look = DMat4::look_at_rh(self.eye, self.target, self.up);
        let pivot = DVec3::new(0.0, 0.0, -self.view_distance());
        DMat4::from_translation(pivot)
            * DMat4::from_quat(self.rotation)
            * DMat4::from_translation(-pivot)
            * look
    }

    fn sphere_point(position: [f64; 2], viewport: (usize, usize)) -> DVec3 {
        let (width, height) = (viewport.0 as f64, viewport.1 as f64);
        let radius = (width.min(height) / 2.0).max(1.0);
        trackball_point(
            (position[0] - width / 2.0) / radius,
            (height / 2.0 - position[1]) / radius,
        )
    }
}

impl Default for TrackballCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for TrackballCamera {
    fn look_at(&mut self, eye: DVec3, target: DVec3, up: DVec3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
        self.rotation = DQuat::IDENTITY;
        self.drag_anchor = None;
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn set_orthographic(&mut self, orthographic: bool) {
        self.orthographic = orthographic;
    }

    fn apply(&self, device: &mut dyn RenderDevice) {
        let projection = self.projection(device.viewport());
        device.set_projection(projection);
        device.load_view(self.view());
    }

    fn begin_drag(&mut self, position: [f64; 2], viewport: (usize, usize)) {
        self.drag_anchor = Some(Self::sphere_point(position, viewport));
    }

    fn drag_to(&mut self, position: [f64; 2], viewport: (usize, usize)) -> bool {
        let Some(anchor) = self.drag_anchor else {
            return false;
        };
        let point = Self::sphere_point(position, viewport);
        if anchor.abs_diff_eq(point, 1e-9) {
            return false;
        }
        self.rotation = (DQuat::from_rotation_arc(anchor, point) * self.rotation).normalize();
        self.drag_anchor = Some(point);
        true
    }

    fn end_drag(&mut self) {
        self.drag_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DrawCall, RecordingDevice};

    fn placed_camera() -> TrackballCamera {
        let mut camera = TrackballCamera::new();
        camera.look_at(DVec3::new(2.0, 2.0, 6.0), DVec3::ZERO, DVec3::Y);
        camera.set_scale(3.0);
        camera
    }

    #[test]
    fn apply_installs_projection_then_view() {
        let camera = placed_camera();
        let mut device = RecordingDevice::new(100, 100);
        camera.apply(&mut device);
        assert_eq!(device.calls.len(), 2);
        assert!(matches!(device.calls[0], DrawCall::SetProjection(_)));
        match device.calls[1] {
            DrawCall::LoadView(view) => {
                let expected = DMat4::look_at_rh(DVec3::new(2.0, 2.0, 6.0), DVec3::ZERO, DVec3::Y);
                assert!(view.abs_diff_eq(expected, 1e-12));
            }
            ref other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let camera = placed_camera();
        for orthographic in [false, true] {
            let mut camera = camera.clone();
            camera.set_orthographic(orthographic);
            let clip = camera.projection((200, 100)) * camera.view() * DVec3::ZERO.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() < 1e-12 && ndc.y.abs() < 1e-12);
            assert!(ndc.z > -1.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn drag_rotates_and_look_at_resets() {
        let mut camera = placed_camera();
        let before = camera.view();
        camera.begin_drag([50.0, 50.0], (100, 100));
        assert!(camera.drag_to([70.0, 40.0], (100, 100)));
        camera.end_drag();
        assert!(!camera.view().abs_diff_eq(before, 1e-6));

        camera.look_at(DVec3::new(2.0, 2.0, 6.0), DVec3::ZERO, DVec3::Y);
        assert!(camera.view().abs_diff_eq(before, 1e-12));
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut camera = placed_camera();
        assert!(!camera.drag_to([10.0, 10.0], (100, 100)));
    }
}

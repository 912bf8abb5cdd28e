use crate::camera::Camera;
use crate::device::RenderDevice;
use crate::input::{apply_key, Key};
use crate::menu::{MenuBar, MenuResponse};
use crate::pipeline;
use crate::polyhedron::{Geometry, ModelLibrary};
use crate::state::{ModeChoice, ModeState, TransformState};
use crate::terminal;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::{debug, info, trace, warn};

/// Whether the event loop should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Polyhedron viewer widget
///
/// Owns the mode and transform state, the camera and the menu bar; the
/// rendering device is lent to it for each paint.
pub struct ViewerWidget<C: Camera> {
    mode: ModeState,
    transform: TransformState,
    library: ModelLibrary,
    camera: C,
    menu: MenuBar,
    /// Viewport size in raster pixels
    viewport: (usize, usize),
    needs_paint: bool,
    /// Is the user currently dragging for rotation?
    dragging: bool,
    /// Set while the terminal is below the minimum size
    size_error: Option<String>,
    frames: u64,
}

impl<C: Camera> ViewerWidget<C> {
    pub fn new(mode: ModeState, mut camera: C, device: &mut dyn RenderDevice, line_width: f64) -> Self {
        pipeline::init(device, &mut camera, line_width);
        ViewerWidget {
            mode,
            transform: TransformState::default(),
            library: ModelLibrary::new(),
            camera,
            menu: MenuBar::new(),
            viewport: device.viewport(),
            needs_paint: true,
            dragging: false,
            size_error: None,
            frames: 0,
        }
    }

    pub fn mode(&self) -> &ModeState {
        &self.mode
    }

    pub fn menu(&self) -> &MenuBar {
        &self.menu
    }

    /// Why the viewport cannot be shown, if the terminal is too small
    pub fn size_error(&self) -> Option<&str> {
        self.size_error.as_deref()
    }

    pub fn request_paint(&mut self) {
        self.needs_paint = true;
    }

    /// Returns and clears the pending paint request
    pub fn take_paint_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_paint)
    }

    /// Handle events for the viewer
    pub fn event(&mut self, event: &Event) -> Outcome {
        match event {
            Event::Key(key_event) => return self.key(key_event),
            Event::Mouse(mouse_event) => self.mouse(mouse_event),
            Event::Resize(cols, rows) => {
                self.viewport = terminal::viewport_pixels(*cols, *rows);
                debug!(cols, rows, viewport = ?self.viewport, "terminal resized");
                self.size_error = match terminal::check_size(*cols, *rows) {
                    Ok(()) => None,
                    Err(err) => {
                        warn!(%err, "viewport hidden");
                        Some(err.to_string())
                    }
                };
                self.request_paint();
            }
            _ => {}
        }
        Outcome::Continue
    }

    fn key(&mut self, event: &KeyEvent) -> Outcome {
        if event.kind == KeyEventKind::Release {
            return Outcome::Continue;
        }
        if event.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(event.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            info!("quit requested");
            return Outcome::Quit;
        }

        match self.menu.handle_key(event) {
            MenuResponse::Selected(choice) => self.choose(choice),
            MenuResponse::Consumed => self.request_paint(),
            MenuResponse::Ignored => {
                if let Some(key) = Key::from_event(event) {
                    apply_key(&mut self.transform, key);
                }
                self.request_paint();
            }
        }
        Outcome::Continue
    }

    fn mouse(&mut self, event: &MouseEvent) {
        let (column, row) = (usize::from(event.column), usize::from(event.row));
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => match self.menu.handle_click(column, row) {
                MenuResponse::Selected(choice) => self.choose(choice),
                MenuResponse::Consumed => self.request_paint(),
                MenuResponse::Ignored => {
                    if let Some(position) = terminal::cell_to_pixel(event.column, event.row) {
                        self.camera.begin_drag(position, self.viewport);
                        self.dragging = true;
                    }
                }
            },
            MouseEventKind::Drag(MouseButton::Left) if self.dragging => {
                if let Some(position) = terminal::cell_to_pixel(event.column, event.row) {
                    if self.camera.drag_to(position, self.viewport) {
                        self.request_paint();
                    }
                }
            }
            MouseEventKind::Up(MouseButton::Left) if self.dragging => {
                self.camera.end_drag();
                self.dragging = false;
            }
            _ => {}
        }
    }

    /// Applies a menu selection
    fn choose(&mut self, choice: ModeChoice) {
        self.mode.select(choice);
        match choice {
            ModeChoice::Model(model) => {
                pipeline::reset_camera(&mut self.camera);
                info!(%model, "model selected");
            }
            _ => debug!(?choice, "render option selected"),
        }
        self.request_paint();
    }

    /// Paint the viewer
    pub fn paint(&mut self, device: &mut dyn RenderDevice) {
        let model = self.library.get(self.mode.active_model);
        pipeline::render(device, &mut self.camera, &self.mode, &mut self.transform, model);
        self.frames += 1;
        trace!(frame = self.frames, faces = model.faces().len(), "frame rendered");
    }

    /// Text for the status row
    pub fn status_line(&self) -> String {
        let scale = self.transform.scale.map(|axis| match axis {
            Some(value) => format!("{value:.2}"),
            None => "auto".to_string(),
        });
        let [tx, ty, tz] = self.transform.translate;
        let [r, g, b] = self.transform.color;
        format!(
            " {} | {:?} {:?} {:?} | scale {} {} {} | move {tx:.1} {ty:.1} {tz:.1} | rgb {r:.1} {g:.1} {b:.1} | F1/F2 menus, ^Q quit",
            self.mode.active_model,
            self.mode.fill,
            self.mode.shade,
            self.mode.projection,
            scale[0],
            scale[1],
            scale[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::TrackballCamera;
    use crate::device::{DrawCall, RecordingDevice};
    use crate::pipeline::{CAMERA_EYE, CAMERA_TARGET, CAMERA_UP};
    use crate::polyhedron::Polyhedron;
    use crate::state::{FillMode, ModelId, Projection, ShadeMode};
    use glam::{DMat4, DVec3};

    fn widget() -> (ViewerWidget<TrackballCamera>, RecordingDevice) {
        let mut device = RecordingDevice::new(80, 44);
        let widget = ViewerWidget::new(ModeState::default(), TrackballCamera::new(), &mut device, 1.0);
        device.take();
        (widget, device)
    }

    fn press(widget: &mut ViewerWidget<TrackballCamera>, code: KeyCode) -> Outcome {
        widget.event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn mouse(widget: &mut ViewerWidget<TrackballCamera>, kind: MouseEventKind, column: u16, row: u16) {
        widget.event(&Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }));
    }

    fn drag(widget: &mut ViewerWidget<TrackballCamera>) {
        mouse(widget, MouseEventKind::Down(MouseButton::Left), 40, 10);
        mouse(widget, MouseEventKind::Drag(MouseButton::Left), 55, 14);
        mouse(widget, MouseEventKind::Up(MouseButton::Left), 55, 14);
    }

    /// Clicks the Render Options title and returns its column
    fn open_render_options(widget: &mut ViewerWidget<TrackballCamera>) -> u16 {
        let (start, _) = widget.menu().title_span(1);
        mouse(widget, MouseEventKind::Down(MouseButton::Left), start as u16, 0);
        start as u16
    }

    fn scale_call(calls: &[DrawCall]) -> DVec3 {
        calls
            .iter()
            .find_map(|call| match call {
                DrawCall::Scale(scale) => Some(*scale),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn first_frame_uses_inverse_bounding_radius() {
        let (mut widget, mut device) = widget();
        widget.paint(&mut device);
        let radius = Polyhedron::model(ModelId::Octocone).bounding_radius();
        assert_eq!(scale_call(&device.take()), DVec3::splat(1.0 / radius));
    }

    #[test]
    fn up_before_first_frame_is_not_defaulted() {
        let (mut widget, mut device) = widget();
        press(&mut widget, KeyCode::Up);
        assert_eq!(widget.transform.scale[0], Some(-0.1));
        widget.paint(&mut device);
        let radius = Polyhedron::model(ModelId::Octocone).bounding_radius();
        assert_eq!(
            scale_call(&device.take()),
            DVec3::new(-0.1, 1.0 / radius, 1.0 / radius)
        );
    }

    #[test]
    fn every_key_requests_paint() {
        let (mut widget, _) = widget();
        widget.take_paint_request();
        press(&mut widget, KeyCode::Char('z'));
        assert!(widget.take_paint_request());
        press(&mut widget, KeyCode::Char('q'));
        assert!(widget.take_paint_request());
        assert_eq!(widget.transform.translate[0], 0.1);
    }

    #[test]
    fn key_release_is_ignored() {
        let (mut widget, _) = widget();
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        widget.event(&Event::Key(release));
        assert_eq!(widget.transform.translate, [0.0; 3]);
    }

    #[test]
    fn control_q_quits() {
        let (mut widget, _) = widget();
        let quit = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert_eq!(widget.event(&quit), Outcome::Quit);
        assert_eq!(widget.transform.translate, [0.0; 3]);
    }

    #[test]
    fn arrows_drive_the_open_menu_instead_of_scale() {
        let (mut widget, _) = widget();
        press(&mut widget, KeyCode::F(2));
        press(&mut widget, KeyCode::Down);
        assert_eq!(widget.transform.scale, [None; 3]);
        press(&mut widget, KeyCode::Esc);
        press(&mut widget, KeyCode::Down);
        assert_eq!(widget.transform.scale[0], Some(0.1));
    }

    #[test]
    fn model_switch_resets_camera_and_keeps_transform() {
        let (mut widget, mut device) = widget();
        widget.paint(&mut device);
        press(&mut widget, KeyCode::Char('w'));
        press(&mut widget, KeyCode::Char('9'));
        let before = widget.transform;

        drag(&mut widget);
        let fixed = DMat4::look_at_rh(CAMERA_EYE, CAMERA_TARGET, CAMERA_UP);
        assert!(!widget.camera.view().abs_diff_eq(fixed, 1e-6));

        // Shapes > Hourglass
        press(&mut widget, KeyCode::F(1));
        for _ in 0..3 {
            press(&mut widget, KeyCode::Down);
        }
        widget.take_paint_request();
        press(&mut widget, KeyCode::Enter);

        assert!(widget.take_paint_request());
        assert_eq!(widget.mode().active_model, ModelId::Hourglass);
        assert!(widget.camera.view().abs_diff_eq(fixed, 1e-12));
        assert_eq!(widget.transform, before);
    }

    #[test]
    fn render_options_repaint_and_keep_view_and_transform() {
        let (mut widget, mut device) = widget();
        widget.paint(&mut device);
        press(&mut widget, KeyCode::Char('e'));
        press(&mut widget, KeyCode::Char('3'));
        drag(&mut widget);
        let fixed = DMat4::look_at_rh(CAMERA_EYE, CAMERA_TARGET, CAMERA_UP);
        let view = widget.camera.view();
        let transform = widget.transform;
        assert!(!view.abs_diff_eq(fixed, 1e-6));

        // Customize Faces, Draw Edges Only, Orthographic Projection
        for entry in [1, 4, 8] {
            let column = open_render_options(&mut widget);
            widget.take_paint_request();
            mouse(&mut widget, MouseEventKind::Down(MouseButton::Left), column + 1, entry + 1);
            assert_eq!(widget.menu().open_menu(), None);
            assert!(widget.take_paint_request(), "entry {entry} did not repaint");
            assert_eq!(widget.camera.view(), view);
            assert_eq!(widget.transform, transform);
        }
        assert_eq!(widget.mode().shade, ShadeMode::Custom);
        assert_eq!(widget.mode().fill, FillMode::EdgesOnly);
        assert_eq!(widget.mode().projection, Projection::Orthographic);
    }

    #[test]
    fn fill_switches_leave_color_alone() {
        let (mut widget, mut device) = widget();
        let (start, _) = widget.menu().title_span(1);
        // Render Options > Draw Faces Only
        mouse(&mut widget, MouseEventKind::Down(MouseButton::Left), start as u16, 0);
        mouse(&mut widget, MouseEventKind::Down(MouseButton::Left), start as u16 + 1, 4);
        assert_eq!(widget.mode().fill, FillMode::FacesOnly);
        widget.paint(&mut device);
        let faces_only = device.take();

        // Render Options > Draw Both
        mouse(&mut widget, MouseEventKind::Down(MouseButton::Left), start as u16, 0);
        mouse(&mut widget, MouseEventKind::Down(MouseButton::Left), start as u16 + 1, 6);
        assert_eq!(widget.mode().fill, FillMode::Both);
        widget.paint(&mut device);
        let both = device.take();

        let fill = DrawCall::SetColor([1.0; 3]);
        assert!(faces_only.contains(&fill));
        assert!(both.contains(&fill));
        assert_eq!(widget.transform.color, [1.0; 3]);
    }

    #[test]
    fn resize_below_minimum_hides_viewport_until_restored() {
        let (mut widget, _) = widget();
        widget.take_paint_request();
        widget.event(&Event::Resize(12, 4));
        assert!(widget.take_paint_request());
        let message = widget.size_error().unwrap();
        assert!(message.contains("12x4"), "{message}");

        widget.event(&Event::Resize(80, 24));
        assert_eq!(widget.size_error(), None);
        assert_eq!(widget.viewport, (80, 44));
    }

    #[test]
    fn status_line_reports_state() {
        let (mut widget, _) = widget();
        press(&mut widget, KeyCode::PageUp);
        let status = widget.status_line();
        assert!(status.contains("Octocone"));
        assert!(status.contains("scale auto auto 0.10"));
    }
}

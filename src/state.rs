use clap::ValueEnum;
use glam::DVec3;
use std::fmt;

/// Which passes the renderer draws each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FillMode {
    FacesOnly,
    EdgesOnly,
    Both,
}

impl FillMode {
    pub fn draws_faces(self) -> bool {
        matches!(self, FillMode::FacesOnly | FillMode::Both)
    }

    pub fn draws_edges(self) -> bool {
        matches!(self, FillMode::EdgesOnly | FillMode::Both)
    }
}

/// Face coloring choice offered in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShadeMode {
    Flat,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Projection {
    Perspective,
    Orthographic,
}

/// The fixed set of models offered in the Shapes menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ModelId {
    Octocone,
    Dome,
    SquareDonut,
    Hourglass,
    LetterX,
    LetterV,
}

impl ModelId {
    pub const ALL: [ModelId; 6] = [
        ModelId::Octocone,
        ModelId::Dome,
        ModelId::SquareDonut,
        ModelId::Hourglass,
        ModelId::LetterX,
        ModelId::LetterV,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModelId::Octocone => "Octocone",
            ModelId::Dome => "Dome",
            ModelId::SquareDonut => "Square Donut",
            ModelId::Hourglass => "Hourglass",
            ModelId::LetterX => "Letter X",
            ModelId::LetterV => "Letter V",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A selection made in one of the exclusive menu groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChoice {
    Shade(ShadeMode),
    Fill(FillMode),
    Projection(Projection),
    Model(ModelId),
}

/// Render and model selection state
///
/// Every menu group is a single field, so exactly one member of each group is
/// active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeState {
    pub fill: FillMode,
    pub shade: ShadeMode,
    pub projection: Projection,
    pub active_model: ModelId,
}

impl Default for ModeState {
    fn default() -> Self {
        ModeState {
            fill: FillMode::Both,
            shade: ShadeMode::Flat,
            projection: Projection::Perspective,
            active_model: ModelId::Octocone,
        }
    }
}

impl ModeState {
    /// Makes `choice` the active member of its group.
    pub fn select(&mut self, choice: ModeChoice) {
        match choice {
            ModeChoice::Shade(shade) => self.shade = shade,
            ModeChoice::Fill(fill) => self.fill = fill,
            ModeChoice::Projection(projection) => self.projection = projection,
            ModeChoice::Model(model) => self.active_model = model,
        }
    }

    pub fn is_selected(&self, choice: ModeChoice) -> bool {
        match choice {
            ModeChoice::Shade(shade) => self.shade == shade,
            ModeChoice::Fill(fill) => self.fill == fill,
            ModeChoice::Projection(projection) => self.projection == projection,
            ModeChoice::Model(model) => self.active_model == model,
        }
    }
}

/// Keyboard-driven model transform and fill color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    /// Per-axis scale, `None` until first rendered or nudged
    pub scale: [Option<f64>; 3],
    pub translate: [f64; 3],
    /// Fill color channels, unclamped
    pub color: [f64; 3],
}

impl Default for TransformState {
    fn default() -> Self {
        TransformState {
            scale: [None; 3],
            translate: [0.0; 3],
            color: [1.0; 3],
        }
    }
}

impl TransformState {
    /// Adds `delta` to one scale axis. An unset axis starts from 0.
    pub fn nudge_scale(&mut self, axis: usize, delta: f64) {
        let current = self.scale[axis].unwrap_or(0.0);
        self.scale[axis] = Some(current + delta);
    }

    pub fn reset_scale(&mut self) {
        self.scale = [Some(1.0); 3];
    }

    pub fn nudge_translate(&mut self, axis: usize, delta: f64) {
        self.translate[axis] += delta;
    }

    pub fn reset_translate(&mut self) {
        self.translate = [0.0; 3];
    }

    pub fn nudge_color(&mut self, channel: usize, delta: f64) {
        self.color[channel] += delta;
    }

    pub fn set_color(&mut self, channel: usize, value: f64) {
        self.color[channel] = value;
    }

    /// Resolves every unset scale axis to `1 / bounding_radius` and returns
    /// the scale to render with. Resolved axes are kept, so later model
    /// switches do not re-default them.
    pub fn resolve_scale(&mut self, bounding_radius: f64) -> DVec3 {
        let default = 1.0 / bounding_radius;
        for axis in self.scale.iter_mut() {
            if axis.is_none() {
                *axis = Some(default);
            }
        }
        DVec3::new(
            self.scale[0].unwrap_or(default),
            self.scale[1].unwrap_or(default),
            self.scale[2].unwrap_or(default),
        )
    }

    pub fn translation(&self) -> DVec3 {
        DVec3::from_array(self.translate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults() {
        let mode = ModeState::default();
        assert_eq!(mode.fill, FillMode::Both);
        assert_eq!(mode.shade, ShadeMode::Flat);
        assert_eq!(mode.projection, Projection::Perspective);
        assert_eq!(mode.active_model, ModelId::Octocone);
    }

    #[test]
    fn select_keeps_one_member_per_group() {
        let mut mode = ModeState::default();
        mode.select(ModeChoice::Fill(FillMode::EdgesOnly));
        assert!(mode.is_selected(ModeChoice::Fill(FillMode::EdgesOnly)));
        assert!(!mode.is_selected(ModeChoice::Fill(FillMode::Both)));
        assert!(!mode.is_selected(ModeChoice::Fill(FillMode::FacesOnly)));
        // other groups untouched
        assert_eq!(mode.projection, Projection::Perspective);
        assert_eq!(mode.active_model, ModelId::Octocone);
    }

    #[test]
    fn unset_axes_resolve_to_inverse_radius() {
        let mut transform = TransformState::default();
        let scale = transform.resolve_scale(4.0);
        assert_eq!(scale, DVec3::splat(0.25));
        assert_eq!(transform.scale, [Some(0.25); 3]);
    }

    #[test]
    fn nudged_axis_is_not_defaulted() {
        let mut transform = TransformState::default();
        transform.nudge_scale(0, -0.1);
        assert_eq!(transform.scale[0], Some(-0.1));
        let scale = transform.resolve_scale(2.0);
        assert_eq!(scale, DVec3::new(-0.1, 0.5, 0.5));
    }

    #[test]
    fn axis_nudged_back_to_zero_stays_zero() {
        let mut transform = TransformState::default();
        transform.nudge_scale(1, -0.1);
        transform.nudge_scale(1, 0.1);
        assert_eq!(transform.scale[1], Some(0.0));
        assert_eq!(transform.resolve_scale(2.0).y, 0.0);
    }

    #[test]
    fn resolved_scale_survives_a_new_radius() {
        let mut transform = TransformState::default();
        transform.resolve_scale(2.0);
        assert_eq!(transform.resolve_scale(10.0), DVec3::splat(0.5));
    }

    #[test]
    fn reset_scale_after_default() {
        let mut transform = TransformState::default();
        transform.resolve_scale(3.0);
        transform.nudge_scale(2, 0.1);
        transform.reset_scale();
        assert_eq!(transform.resolve_scale(3.0), DVec3::ONE);
    }
}

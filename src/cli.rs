//! Command-line configuration using clap

use crate::state::{FillMode, ModeState, ModelId, Projection, ShadeMode};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "polyview", version)]
#[command(about = "Terminal polyhedron viewer with keyboard transforms and a trackball camera")]
pub struct Cli {
    /// Model shown at startup
    #[arg(long, value_enum, default_value_t = ModelId::Octocone)]
    pub model: ModelId,

    /// Which passes to draw
    #[arg(long, value_enum, default_value_t = FillMode::Both)]
    pub fill: FillMode,

    /// Face coloring choice
    #[arg(long, value_enum, default_value_t = ShadeMode::Flat)]
    pub shade: ShadeMode,

    #[arg(long, value_enum, default_value_t = Projection::Perspective)]
    pub projection: Projection,

    /// Outline width in raster pixels (2 gives desktop OpenGL line weight)
    #[arg(long, default_value_t = 1.0, value_parser = parse_line_width)]
    pub line_width: f64,

    /// Append log output to this file (RUST_LOG selects the level)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the draw calls of one frame instead of opening the viewer
    #[arg(long)]
    pub dump_frame: bool,
}

impl Cli {
    pub fn initial_mode(&self) -> ModeState {
        ModeState {
            fill: self.fill,
            shade: self.shade,
            projection: self.projection,
            active_model: self.model,
        }
    }
}

fn parse_line_width(value: &str) -> Result<f64, String> {
    let width: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if width.is_finite() && width >= 1.0 {
        Ok(width)
    } else {
        Err("line width must be at least 1".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_mode_defaults() {
        let cli = Cli::try_parse_from(["polyview"]).unwrap();
        assert_eq!(cli.initial_mode(), ModeState::default());
        assert_eq!(cli.line_width, 1.0);
        assert!(!cli.dump_frame);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn initial_modes_from_flags() {
        let cli = Cli::try_parse_from([
            "polyview",
            "--model",
            "square-donut",
            "--fill",
            "edges-only",
            "--projection",
            "orthographic",
            "--shade",
            "custom",
        ])
        .unwrap();
        let mode = cli.initial_mode();
        assert_eq!(mode.active_model, ModelId::SquareDonut);
        assert_eq!(mode.fill, FillMode::EdgesOnly);
        assert_eq!(mode.projection, Projection::Orthographic);
        assert_eq!(mode.shade, ShadeMode::Custom);
    }

    #[test]
    fn rejects_thin_lines() {
        assert!(Cli::try_parse_from(["polyview", "--line-width", "0.5"]).is_err());
        assert!(Cli::try_parse_from(["polyview", "--line-width", "wide"]).is_err());
        let cli = Cli::try_parse_from(["polyview", "--line-width", "2"]).unwrap();
        assert_eq!(cli.line_width, 2.0);
    }
}
